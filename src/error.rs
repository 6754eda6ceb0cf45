use thiserror::Error;

use crate::models::{GameStatus, Position, Tile};

fn join_tiles(tiles: &[Tile]) -> String {
    tiles.iter().map(Tile::to_string).collect::<Vec<_>>().join(", ")
}

/// Why a connection could not enter a room
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("The name {0} is already taken in this room!")]
    DuplicateName(String),
    #[error("Room {0} already exists!")]
    RoomExists(String),
    #[error("The room {0} does not exist!")]
    RoomNotFound(String),
    #[error("Game in progress")]
    GameInProgress,
    #[error("Invalid player name: {0}")]
    InvalidName(String),
    #[error("A room name is required")]
    MissingRoom,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Bad room options in the join handshake
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be a non-negative whole number, got '{value}'")]
    NotNumeric { field: &'static str, value: String },
    #[error("Unknown board size '{0}'")]
    BoardSize(String),
    #[error("Bag size must be between {min} and {max}, got {value}")]
    BagSize { value: u32, min: u32, max: u32 },
    #[error("{field} must be true or false, got '{value}'")]
    NotBoolean { field: &'static str, value: String },
    #[error("Unknown ending behavior '{0}'")]
    EndingBehavior(String),
}

/// A rejected board submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Moves can only be played while the game is playing (currently {0})")]
    NotPlaying(GameStatus),
    #[error("It is {0}'s turn")]
    NotYourTurn(String),
    #[error("You lost this turn")]
    TurnLost,
    #[error("You already moved this round")]
    AlreadyMoved,
    #[error("You are out of the game's last round")]
    Finished,
    #[error("The submitted board does not match the room's {0}x{0} board")]
    BoardShape(usize),
    #[error("A tile was removed from the board at {0}")]
    TileRemoved(Position),
    #[error("The tile at {0} was changed")]
    TileChanged(Position),
    #[error("No tiles were placed")]
    NoTilesPlaced,
    #[error("Tiles must be placed in a single row or column")]
    NotCollinear,
    #[error("Tiles must form one unbroken line")]
    NotContiguous,
    #[error("Tiles must connect to a word already on the board")]
    NotConnected,
    #[error("The first word must cover the center square")]
    MissingCenter,
    #[error("Blank tiles need a letter before they are played")]
    UnassignedBlank,
    #[error("A move must form a word of at least two letters")]
    NoWordFormed,
    #[error("Not in the dictionary: {}", .0.join(", "))]
    InvalidWords(Vec<String>),
    #[error("You do not have these tiles: {}", join_tiles(.0))]
    TilesNotInRack(Vec<Tile>),
}

/// Rack manipulation that does not match what the player owns
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RackError {
    #[error("Those letters are not on your rack")]
    NotOwned,
    #[error("{0} is not staged")]
    NotStaged(Tile),
    #[error("Shuffled letters must be the same letters")]
    NotAPermutation,
    #[error("No tile at position {0}")]
    NoSuchIndex(usize),
    #[error("The tile at position {0} is not a blank")]
    NotABlank(usize),
    #[error("'{0}' is not a letter")]
    InvalidLetter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChallengeError {
    #[error("You cannot challenge yourself")]
    SelfChallenge,
    #[error("Challenges are only allowed during the challenge phase")]
    NotChallenging,
    #[error("No player named {0}")]
    UnknownPlayer(String),
    #[error("{0} has no move to challenge")]
    NothingToChallenge(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KickError {
    #[error("You cannot kick yourself")]
    SelfKick,
    #[error("No player named {0}")]
    UnknownPlayer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("The game has already started!")]
    AlreadyStarted,
    #[error("The game is over")]
    GameOver,
}

/// Any rejected in-room action; reported to its sender only
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Rack(#[from] RackError),
    #[error(transparent)]
    Challenge(#[from] ChallengeError),
    #[error(transparent)]
    Kick(#[from] KickError),
    #[error(transparent)]
    Phase(#[from] PhaseError),
    #[error("You can only act as yourself, not {0}")]
    Impersonation(String),
}
