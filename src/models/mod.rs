pub mod game;
pub mod player;
pub mod tile;

pub use game::{
    BoardSize, EndingBehavior, GameRules, GameStatus, Multiplier, Position, RoomOptions,
    WordCheck,
};
pub use player::{ConnectionId, Player, PlayerView, RACK_SIZE};
pub use tile::Tile;
