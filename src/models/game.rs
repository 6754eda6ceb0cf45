use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Multiplier {
    #[serde(rename = "DL")]
    DoubleLetter,
    #[serde(rename = "TL")]
    TripleLetter,
    #[serde(rename = "DW")]
    DoubleWord,
    #[serde(rename = "TW")]
    TripleWord,
}

/// Board dimensions chosen when the room is created
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BoardSize {
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    #[default]
    Medium,
    #[serde(rename = "L")]
    Large,
}

impl BoardSize {
    /// Number of rows (and columns)
    pub fn dimension(self) -> usize {
        match self {
            BoardSize::Small => 11,
            BoardSize::Medium => 15,
            BoardSize::Large => 21,
        }
    }

    pub fn center(self) -> Position {
        let mid = self.dimension() / 2;
        Position::new(mid, mid)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "S" | "SMALL" => Some(BoardSize::Small),
            "M" | "MEDIUM" => Some(BoardSize::Medium),
            "L" | "LARGE" => Some(BoardSize::Large),
            _ => None,
        }
    }
}

/// Room phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Challenging,
    GameOver,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Playing => "playing",
            GameStatus::Challenging => "challenging",
            GameStatus::GameOver => "gameOver",
        };
        f.write_str(name)
    }
}

/// What happens once the bag is empty and someone plays out their rack
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum EndingBehavior {
    Immediate,
    #[default]
    ExtraRound,
}

impl EndingBehavior {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "immediate" => Some(EndingBehavior::Immediate),
            "extraRound" => Some(EndingBehavior::ExtraRound),
            _ => None,
        }
    }
}

/// When words are checked against the dictionary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WordCheck {
    /// Moves forming unknown words are rejected outright
    #[default]
    Submit,
    /// Unknown words are accepted and left for opponents to challenge
    Challenge,
}

impl WordCheck {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "submit" => Some(WordCheck::Submit),
            "challenge" => Some(WordCheck::Challenge),
            _ => None,
        }
    }
}

pub const DEFAULT_BAG_SIZE: u32 = 100;
pub const DEFAULT_PLAY_TIME: u32 = 90;
pub const DEFAULT_CHALLENGE_TIME: u32 = 30;
pub const MIN_BAG_SIZE: u32 = 25;
pub const MAX_BAG_SIZE: u32 = 300;

/// Options picked by the room's creator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomOptions {
    pub board_size: BoardSize,
    pub bag_size: u32,
    /// Seconds per playing window; 0 disables the timer
    pub play_time: u32,
    /// Seconds to raise a challenge; 0 skips the phase
    pub challenge_time: u32,
    pub simultaneous: bool,
    pub ending_behavior: EndingBehavior,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            board_size: BoardSize::Medium,
            bag_size: DEFAULT_BAG_SIZE,
            play_time: DEFAULT_PLAY_TIME,
            challenge_time: DEFAULT_CHALLENGE_TIME,
            simultaneous: true,
            ending_behavior: EndingBehavior::ExtraRound,
        }
    }
}

/// Server-wide rules shared by every room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub word_check: WordCheck,
    pub failed_challenge_loses_turn: bool,
    pub successful_challenge_loses_turn: bool,
    /// Fixed tile bag seed; `None` draws from entropy
    pub tile_seed: Option<u64>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            word_check: WordCheck::Submit,
            failed_challenge_loses_turn: true,
            successful_challenge_loses_turn: false,
            tile_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_centers() {
        assert_eq!(BoardSize::Small.center(), Position::new(5, 5));
        assert_eq!(BoardSize::Medium.center(), Position::new(7, 7));
        assert_eq!(BoardSize::Large.center(), Position::new(10, 10));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&GameStatus::GameOver).unwrap(),
            "\"gameOver\""
        );
        assert_eq!(GameStatus::Challenging.to_string(), "challenging");
    }

    #[test]
    fn test_options_serialize_camel_case() {
        let json = serde_json::to_value(RoomOptions::default()).unwrap();
        assert_eq!(json["boardSize"], "M");
        assert_eq!(json["endingBehavior"], "extraRound");
        assert_eq!(json["challengeTime"], 30);
    }
}
