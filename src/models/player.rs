use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tile;

/// Opaque identity of the transport connection a player arrived on
pub type ConnectionId = Uuid;

/// Tiles a player holds between moves
pub const RACK_SIZE: usize = 7;

/// Per-player state inside a room
#[derive(Debug, Clone)]
pub struct Player {
    pub name: String,
    /// Tiles visible on the rack
    pub rack: Vec<Tile>,
    /// Tiles the client has dragged onto the board but not yet submitted
    pub staged: Vec<Tile>,
    pub score: u32,
    pub ready: bool,
    /// Names of the players voting to kick this one
    pub kick: BTreeSet<String>,
    /// Sits out the current window or turn
    pub lose_turn: bool,
    /// Penalty to apply when the next window or turn starts
    pub pending_lose_turn: bool,
    /// Already moved or passed in the current window
    pub done: bool,
    /// Played out their rack; excluded from the extra round
    pub finished: bool,
    pub connection: ConnectionId,
}

impl Player {
    pub fn new(name: impl Into<String>, connection: ConnectionId) -> Self {
        Self {
            name: name.into(),
            rack: Vec::with_capacity(RACK_SIZE),
            staged: Vec::new(),
            score: 0,
            ready: false,
            kick: BTreeSet::new(),
            lose_turn: false,
            pending_lose_turn: false,
            done: false,
            finished: false,
            connection,
        }
    }

    /// Every tile the player owns, staged ones included
    pub fn owned_tiles(&self) -> Vec<Tile> {
        self.rack.iter().chain(self.staged.iter()).copied().collect()
    }

    pub fn owned_count(&self) -> usize {
        self.rack.len() + self.staged.len()
    }

    /// Put staged tiles back on the visible rack
    pub fn unstage_all(&mut self) {
        self.rack.append(&mut self.staged);
    }

    /// Drop everything the player owns, e.g. when leaving mid-game
    pub fn surrender_tiles(&mut self) -> Vec<Tile> {
        self.unstage_all();
        std::mem::take(&mut self.rack)
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            name: self.name.clone(),
            letters: self.rack.clone(),
            score: self.score,
            ready: self.ready,
            kick: self.kick.iter().cloned().collect(),
            lose_turn: self.lose_turn,
        }
    }
}

/// Player as sent to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub name: String,
    pub letters: Vec<Tile>,
    pub score: u32,
    pub ready: bool,
    pub kick: Vec<String>,
    pub lose_turn: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_tiles_include_staged() {
        let mut player = Player::new("ana", Uuid::new_v4());
        player.rack = vec![Tile::Letter('A'), Tile::Letter('B')];
        player.staged = vec![Tile::Letter('C')];
        assert_eq!(player.owned_count(), 3);

        player.unstage_all();
        assert!(player.staged.is_empty());
        assert_eq!(player.rack.len(), 3);
    }

    #[test]
    fn test_view_uses_wire_names() {
        let mut player = Player::new("ana", Uuid::new_v4());
        player.kick.insert("bo".to_string());
        let json = serde_json::to_value(player.view()).unwrap();
        assert_eq!(json["loseTurn"], false);
        assert_eq!(json["kick"][0], "bo");
    }
}
