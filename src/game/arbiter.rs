//! Word challenge resolution
//!
//! A challenge contests one accepted move. If every word the move formed is
//! in the dictionary the word stands; otherwise the move is undone: its tiles
//! leave the board and go back to the defendant, the replacement tiles drawn
//! after it go back to the bag, and its points are taken away.

use crate::{
    dictionary::WordList,
    game::{
        bag::TileBag,
        board::{Board, MoveId, Placement},
    },
    models::{GameRules, Player, Tile},
};

/// An accepted move, kept while it can still be challenged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub id: MoveId,
    pub player: String,
    pub placements: Vec<Placement>,
    /// Replacement tiles drawn from the bag after the move
    pub drawn: Vec<Tile>,
    pub words: Vec<String>,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub challenger: String,
    pub defendant: String,
    pub move_id: MoveId,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every contested word is valid; nothing changes
    WordStood,
    /// At least one word is invalid; the move is rolled back
    WordRemoved { invalid: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// Player who sits out their next window or turn
    pub penalized: Option<String>,
}

pub struct ChallengeArbiter<'a> {
    words: &'a dyn WordList,
    rules: GameRules,
}

impl<'a> ChallengeArbiter<'a> {
    pub fn new(words: &'a dyn WordList, rules: GameRules) -> Self {
        Self { words, rules }
    }

    /// Decide a challenge. Does not touch any room state.
    pub fn resolve(&self, challenge: &Challenge) -> Resolution {
        let invalid: Vec<String> = challenge
            .words
            .iter()
            .filter(|word| !self.words.is_valid_word(word))
            .cloned()
            .collect();

        let (outcome, penalize) = if invalid.is_empty() {
            (Outcome::WordStood, self.rules.failed_challenge_loses_turn)
        } else {
            (
                Outcome::WordRemoved { invalid },
                self.rules.successful_challenge_loses_turn,
            )
        };

        Resolution {
            outcome,
            penalized: penalize.then(|| challenge.challenger.clone()),
        }
    }

    /// Undo an accepted move. Returns the tiles handed back to the defendant.
    pub fn undo_move(
        record: &MoveRecord,
        board: &mut Board,
        bag: &mut TileBag,
        defendant: &mut Player,
    ) -> Vec<Tile> {
        let removed: Vec<Tile> = board
            .rollback(record.id)
            .into_iter()
            .map(|placement| placement.tile)
            .collect();

        defendant.unstage_all();
        let mut replacements = Vec::with_capacity(record.drawn.len());
        for drawn in &record.drawn {
            match defendant.rack.iter().position(|t| t.same_kind(drawn)) {
                Some(idx) => replacements.push(defendant.rack.remove(idx)),
                None => tracing::warn!(
                    "Rolling back move {}: drawn tile {} is no longer on {}'s rack",
                    record.id,
                    drawn,
                    record.player
                ),
            }
        }
        bag.return_tiles(replacements);

        defendant.rack.extend(removed.iter().copied());
        defendant.score = defendant.score.saturating_sub(record.score);

        tracing::debug!(
            "Rolled back move {} by {}: {} tiles returned, {} points removed",
            record.id,
            record.player,
            removed.len(),
            record.score
        );

        removed
    }
}
