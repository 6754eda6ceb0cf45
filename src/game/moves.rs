//! Move submission and rack staging

use crate::{
    error::{GameError, MoveError, PhaseError, RackError},
    game::{
        arbiter::MoveRecord,
        board::TileGrid,
        scorer::{ScoreResult, Scorer},
        session::{Ending, GameSession},
        turns::PlayMode,
    },
    models::{
        tile::{is_sub_multiset, take_tiles},
        EndingBehavior, GameStatus, Tile, WordCheck, RACK_SIZE,
    },
    websocket::messages::Color,
};

impl GameSession {
    /// Validate `proposed` (the whole board as `name` wants it) against the
    /// current board and apply it. A rejected move changes nothing.
    pub fn submit(&mut self, name: &str, proposed: &TileGrid) -> Result<ScoreResult, GameError> {
        let idx = self.index_of(name)?;
        match self.status {
            GameStatus::Playing => {}
            GameStatus::GameOver => return Err(PhaseError::GameOver.into()),
            other => return Err(MoveError::NotPlaying(other).into()),
        }
        self.turns.may_submit(&self.players, name)?;

        let plan = self.board.plan(proposed)?;
        if self.rules.word_check == WordCheck::Submit {
            let invalid = plan.invalid_words(self.words.as_ref());
            if !invalid.is_empty() {
                return Err(MoveError::InvalidWords(invalid).into());
            }
        }

        let mut owned = self.players[idx].owned_tiles();
        take_tiles(&mut owned, &plan.tiles()).map_err(MoveError::TilesNotInRack)?;

        let move_id = self.next_move_id();
        let scored = Scorer::score_move(self.board.size(), &plan.words, plan.placements.len());
        self.board.apply(&plan.placements, move_id);

        let player = &mut self.players[idx];
        player.staged.clear();
        player.rack = owned;
        let drawn = self.bag.draw(RACK_SIZE.saturating_sub(player.rack.len()));
        player.rack.extend(drawn.iter().copied());
        player.score += scored.score;
        player.done = true;
        let played_out = player.rack.is_empty();

        let words = plan.word_texts();
        tracing::info!(
            "{} played {} for {} points in room {}",
            name,
            words.join(", "),
            scored.score,
            self.room_id
        );
        let bonus = if scored.bingo { " (all seven tiles!)" } else { "" };
        self.announce_room(
            format!(
                "{} played {} for {} points{}",
                name,
                words.join(", "),
                scored.score,
                bonus
            ),
            Color::Purple,
        );

        self.contestable.push(MoveRecord {
            id: move_id,
            player: name.to_string(),
            placements: plan.placements,
            drawn,
            words,
            score: scored.score,
        });
        self.mark_dirty();

        if played_out && self.bag.is_empty() {
            self.begin_ending(idx);
        }
        if self.status == GameStatus::Playing && self.turns.slot_complete(&self.players) {
            self.close_slot();
        }
        self.publish();
        Ok(scored)
    }

    /// Player `idx` emptied their rack with the bag already empty
    fn begin_ending(&mut self, idx: usize) {
        let name = self.players[idx].name.clone();
        match self.options.ending_behavior {
            EndingBehavior::Immediate => self.finish(Some(name)),
            EndingBehavior::ExtraRound => {
                self.players[idx].finished = true;
                if self.ending.is_some() {
                    return;
                }

                let extra_slots = match self.turns.mode() {
                    PlayMode::Simultaneous => 1,
                    PlayMode::TurnBased => self.players.iter().filter(|p| !p.finished).count(),
                };
                tracing::info!(
                    "{} played out in room {}, {} slots left",
                    name,
                    self.room_id,
                    extra_slots
                );
                self.announce_room(
                    format!("{} used all their tiles! Everyone else gets one last move.", name),
                    Color::Green,
                );
                self.ending = Some(Ending {
                    last: name,
                    extra_slots,
                });
            }
        }
    }

    /// The client dragged tiles to the board; `letters` is what is still on
    /// the visible rack. The rest is held as staged.
    pub fn use_letters(&mut self, name: &str, letters: Vec<Tile>) -> Result<(), GameError> {
        let idx = self.rack_owner(name)?;
        let player = &mut self.players[idx];

        let mut staged = player.owned_tiles();
        if !is_sub_multiset(&letters, &staged) {
            return Err(RackError::NotOwned.into());
        }
        take_tiles(&mut staged, &letters).map_err(|_| RackError::NotOwned)?;
        player.rack = letters;
        player.staged = staged;

        self.mark_dirty();
        self.publish();
        Ok(())
    }

    /// Move one staged tile back onto the visible rack
    pub fn request_letter(&mut self, name: &str, letter: Tile) -> Result<(), GameError> {
        let idx = self.rack_owner(name)?;
        let player = &mut self.players[idx];

        let pos = player
            .staged
            .iter()
            .position(|t| *t == letter)
            .or_else(|| player.staged.iter().position(|t| t.same_kind(&letter)))
            .ok_or(RackError::NotStaged(letter))?;
        let tile = player.staged.remove(pos);
        player.rack.push(tile);

        self.mark_dirty();
        self.publish();
        Ok(())
    }

    pub fn shuffle_letters(&mut self, name: &str, letters: Vec<Tile>) -> Result<(), GameError> {
        let idx = self.rack_owner(name)?;
        let player = &mut self.players[idx];

        if letters.len() != player.rack.len() || !is_sub_multiset(&letters, &player.rack) {
            return Err(RackError::NotAPermutation.into());
        }
        player.rack = letters;

        self.mark_dirty();
        self.publish();
        Ok(())
    }

    /// Bind the blank at `index` of the visible rack to `letter`
    pub fn set_blank(&mut self, name: &str, index: usize, letter: &str) -> Result<(), GameError> {
        let idx = self.rack_owner(name)?;

        let mut chars = letter.trim().chars();
        let bound = match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => ch.to_ascii_uppercase(),
            _ => return Err(RackError::InvalidLetter(letter.to_string()).into()),
        };

        let player = &mut self.players[idx];
        let tile = player
            .rack
            .get(index)
            .copied()
            .ok_or(RackError::NoSuchIndex(index))?;
        if !tile.is_blank() {
            return Err(RackError::NotABlank(index).into());
        }
        player.rack[index] = Tile::Blank(Some(bound));

        self.mark_dirty();
        self.publish();
        Ok(())
    }

    fn rack_owner(&self, name: &str) -> Result<usize, GameError> {
        let idx = self.index_of(name)?;
        if self.status == GameStatus::GameOver {
            return Err(PhaseError::GameOver.into());
        }
        Ok(idx)
    }
}
