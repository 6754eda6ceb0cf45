use crate::{error::MoveError, models::Player};

/// Turn-taking discipline of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Everyone eligible moves within the same timed window
    Simultaneous,
    /// Moves go one at a time through the turn pointer
    TurnBased,
}

/// Decides who may move right now and walks the turn order.
///
/// Turn order is the players' join order; the pointer indexes into it and
/// only matters in turn-based rooms.
#[derive(Debug, Clone)]
pub struct TurnCoordinator {
    mode: PlayMode,
    pointer: usize,
}

impl TurnCoordinator {
    pub fn new(simultaneous: bool) -> Self {
        let mode = if simultaneous {
            PlayMode::Simultaneous
        } else {
            PlayMode::TurnBased
        };
        Self { mode, pointer: 0 }
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Player holding the turn (turn-based rooms only)
    pub fn current<'a>(&self, players: &'a [Player]) -> Option<&'a Player> {
        match self.mode {
            PlayMode::TurnBased => players.get(self.pointer),
            PlayMode::Simultaneous => None,
        }
    }

    /// Can `name` submit a move in the current window or turn?
    pub fn may_submit(&self, players: &[Player], name: &str) -> Result<(), MoveError> {
        let Some(player) = players.iter().find(|p| p.name == name) else {
            return Err(MoveError::NotYourTurn(String::new()));
        };

        if player.finished {
            return Err(MoveError::Finished);
        }
        if player.lose_turn {
            return Err(MoveError::TurnLost);
        }

        match self.mode {
            PlayMode::Simultaneous if player.done => Err(MoveError::AlreadyMoved),
            PlayMode::Simultaneous => Ok(()),
            PlayMode::TurnBased => match players.get(self.pointer) {
                Some(current) if current.name == name && !current.done => Ok(()),
                Some(current) if current.name == name => Err(MoveError::AlreadyMoved),
                Some(current) => Err(MoveError::NotYourTurn(current.name.clone())),
                None => Err(MoveError::NotYourTurn(String::new())),
            },
        }
    }

    /// Everyone who may act in this window or turn has moved or passed
    pub fn slot_complete(&self, players: &[Player]) -> bool {
        let can_act = |p: &&Player| !p.finished && !p.lose_turn;
        match self.mode {
            PlayMode::Simultaneous => players.iter().filter(can_act).all(|p| p.done),
            PlayMode::TurnBased => match players.get(self.pointer) {
                Some(current) => current.done || !can_act(&current),
                None => true,
            },
        }
    }

    /// Move the pointer on by one seat
    pub fn advance(&mut self, seats: usize) {
        if seats > 0 {
            self.pointer = (self.pointer + 1) % seats;
        }
    }

    /// Skip seats that cannot take this turn, consuming lost turns as they
    /// are passed over. Returns false when nobody at the table can play.
    pub fn settle(&mut self, players: &mut [Player]) -> bool {
        if self.mode == PlayMode::Simultaneous {
            return players.iter().any(|p| !p.finished);
        }
        let seats = players.len();
        if seats == 0 {
            return false;
        }
        self.pointer %= seats;

        for _ in 0..seats * 2 {
            let player = &mut players[self.pointer];
            if player.finished {
                self.advance(seats);
            } else if player.lose_turn {
                tracing::debug!("{} sits out this turn", player.name);
                player.lose_turn = false;
                self.advance(seats);
            } else {
                return true;
            }
        }
        false
    }

    /// Keep the pointer on the same player after seat `index` is vacated.
    /// When the vacated seat held the turn, the pointer steps back one seat
    /// so the next [`advance`](Self::advance) lands on whoever sat after it,
    /// and true is returned.
    pub fn on_removed(&mut self, index: usize, remaining: usize) -> bool {
        let held_turn = self.mode == PlayMode::TurnBased && index == self.pointer;
        if remaining == 0 {
            self.pointer = 0;
            return held_turn;
        }
        if index < self.pointer {
            self.pointer -= 1;
        } else if index == self.pointer {
            self.pointer = (index + remaining - 1) % remaining;
        }
        if self.pointer >= remaining {
            self.pointer = 0;
        }
        held_turn
    }

    /// Back to the first seat for a new game
    pub fn reset(&mut self) {
        self.pointer = 0;
    }
}
