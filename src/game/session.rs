//! One room's game.
//!
//! `GameSession` owns everything a room mutates: players, board, bag, turn
//! order and the phase timer. It does no I/O. Every accepted action leaves
//! events in an outbox that the room actor drains and delivers, and any
//! change visible to clients is followed by one full snapshot broadcast.
//!
//! Phases run `waiting -> playing -> challenging -> playing ... -> gameOver`.
//! A "slot" is one playing window (simultaneous rooms) or one turn
//! (turn-based rooms).

use std::{sync::Arc, time::Duration};

use crate::{
    dictionary::WordList,
    error::{GameError, JoinError, PhaseError},
    game::{
        arbiter::MoveRecord,
        bag::TileBag,
        board::{Board, MoveId},
        timer::{PhaseTimer, TimerToken},
        turns::{PlayMode, TurnCoordinator},
    },
    models::{ConnectionId, GameRules, GameStatus, Player, RoomOptions, RACK_SIZE},
    utils::text::sanitize_chat,
    websocket::messages::{ClientEvent, Color, OptionsView, RoomSnapshot, ServerEvent},
};

/// A server event waiting to be delivered
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Every player in the room
    Room(ServerEvent),
    RoomExcept { except: String, event: ServerEvent },
    To { player: String, event: ServerEvent },
    /// Close the player's connection once earlier events are sent
    Disconnect { player: String },
}

/// The bag is empty and `last` played out their rack
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Ending {
    pub(super) last: String,
    /// Slots still to be played before the game is over
    pub(super) extra_slots: usize,
}

pub struct GameSession {
    pub(super) room_id: String,
    pub(super) options: RoomOptions,
    pub(super) rules: GameRules,
    pub(super) status: GameStatus,
    pub(super) players: Vec<Player>,
    pub(super) board: Board,
    pub(super) bag: TileBag,
    pub(super) turns: TurnCoordinator,
    pub(super) timer: PhaseTimer,
    pub(super) words: Arc<dyn WordList>,
    /// Moves accepted in the slot that just closed, open to challenge
    pub(super) contestable: Vec<MoveRecord>,
    pub(super) ending: Option<Ending>,
    next_move: MoveId,
    outbox: Vec<Outbound>,
    dirty: bool,
}

impl GameSession {
    /// Open a room with its creator as the only player
    pub fn new(
        room_id: impl Into<String>,
        creator: impl Into<String>,
        connection: ConnectionId,
        options: RoomOptions,
        rules: GameRules,
        words: Arc<dyn WordList>,
    ) -> Self {
        let room_id = room_id.into();
        let creator = creator.into();
        let bag = match rules.tile_seed {
            Some(seed) => TileBag::new_with_seed(options.bag_size, seed),
            None => TileBag::new(options.bag_size),
        };

        tracing::info!(
            "Room {} created by {} ({:?} board, {} tiles, {})",
            room_id,
            creator,
            options.board_size,
            bag.initial_size(),
            if options.simultaneous { "simultaneous" } else { "turn-based" }
        );

        let mut session = Self {
            board: Board::new(options.board_size),
            turns: TurnCoordinator::new(options.simultaneous),
            players: vec![Player::new(creator, connection)],
            room_id,
            options,
            rules,
            status: GameStatus::Waiting,
            bag,
            timer: PhaseTimer::default(),
            words,
            contestable: Vec::new(),
            ending: None,
            next_move: 1,
            outbox: Vec::new(),
            dirty: true,
        };
        session.publish();
        session
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn options(&self) -> &RoomOptions {
        &self.options
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn bag_remaining(&self) -> usize {
        self.bag.remaining()
    }

    pub fn timer(&self) -> &PhaseTimer {
        &self.timer
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player holding the turn, in turn-based rooms
    pub fn current_player(&self) -> Option<&str> {
        self.turns.current(&self.players).map(|p| p.name.as_str())
    }

    /// Tiles in the bag, on racks (staged included) and on the board
    pub fn tile_total(&self) -> usize {
        self.bag.remaining()
            + self.players.iter().map(Player::owned_count).sum::<usize>()
            + self.board.tile_count()
    }

    /// Take every event queued since the last drain
    pub fn drain_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            players: self.players.iter().map(Player::view).collect(),
            board: self.board.grid(),
            status: self.status,
            options: OptionsView {
                room: self.options.clone(),
                order: self.players.iter().map(|p| p.name.clone()).collect(),
            },
            time: self.timer.remaining_secs(),
            curr_playing: self.turns.pointer(),
            tiles_remaining: self.bag.remaining(),
        }
    }

    pub fn join(&mut self, name: &str, connection: ConnectionId) -> Result<(), JoinError> {
        if self.player(name).is_some() {
            return Err(JoinError::DuplicateName(name.to_string()));
        }
        if self.status != GameStatus::Waiting {
            return Err(JoinError::GameInProgress);
        }

        self.players.push(Player::new(name, connection));
        tracing::info!("{} joined room {}", name, self.room_id);

        self.outbox.push(Outbound::RoomExcept {
            except: name.to_string(),
            event: ServerEvent::LoginMessage {
                player: name.to_string(),
            },
        });
        self.dirty = true;
        self.publish();
        Ok(())
    }

    /// A connection went away. Only removes the player if `connection` is
    /// still theirs; returns whether anyone was removed.
    pub fn leave(&mut self, name: &str, connection: ConnectionId) -> bool {
        let Some(idx) = self
            .players
            .iter()
            .position(|p| p.name == name && p.connection == connection)
        else {
            return false;
        };

        tracing::info!("{} left room {}", name, self.room_id);
        self.announce_room(format!("{} left the game.", name), Color::Red);
        self.remove_at(idx);
        self.publish();
        true
    }

    /// Route one client event from `sender`. Rejections are reported to the
    /// sender only and leave the room untouched.
    pub fn handle(&mut self, sender: &str, event: ClientEvent) {
        let result = match event {
            ClientEvent::Submit { board } => self.submit(sender, &board).map(|_| ()),
            ClientEvent::StartGame => self.start(),
            ClientEvent::Ready => self.set_ready(sender),
            ClientEvent::Challenge { you, them } => {
                Self::acting_as(sender, &you).and_then(|_| self.challenge(&you, &them).map(|_| ()))
            }
            ClientEvent::Votekick { you, them } => {
                Self::acting_as(sender, &you).and_then(|_| self.vote_kick(&you, &them).map(|_| ()))
            }
            ClientEvent::UseLetter { name, letters } => {
                Self::acting_as(sender, &name).and_then(|_| self.use_letters(&name, letters))
            }
            ClientEvent::RequestLetter { name, letter } => {
                Self::acting_as(sender, &name).and_then(|_| self.request_letter(&name, letter))
            }
            ClientEvent::ShuffleLetters { player, letters } => {
                Self::acting_as(sender, &player).and_then(|_| self.shuffle_letters(&player, letters))
            }
            ClientEvent::SetBlank {
                player,
                index,
                letter,
            } => Self::acting_as(sender, &player)
                .and_then(|_| self.set_blank(&player, index, &letter)),
            ClientEvent::PlayerChat { sender: from, message } => {
                Self::acting_as(sender, &from).map(|_| self.chat(&from, &message))
            }
            ClientEvent::ForceUpdate => {
                self.send_to(sender, ServerEvent::Update(self.snapshot()));
                Ok(())
            }
        };

        if let Err(err) = result {
            tracing::debug!("Rejected action from {} in room {}: {}", sender, self.room_id, err);
            self.send_to(
                sender,
                ServerEvent::Announcement {
                    msg: err.to_string(),
                    color: Color::Red,
                },
            );
        }
    }

    /// A phase timer ran out. Stale tokens are ignored.
    pub fn on_timer(&mut self, token: TimerToken) {
        match self.timer.fire(token) {
            Some(GameStatus::Playing) if self.status == GameStatus::Playing => {
                tracing::debug!("Play time is up in room {}", self.room_id);
                self.close_slot();
            }
            Some(GameStatus::Challenging) if self.status == GameStatus::Challenging => {
                tracing::debug!("Challenge time is up in room {}", self.room_id);
                self.close_challenge();
            }
            _ => {
                tracing::debug!("Ignoring stale timer in room {}", self.room_id);
                return;
            }
        }
        self.publish();
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        match self.status {
            GameStatus::Waiting => {}
            GameStatus::GameOver => return Err(PhaseError::GameOver.into()),
            _ => return Err(PhaseError::AlreadyStarted.into()),
        }

        for player in &mut self.players {
            player.rack = self.bag.draw(RACK_SIZE);
        }
        self.turns.reset();

        tracing::info!(
            "Game started in room {} with {} players",
            self.room_id,
            self.players.len()
        );
        self.announce_room("The game has started!".to_string(), Color::Green);
        self.open_slot();
        self.publish();
        Ok(())
    }

    /// Ready means something different in every phase: a lobby flag while
    /// waiting, a pass while playing and "no challenge" while challenging.
    pub fn set_ready(&mut self, name: &str) -> Result<(), GameError> {
        let idx = self.index_of(name)?;

        match self.status {
            GameStatus::GameOver => return Err(PhaseError::GameOver.into()),
            GameStatus::Waiting => {
                self.players[idx].ready = true;
                self.dirty = true;
            }
            GameStatus::Playing => {
                self.players[idx].ready = true;
                let may_pass = match self.turns.mode() {
                    PlayMode::Simultaneous => true,
                    PlayMode::TurnBased => idx == self.turns.pointer(),
                };
                if may_pass {
                    self.players[idx].done = true;
                }
                self.dirty = true;
                if self.turns.slot_complete(&self.players) {
                    self.close_slot();
                }
            }
            GameStatus::Challenging => {
                self.players[idx].ready = true;
                self.dirty = true;
                if self.players.iter().all(|p| p.ready) {
                    self.close_challenge();
                }
            }
        }

        self.publish();
        Ok(())
    }

    fn chat(&mut self, sender: &str, message: &str) {
        let (shown_as, message) = sanitize_chat(sender, message);
        self.outbox.push(Outbound::RoomExcept {
            except: sender.to_string(),
            event: ServerEvent::PlayerChat {
                sender: shown_as,
                message,
            },
        });
    }

    pub(super) fn acting_as(sender: &str, claimed: &str) -> Result<(), GameError> {
        if sender == claimed {
            Ok(())
        } else {
            Err(GameError::Impersonation(claimed.to_string()))
        }
    }

    pub(super) fn index_of(&self, name: &str) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| GameError::Impersonation(name.to_string()))
    }

    pub(super) fn next_move_id(&mut self) -> MoveId {
        let id = self.next_move;
        self.next_move += 1;
        id
    }

    pub(super) fn announce_room(&mut self, msg: String, color: Color) {
        self.outbox
            .push(Outbound::Room(ServerEvent::Announcement { msg, color }));
    }

    pub(super) fn send_to(&mut self, player: &str, event: ServerEvent) {
        self.outbox.push(Outbound::To {
            player: player.to_string(),
            event,
        });
    }

    /// Close `player`'s connection after everything queued so far
    pub(super) fn disconnect(&mut self, player: &str) {
        self.outbox.push(Outbound::Disconnect {
            player: player.to_string(),
        });
    }

    pub(super) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Queue one snapshot broadcast if anything visible changed
    pub(super) fn publish(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.outbox
                .push(Outbound::Room(ServerEvent::Update(self.snapshot())));
        }
    }

    /// Drop a player: tiles back to the bag, votes cast by them forgotten,
    /// turn order repaired. Ends the game when nobody eligible is left.
    pub(super) fn remove_at(&mut self, idx: usize) -> Player {
        let mut player = self.players.remove(idx);
        self.bag.return_tiles(player.surrender_tiles());
        for other in &mut self.players {
            other.kick.remove(&player.name);
        }
        self.contestable.retain(|m| m.player != player.name);
        let held_turn = self.turns.on_removed(idx, self.players.len());
        self.dirty = true;

        if self.players.is_empty() {
            self.timer.cancel();
            return player;
        }

        match self.status {
            GameStatus::Playing | GameStatus::Challenging
                if !self.players.iter().any(|p| !p.finished) =>
            {
                let last = self.ending.as_ref().map(|e| e.last.clone());
                self.finish(last);
            }
            GameStatus::Playing if held_turn || self.turns.slot_complete(&self.players) => {
                self.close_slot();
            }
            GameStatus::Challenging if self.players.iter().all(|p| p.ready) => {
                self.close_challenge();
            }
            _ => {}
        }
        player
    }

    /// Start the next playing window or turn, or end the game
    pub(super) fn open_slot(&mut self) {
        if let Some(ending) = &mut self.ending {
            if ending.extra_slots == 0 {
                let last = ending.last.clone();
                self.finish(Some(last));
                return;
            }
            ending.extra_slots -= 1;
        }

        let simultaneous = self.turns.mode() == PlayMode::Simultaneous;
        for player in &mut self.players {
            let pending = std::mem::take(&mut player.pending_lose_turn);
            player.lose_turn = if simultaneous {
                pending
            } else {
                player.lose_turn || pending
            };
            player.done = false;
            player.ready = false;
        }

        if !self.turns.settle(&mut self.players) {
            let last = self.ending.as_ref().map(|e| e.last.clone());
            self.finish(last);
            return;
        }

        self.status = GameStatus::Playing;
        self.contestable.clear();
        self.dirty = true;
        if self.options.play_time > 0 {
            self.timer.arm(
                GameStatus::Playing,
                Duration::from_secs(self.options.play_time.into()),
            );
        } else {
            self.timer.cancel();
        }

        tracing::debug!(
            "Room {} playing{}",
            self.room_id,
            self.current_player()
                .map(|name| format!(", {}'s turn", name))
                .unwrap_or_default()
        );

        // Everyone sits this window out
        if self.turns.slot_complete(&self.players) {
            self.close_slot();
        }
    }

    /// The playing window or turn is over: open challenges if anything was
    /// played, otherwise move straight on
    pub(super) fn close_slot(&mut self) {
        self.timer.cancel();
        for player in &mut self.players {
            player.unstage_all();
        }
        self.dirty = true;

        if self.contestable.is_empty() || self.options.challenge_time == 0 {
            self.next_slot();
            return;
        }

        self.status = GameStatus::Challenging;
        for player in &mut self.players {
            player.ready = false;
        }
        self.outbox
            .push(Outbound::Room(ServerEvent::ChallengingTime));
        self.timer.arm(
            GameStatus::Challenging,
            Duration::from_secs(self.options.challenge_time.into()),
        );
        tracing::debug!("Room {} challenging", self.room_id);
    }

    pub(super) fn close_challenge(&mut self) {
        self.timer.cancel();
        self.next_slot();
    }

    fn next_slot(&mut self) {
        if self.turns.mode() == PlayMode::TurnBased {
            self.turns.advance(self.players.len());
        }
        self.open_slot();
    }

    /// Enter `gameOver` and announce the winners
    pub(super) fn finish(&mut self, last: Option<String>) {
        self.timer.cancel();
        self.status = GameStatus::GameOver;
        self.ending = None;
        self.contestable.clear();
        for player in &mut self.players {
            player.unstage_all();
            player.ready = false;
        }

        let score = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        let winners: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.score == score)
            .map(|p| p.name.clone())
            .collect();

        tracing::info!(
            "Game over in room {}: {} with {} points",
            self.room_id,
            winners.join(", "),
            score
        );

        self.dirty = true;
        self.publish();
        self.outbox.push(Outbound::Room(ServerEvent::GameOver {
            last,
            winners,
            score,
        }));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        dictionary::Dictionary,
        game::board::tests::with_word,
        models::{EndingBehavior, Position, Tile},
    };
    use uuid::Uuid;

    pub(crate) fn dictionary() -> Arc<dyn WordList> {
        Arc::new(Dictionary::from_words([
            "CAT", "CATS", "AT", "TA", "ACT", "TAB", "BAT", "SCAT",
        ]))
    }

    pub(crate) fn rules() -> GameRules {
        GameRules {
            tile_seed: Some(11),
            ..GameRules::default()
        }
    }

    /// A room with `names` joined, in the waiting phase
    pub(crate) fn room(names: &[&str], options: RoomOptions) -> GameSession {
        let mut session = GameSession::new(
            "R1",
            names[0],
            Uuid::new_v4(),
            options,
            rules(),
            dictionary(),
        );
        for name in &names[1..] {
            session.join(name, Uuid::new_v4()).unwrap();
        }
        session.drain_outbox();
        session
    }

    /// Give `name` exactly these tiles (`?` is a blank), swapping with the bag
    pub(crate) fn give_rack(session: &mut GameSession, name: &str, word: &str) {
        let idx = session.index_of(name).unwrap();
        let old = std::mem::take(&mut session.players[idx].rack);
        session.bag.return_tiles(old);

        let mut pool = session.bag.draw(session.bag.remaining());
        let mut rack = Vec::new();
        for ch in word.chars() {
            let wanted = if ch == '?' { Tile::Blank(None) } else { Tile::Letter(ch) };
            let pos = pool
                .iter()
                .position(|t| *t == wanted)
                .expect("bag holds the tile");
            rack.push(pool.remove(pos));
        }
        session.bag.return_tiles(pool);
        session.players[idx].rack = rack;
    }

    pub(crate) fn play(session: &mut GameSession, name: &str, start: Position, across: bool, word: &str) -> Result<u32, GameError> {
        let grid = with_word(&session.board.grid(), start, across, word);
        session.submit(name, &grid).map(|scored| scored.score)
    }

    fn updates(out: &[Outbound]) -> usize {
        out.iter()
            .filter(|o| matches!(o, Outbound::Room(ServerEvent::Update(_))))
            .count()
    }

    #[test]
    fn test_new_room_broadcasts_snapshot() {
        let mut session = GameSession::new(
            "R1",
            "ana",
            Uuid::new_v4(),
            RoomOptions::default(),
            rules(),
            dictionary(),
        );
        let out = session.drain_outbox();
        assert_eq!(updates(&out), 1);
        assert_eq!(session.status(), GameStatus::Waiting);
        assert_eq!(session.tile_total(), 100);
    }

    #[test]
    fn test_join_rejects_duplicates_and_late_joins() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        assert_eq!(
            session.join("bo", Uuid::new_v4()),
            Err(JoinError::DuplicateName("bo".into()))
        );

        session.start().unwrap();
        assert_eq!(
            session.join("cy", Uuid::new_v4()),
            Err(JoinError::GameInProgress)
        );
        // Names are checked first, even mid-game
        assert_eq!(
            session.join("ana", Uuid::new_v4()),
            Err(JoinError::DuplicateName("ana".into()))
        );
    }

    #[test]
    fn test_join_announces_to_others() {
        let mut session = room(&["ana"], RoomOptions::default());
        session.join("bo", Uuid::new_v4()).unwrap();
        let out = session.drain_outbox();
        assert!(out.contains(&Outbound::RoomExcept {
            except: "bo".into(),
            event: ServerEvent::LoginMessage { player: "bo".into() },
        }));
        assert_eq!(updates(&out), 1);
    }

    #[test]
    fn test_second_start_is_an_error() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        session.start().unwrap();
        assert_eq!(session.status(), GameStatus::Playing);
        assert!(session.players().iter().all(|p| p.rack.len() == RACK_SIZE));
        assert_eq!(
            session.start(),
            Err(GameError::Phase(PhaseError::AlreadyStarted))
        );
        assert_eq!(session.tile_total(), 100);
    }

    #[test]
    fn test_all_ready_closes_empty_window() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        session.start().unwrap();
        let first = session.timer().armed_token();

        session.set_ready("ana").unwrap();
        assert_eq!(session.status(), GameStatus::Playing);
        session.set_ready("bo").unwrap();

        // No move was played, so there is nothing to challenge
        assert_eq!(session.status(), GameStatus::Playing);
        assert_ne!(session.timer().armed_token(), first);
        assert!(session.players().iter().all(|p| !p.ready && !p.done));
    }

    #[test]
    fn test_play_timeout_opens_challenges_after_a_move() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        session.start().unwrap();
        give_rack(&mut session, "ana", "CAT");
        play(&mut session, "ana", Position::new(7, 6), true, "CAT").unwrap();
        session.drain_outbox();

        let token = session.timer().armed_token().unwrap();
        session.on_timer(token);
        assert_eq!(session.status(), GameStatus::Challenging);
        let out = session.drain_outbox();
        assert!(out.contains(&Outbound::Room(ServerEvent::ChallengingTime)));

        // The superseded token does nothing
        session.on_timer(token);
        assert_eq!(session.status(), GameStatus::Challenging);
        assert!(session.drain_outbox().is_empty());

        let token = session.timer().armed_token().unwrap();
        session.on_timer(token);
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_zero_challenge_time_skips_challenging() {
        let options = RoomOptions {
            challenge_time: 0,
            ..RoomOptions::default()
        };
        let mut session = room(&["ana", "bo"], options);
        session.start().unwrap();
        give_rack(&mut session, "ana", "CAT");
        play(&mut session, "ana", Position::new(7, 6), true, "CAT").unwrap();
        session.set_ready("bo").unwrap();
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_zero_play_time_arms_no_timer() {
        let options = RoomOptions {
            play_time: 0,
            ..RoomOptions::default()
        };
        let mut session = room(&["ana"], options);
        session.start().unwrap();
        assert_eq!(session.timer().armed_token(), None);
        assert_eq!(session.snapshot().time, 0);
    }

    #[test]
    fn test_turn_based_pass_moves_the_pointer() {
        let options = RoomOptions {
            simultaneous: false,
            ..RoomOptions::default()
        };
        let mut session = room(&["ana", "bo", "cy"], options);
        session.start().unwrap();
        assert_eq!(session.current_player(), Some("ana"));

        // Not bo's turn: ready is only a flag
        session.set_ready("bo").unwrap();
        assert_eq!(session.current_player(), Some("ana"));

        session.set_ready("ana").unwrap();
        assert_eq!(session.current_player(), Some("bo"));
        assert_eq!(session.snapshot().curr_playing, 1);
    }

    #[test]
    fn test_leaving_current_player_passes_the_turn() {
        let options = RoomOptions {
            simultaneous: false,
            ..RoomOptions::default()
        };
        let mut session = room(&["ana", "bo", "cy"], options);
        let bo = session.player("bo").unwrap().connection;
        session.start().unwrap();
        session.set_ready("ana").unwrap();
        assert_eq!(session.current_player(), Some("bo"));

        assert!(session.leave("bo", bo));
        assert_eq!(session.current_player(), Some("cy"));
        assert_eq!(session.tile_total(), 100);
    }

    #[test]
    fn test_leave_ignores_stale_connection() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        assert!(!session.leave("bo", Uuid::new_v4()));
        assert_eq!(session.players().len(), 2);
    }

    #[test]
    fn test_last_eligible_player_leaving_ends_game() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        let bo = session.player("bo").unwrap().connection;
        session.start().unwrap();
        session.players[0].finished = true;

        session.leave("bo", bo);
        assert_eq!(session.status(), GameStatus::GameOver);
        let out = session.drain_outbox();
        assert!(out.iter().any(|o| matches!(
            o,
            Outbound::Room(ServerEvent::GameOver { winners, .. }) if winners == &vec!["ana".to_string()]
        )));
    }

    #[test]
    fn test_game_over_rejects_actions() {
        let options = RoomOptions {
            ending_behavior: EndingBehavior::Immediate,
            ..RoomOptions::default()
        };
        let mut session = room(&["ana"], options);
        session.start().unwrap();
        session.finish(None);
        assert_eq!(session.set_ready("ana"), Err(PhaseError::GameOver.into()));
        assert_eq!(session.start(), Err(PhaseError::GameOver.into()));
    }

    #[test]
    fn test_rejections_go_to_sender_only() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        session.handle("ana", ClientEvent::Ready);
        session.drain_outbox();

        session.handle(
            "ana",
            ClientEvent::Votekick {
                you: "bo".into(),
                them: "ana".into(),
            },
        );
        let out = session.drain_outbox();
        assert_eq!(out.len(), 1);
        assert!(matches!(
            &out[0],
            Outbound::To { player, event: ServerEvent::Announcement { color: Color::Red, .. } } if player == "ana"
        ));
    }

    #[test]
    fn test_chat_is_sanitized_and_relayed_to_others() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        session.handle(
            "ana",
            ClientEvent::PlayerChat {
                sender: "ana".into(),
                message: "<b>hello</b> there, this line is far too long to keep".into(),
            },
        );
        let out = session.drain_outbox();
        let Outbound::RoomExcept { except, event: ServerEvent::PlayerChat { message, .. } } = &out[0] else {
            panic!("expected a chat relay, got {:?}", out);
        };
        assert_eq!(except, "ana");
        assert_eq!(message.chars().count(), 35);
        assert!(message.starts_with("hello there"));
    }

    #[test]
    fn test_chat_skips_sender_whose_name_has_markup() {
        let mut session = room(&["<b>x</b>", "bo"], RoomOptions::default());
        session.handle(
            "<b>x</b>",
            ClientEvent::PlayerChat {
                sender: "<b>x</b>".into(),
                message: "hi".into(),
            },
        );
        let out = session.drain_outbox();
        assert_eq!(
            out,
            vec![Outbound::RoomExcept {
                except: "<b>x</b>".into(),
                event: ServerEvent::PlayerChat {
                    sender: "x".into(),
                    message: "hi".into(),
                },
            }]
        );
    }

    #[test]
    fn test_force_update_answers_sender() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        session.handle("bo", ClientEvent::ForceUpdate);
        let out = session.drain_outbox();
        assert!(matches!(&out[0], Outbound::To { player, event: ServerEvent::Update(_) } if player == "bo"));
    }
}
