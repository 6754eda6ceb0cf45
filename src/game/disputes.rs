//! Challenges and vote-kicks

use crate::{
    error::{ChallengeError, GameError, KickError, PhaseError},
    game::{
        arbiter::{Challenge, ChallengeArbiter, Outcome, Resolution},
        session::GameSession,
    },
    models::GameStatus,
    websocket::messages::{Color, ServerEvent},
};

pub const KICKED_MESSAGE: &str = "You were kicked from the room";

impl GameSession {
    /// `challenger` disputes the latest move `defendant` made in the slot
    /// that just closed. Resolving it always ends the challenge phase.
    pub fn challenge(&mut self, challenger: &str, defendant: &str) -> Result<Resolution, GameError> {
        match self.status {
            GameStatus::Challenging => {}
            GameStatus::GameOver => return Err(PhaseError::GameOver.into()),
            _ => return Err(ChallengeError::NotChallenging.into()),
        }
        if challenger == defendant {
            return Err(ChallengeError::SelfChallenge.into());
        }
        self.index_of(challenger)?;
        let defendant_idx = self
            .players
            .iter()
            .position(|p| p.name == defendant)
            .ok_or_else(|| ChallengeError::UnknownPlayer(defendant.to_string()))?;
        let record_idx = self
            .contestable
            .iter()
            .rposition(|m| m.player == defendant)
            .ok_or_else(|| ChallengeError::NothingToChallenge(defendant.to_string()))?;

        let record = &self.contestable[record_idx];
        let challenge = Challenge {
            challenger: challenger.to_string(),
            defendant: defendant.to_string(),
            move_id: record.id,
            words: record.words.clone(),
        };
        tracing::info!(
            "{} challenged {} ({}) in room {}",
            challenger,
            defendant,
            challenge.words.join(", "),
            self.room_id
        );
        self.announce_room(
            format!("{} challenged {}!", challenger, defendant),
            Color::Blue,
        );

        let resolution = ChallengeArbiter::new(self.words.as_ref(), self.rules).resolve(&challenge);
        match &resolution.outcome {
            Outcome::WordStood => {
                self.announce_room(
                    format!(
                        "{} stands! {}'s challenge failed.",
                        challenge.words.join(", "),
                        challenger
                    ),
                    Color::Blue,
                );
            }
            Outcome::WordRemoved { invalid } => {
                let record = self.contestable.remove(record_idx);
                ChallengeArbiter::undo_move(
                    &record,
                    &mut self.board,
                    &mut self.bag,
                    &mut self.players[defendant_idx],
                );
                self.players[defendant_idx].finished = false;
                if self.ending.as_ref().is_some_and(|e| e.last == defendant) {
                    self.reassign_ending();
                }
                self.announce_room(
                    format!(
                        "{} is not a word! {}'s move was taken back.",
                        invalid.join(", "),
                        defendant
                    ),
                    Color::Blue,
                );
            }
        }

        if let Some(name) = &resolution.penalized {
            if let Some(player) = self.players.iter_mut().find(|p| &p.name == name) {
                player.pending_lose_turn = true;
            }
            self.announce_room(format!("{} loses their next turn.", name), Color::Red);
        }

        self.mark_dirty();
        self.close_challenge();
        self.publish();
        Ok(resolution)
    }

    /// The player who triggered the ending was rolled back. Someone else who
    /// also played out keeps the ending alive; otherwise it is cancelled.
    fn reassign_ending(&mut self) {
        let still_out = self
            .players
            .iter()
            .find(|p| p.finished && p.owned_count() == 0)
            .map(|p| p.name.clone());
        match still_out {
            Some(name) => {
                tracing::debug!("Ending in room {} now belongs to {}", self.room_id, name);
                if let Some(ending) = &mut self.ending {
                    ending.last = name;
                }
            }
            None => self.ending = None,
        }
    }

    /// Record `voter`'s vote against `target`. Everyone else agreeing removes
    /// the target; returns whether that happened.
    pub fn vote_kick(&mut self, voter: &str, target: &str) -> Result<bool, GameError> {
        if self.status == GameStatus::GameOver {
            return Err(PhaseError::GameOver.into());
        }
        if voter == target {
            return Err(KickError::SelfKick.into());
        }
        self.index_of(voter)?;
        let idx = self
            .players
            .iter()
            .position(|p| p.name == target)
            .ok_or_else(|| KickError::UnknownPlayer(target.to_string()))?;

        let needed = self.players.len() - 1;
        let votes = {
            let player = &mut self.players[idx];
            player.kick.insert(voter.to_string());
            player.kick.len()
        };
        self.announce_room(
            format!("{} votes to kick {}! ({}/{})", voter, target, votes, needed),
            Color::Red,
        );
        self.mark_dirty();

        let kicked = votes >= needed;
        if kicked {
            tracing::info!("{} was kicked from room {}", target, self.room_id);
            self.send_to(
                target,
                ServerEvent::JoinError {
                    error: KICKED_MESSAGE.to_string(),
                },
            );
            self.disconnect(target);
            self.announce_room(format!("{} was kicked from the room.", target), Color::Red);
            self.remove_at(idx);
        }

        self.publish();
        Ok(kicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        game::session::{tests::*, Outbound},
        models::{GameRules, Position, RoomOptions, WordCheck},
    };
    use tokio_test::assert_ok;
    use uuid::Uuid;

    /// Unknown words get onto the board and can only be removed by a challenge
    fn lenient_room(names: &[&str], options: RoomOptions) -> GameSession {
        let rules = GameRules {
            word_check: WordCheck::Challenge,
            ..rules()
        };
        let mut session = GameSession::new("R1", names[0], Uuid::new_v4(), options, rules, dictionary());
        for name in &names[1..] {
            session.join(name, Uuid::new_v4()).unwrap();
        }
        session.start().unwrap();
        session.drain_outbox();
        session
    }

    fn racks_and_scores(session: &GameSession) -> Vec<(Vec<crate::models::Tile>, u32)> {
        session
            .players()
            .iter()
            .map(|p| (p.rack.clone(), p.score))
            .collect()
    }

    #[test]
    fn test_failed_challenge_changes_nothing_but_the_challenger_turn() {
        let mut session = lenient_room(&["ana", "bo"], RoomOptions::default());
        give_rack(&mut session, "ana", "CAT");
        play(&mut session, "ana", Position::new(7, 6), true, "CAT").unwrap();
        session.set_ready("bo").unwrap();
        assert_eq!(session.status(), GameStatus::Challenging);

        let board = session.board().grid();
        let before = racks_and_scores(&session);

        let resolution = session.challenge("bo", "ana").unwrap();
        assert_eq!(resolution.outcome, Outcome::WordStood);
        assert_eq!(session.board().grid(), board);
        assert_eq!(racks_and_scores(&session), before);

        // The next window opens with bo sitting out
        assert_eq!(session.status(), GameStatus::Playing);
        assert!(session.player("bo").unwrap().lose_turn);
        let grid = session.board().grid();
        assert_eq!(
            session.submit("bo", &grid),
            Err(GameError::Move(crate::error::MoveError::TurnLost))
        );
    }

    #[test]
    fn test_successful_challenge_rolls_the_move_back() {
        let mut session = lenient_room(&["ana", "bo"], RoomOptions::default());
        give_rack(&mut session, "ana", "TCA");
        let bag_before = session.bag_remaining();

        assert_eq!(play(&mut session, "ana", Position::new(7, 6), true, "TCA"), Ok(10));
        session.set_ready("bo").unwrap();

        let resolution = session.challenge("bo", "ana").unwrap();
        assert_eq!(
            resolution.outcome,
            Outcome::WordRemoved {
                invalid: vec!["TCA".into()]
            }
        );
        assert_eq!(resolution.penalized, None);

        let ana = session.player("ana").unwrap();
        let mut rack: Vec<String> = ana.rack.iter().map(|t| t.to_string()).collect();
        rack.sort();
        assert_eq!(rack, vec!["A", "C", "T"]);
        assert_eq!(ana.score, 0);
        assert!(session.board().is_empty());
        assert_eq!(session.bag_remaining(), bag_before);
        assert_eq!(session.tile_total(), 100);
        assert!(!session.player("bo").unwrap().lose_turn);
    }

    #[test]
    fn test_rollback_of_first_finisher_keeps_second_finisher_ending() {
        let mut session = lenient_room(&["ana", "bo", "cy"], RoomOptions::default());
        give_rack(&mut session, "ana", "TCA");
        give_rack(&mut session, "bo", "S");
        let rest = session.bag.draw(session.bag.remaining());
        session.players[2].rack.extend(rest);

        play(&mut session, "ana", Position::new(7, 6), true, "TCA").unwrap();
        play(&mut session, "bo", Position::new(7, 9), true, "S").unwrap();
        assert!(session.player("ana").unwrap().finished);
        assert!(session.player("bo").unwrap().finished);

        session.set_ready("cy").unwrap();
        assert_eq!(session.status(), GameStatus::Challenging);
        assert_ok!(session.challenge("cy", "ana"));

        assert!(!session.player("ana").unwrap().finished);
        assert_eq!(session.ending.as_ref().map(|e| e.last.as_str()), Some("bo"));

        // The last window plays out, then the game is over
        assert_eq!(session.status(), GameStatus::Playing);
        session.drain_outbox();
        session.set_ready("ana").unwrap();
        session.set_ready("cy").unwrap();
        assert_eq!(session.status(), GameStatus::GameOver);
        assert!(session.drain_outbox().iter().any(|o| matches!(
            o,
            Outbound::Room(ServerEvent::GameOver { last: Some(last), .. }) if last == "bo"
        )));
    }

    #[test]
    fn test_rollback_of_only_finisher_cancels_ending() {
        let mut session = lenient_room(&["ana", "bo"], RoomOptions::default());
        give_rack(&mut session, "ana", "TCA");
        let rest = session.bag.draw(session.bag.remaining());
        session.players[1].rack.extend(rest);

        play(&mut session, "ana", Position::new(7, 6), true, "TCA").unwrap();
        assert!(session.ending.is_some());
        session.set_ready("bo").unwrap();
        assert_ok!(session.challenge("bo", "ana"));

        assert!(session.ending.is_none());
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_challenge_only_targets_the_defendants_move() {
        let mut session = lenient_room(&["ana", "bo", "cy"], RoomOptions::default());
        give_rack(&mut session, "ana", "CAT");
        play(&mut session, "ana", Position::new(7, 6), true, "CAT").unwrap();
        session.set_ready("bo").unwrap();
        session.set_ready("cy").unwrap();
        assert_eq!(session.status(), GameStatus::Challenging);

        assert_eq!(
            session.challenge("ana", "ana"),
            Err(ChallengeError::SelfChallenge.into())
        );
        assert_eq!(
            session.challenge("bo", "zed"),
            Err(ChallengeError::UnknownPlayer("zed".into()).into())
        );
        assert_eq!(
            session.challenge("ana", "cy"),
            Err(ChallengeError::NothingToChallenge("cy".into()).into())
        );
        assert_eq!(session.status(), GameStatus::Challenging);
    }

    #[test]
    fn test_challenge_outside_phase_is_rejected() {
        let mut session = lenient_room(&["ana", "bo"], RoomOptions::default());
        assert_eq!(
            session.challenge("bo", "ana"),
            Err(ChallengeError::NotChallenging.into())
        );
    }

    #[test]
    fn test_turn_based_rollback_passes_the_turn() {
        let options = RoomOptions {
            simultaneous: false,
            ..RoomOptions::default()
        };
        let mut session = lenient_room(&["ana", "bo"], options);
        give_rack(&mut session, "ana", "TCA");
        play(&mut session, "ana", Position::new(7, 6), true, "TCA").unwrap();
        assert_eq!(session.status(), GameStatus::Challenging);

        assert_ok!(session.challenge("bo", "ana"));
        assert_eq!(session.status(), GameStatus::Playing);
        assert_eq!(session.current_player(), Some("bo"));
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_kick_needs_everyone_else() {
        let mut session = room(&["ana", "bo", "cy"], RoomOptions::default());
        assert_eq!(session.vote_kick("ana", "cy"), Ok(false));
        assert_eq!(session.vote_kick("ana", "cy"), Ok(false));
        assert_eq!(session.player("cy").unwrap().kick.len(), 1);
        session.drain_outbox();

        assert_eq!(session.vote_kick("bo", "cy"), Ok(true));
        assert!(session.player("cy").is_none());

        let out = session.drain_outbox();
        let kicked_at = out
            .iter()
            .position(|o| {
                matches!(o, Outbound::To { player, event: ServerEvent::JoinError { error } }
                    if player == "cy" && error == KICKED_MESSAGE)
            })
            .unwrap();
        assert_eq!(
            out[kicked_at + 1],
            Outbound::Disconnect { player: "cy".into() }
        );
    }

    #[test]
    fn test_kick_in_a_pair_takes_one_vote() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        assert_eq!(session.vote_kick("bo", "ana"), Ok(true));
        assert_eq!(session.players().len(), 1);
    }

    #[test]
    fn test_kicked_players_votes_are_forgotten() {
        let mut session = room(&["ana", "bo", "cy", "dee"], RoomOptions::default());
        session.vote_kick("ana", "dee").unwrap();
        session.vote_kick("bo", "ana").unwrap();
        session.vote_kick("cy", "ana").unwrap();
        assert_eq!(session.vote_kick("dee", "ana"), Ok(true));

        assert!(session.player("dee").unwrap().kick.is_empty());
    }

    #[test]
    fn test_kick_mid_game_returns_tiles_and_fixes_turns() {
        let options = RoomOptions {
            simultaneous: false,
            ..RoomOptions::default()
        };
        let mut session = room(&["ana", "bo", "cy"], options);
        session.start().unwrap();
        assert_eq!(session.current_player(), Some("ana"));

        session.vote_kick("bo", "ana").unwrap();
        session.vote_kick("cy", "ana").unwrap();
        assert_eq!(session.current_player(), Some("bo"));
        assert_eq!(session.tile_total(), 100);
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn test_kick_rejections() {
        let mut session = room(&["ana", "bo"], RoomOptions::default());
        assert_eq!(session.vote_kick("ana", "ana"), Err(KickError::SelfKick.into()));
        assert_eq!(
            session.vote_kick("ana", "zed"),
            Err(KickError::UnknownPlayer("zed".into()).into())
        );
    }
}
