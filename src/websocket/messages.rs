use serde::{Deserialize, Serialize};

use crate::{
    game::board::TileGrid,
    models::{GameStatus, PlayerView, RoomOptions, Tile},
};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Full proposed board
    Submit {
        board: TileGrid,
    },
    StartGame,
    Ready,
    Challenge {
        you: String,
        them: String,
    },
    Votekick {
        you: String,
        them: String,
    },
    /// Visible rack after dragging tiles onto the board
    UseLetter {
        name: String,
        letters: Vec<Tile>,
    },
    /// Take a staged tile back to the rack
    RequestLetter {
        name: String,
        letter: Tile,
    },
    ShuffleLetters {
        player: String,
        letters: Vec<Tile>,
    },
    SetBlank {
        player: String,
        index: usize,
        letter: String,
    },
    PlayerChat {
        sender: String,
        message: String,
    },
    ForceUpdate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Purple,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ServerEvent {
    #[serde(rename = "serverSendUpdate")]
    Update(RoomSnapshot),
    #[serde(rename = "serverSendJoinError")]
    JoinError { error: String },
    #[serde(rename = "serverSendPlayerChat")]
    PlayerChat { sender: String, message: String },
    #[serde(rename = "serverSendLoginMessage")]
    LoginMessage { player: String },
    #[serde(rename = "serverSendAnnouncement")]
    Announcement { msg: String, color: Color },
    /// Clients clear tiles they have not submitted
    #[serde(rename = "serverSendChallengingTime")]
    ChallengingTime,
    #[serde(rename = "serverSendGameOver")]
    GameOver {
        last: Option<String>,
        winners: Vec<String>,
        score: u32,
    },
}

/// Everything a client needs to draw the room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub players: Vec<PlayerView>,
    pub board: TileGrid,
    pub status: GameStatus,
    pub options: OptionsView,
    /// Seconds left on the running phase timer
    pub time: u64,
    /// Turn pointer into `options.order`
    pub curr_playing: usize,
    pub tiles_remaining: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionsView {
    #[serde(flatten)]
    pub room: RoomOptions,
    /// Player names in turn order
    pub order: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_events_parse() {
        let event: ClientEvent = serde_json::from_str(r#"{"event":"startGame"}"#).unwrap();
        assert_eq!(event, ClientEvent::StartGame);

        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"votekick","you":"ana","them":"bo"}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Votekick {
                you: "ana".into(),
                them: "bo".into()
            }
        );

        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"setBlank","player":"ana","index":2,"letter":"q"}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::SetBlank { index: 2, .. }));
    }

    #[test]
    fn test_submit_carries_a_board() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"submit","board":[[null,"A"],["BLANK_S",null]]}"#)
                .unwrap();
        let ClientEvent::Submit { board } = event else {
            panic!("expected a submit");
        };
        assert_eq!(board[0][1], Some(Tile::Letter('A')));
        assert_eq!(board[1][0], Some(Tile::Blank(Some('S'))));
    }

    #[test]
    fn test_server_event_names() {
        let json = serde_json::to_value(ServerEvent::Announcement {
            msg: "hi".into(),
            color: Color::Red,
        })
        .unwrap();
        assert_eq!(json["event"], "serverSendAnnouncement");
        assert_eq!(json["color"], "red");

        let json = serde_json::to_value(ServerEvent::ChallengingTime).unwrap();
        assert_eq!(json["event"], "serverSendChallengingTime");
    }
}
