use serde::Deserialize;

use crate::{
    error::{ConfigError, JoinError},
    models::{
        game::{MAX_BAG_SIZE, MIN_BAG_SIZE},
        BoardSize, EndingBehavior, RoomOptions,
    },
};

/// Longest player name accepted, after trimming
pub const MAX_NAME_LENGTH: usize = 20;

/// Query string of the `/ws` upgrade request. Everything arrives as text and
/// is only interpreted by [`JoinQuery::validate`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinQuery {
    pub room: Option<String>,
    pub name: Option<String>,
    pub creating: Option<String>,
    pub board_size: Option<String>,
    pub bag_size: Option<String>,
    pub play_time: Option<String>,
    pub challenge_time: Option<String>,
    pub simultaneous: Option<String>,
    pub ending_behavior: Option<String>,
}

/// A validated handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinRequest {
    Create {
        room: String,
        name: String,
        options: RoomOptions,
    },
    Join {
        room: String,
        name: String,
    },
}

impl JoinRequest {
    pub fn room(&self) -> &str {
        match self {
            JoinRequest::Create { room, .. } | JoinRequest::Join { room, .. } => room,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            JoinRequest::Create { name, .. } | JoinRequest::Join { name, .. } => name,
        }
    }
}

impl JoinQuery {
    pub fn parse(raw: &str) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_str(raw)
    }

    pub fn validate(self) -> Result<JoinRequest, JoinError> {
        let room = self.room.as_deref().map(str::trim).unwrap_or_default();
        if room.is_empty() {
            return Err(JoinError::MissingRoom);
        }

        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let name_len = name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_LENGTH {
            return Err(JoinError::InvalidName(name.to_string()));
        }

        let creating = flag("creating", self.creating.as_deref(), false)?;
        if !creating {
            return Ok(JoinRequest::Join {
                room: room.to_string(),
                name: name.to_string(),
            });
        }

        let defaults = RoomOptions::default();
        let board_size = match self.board_size.as_deref() {
            Some(raw) => {
                BoardSize::parse(raw).ok_or_else(|| ConfigError::BoardSize(raw.to_string()))?
            }
            None => defaults.board_size,
        };

        let bag_size = whole_number("bagSize", self.bag_size.as_deref(), defaults.bag_size)?;
        if !(MIN_BAG_SIZE..=MAX_BAG_SIZE).contains(&bag_size) {
            return Err(ConfigError::BagSize {
                value: bag_size,
                min: MIN_BAG_SIZE,
                max: MAX_BAG_SIZE,
            }
            .into());
        }

        let ending_behavior = match self.ending_behavior.as_deref() {
            Some(raw) => EndingBehavior::parse(raw)
                .ok_or_else(|| ConfigError::EndingBehavior(raw.to_string()))?,
            None => defaults.ending_behavior,
        };

        let options = RoomOptions {
            board_size,
            bag_size,
            play_time: whole_number("playTime", self.play_time.as_deref(), defaults.play_time)?,
            challenge_time: whole_number(
                "challengeTime",
                self.challenge_time.as_deref(),
                defaults.challenge_time,
            )?,
            simultaneous: flag("simultaneous", self.simultaneous.as_deref(), defaults.simultaneous)?,
            ending_behavior,
        };

        Ok(JoinRequest::Create {
            room: room.to_string(),
            name: name.to_string(),
            options,
        })
    }
}

/// Digits only: no sign, no decimals, no blanks
fn whole_number(field: &'static str, raw: Option<&str>, default: u32) -> Result<u32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let not_numeric = || ConfigError::NotNumeric {
        field,
        value: raw.to_string(),
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_numeric());
    }
    raw.parse().map_err(|_| not_numeric())
}

fn flag(field: &'static str, raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    match raw {
        None => Ok(default),
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(ConfigError::NotBoolean {
            field,
            value: other.to_string(),
        }),
    }
}
