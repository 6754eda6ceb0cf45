pub mod actor;

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    dictionary::WordList,
    error::JoinError,
    game::GameSession,
    models::{ConnectionId, GameRules, RoomOptions},
    websocket::handshake::JoinRequest,
};

pub use actor::{PlayerSender, RoomCommand, RoomHandle};
use actor::RoomActor;

/// Every live room, by id
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, RoomHandle>>,
    words: Arc<dyn WordList>,
    rules: GameRules,
}

impl RoomRegistry {
    pub fn new(words: Arc<dyn WordList>, rules: GameRules) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            words,
            rules,
        }
    }

    /// Open a room with `creator` in it. Holding the map entry while the
    /// actor is spawned keeps a concurrent create or join on the same id
    /// from slipping in between.
    pub fn create_room(
        &self,
        room_id: &str,
        creator: &str,
        connection: ConnectionId,
        sender: PlayerSender,
        options: RoomOptions,
    ) -> Result<RoomHandle, JoinError> {
        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(entry) if !entry.get().is_closed() => {
                Err(JoinError::RoomExists(room_id.to_string()))
            }
            entry => {
                let session = GameSession::new(
                    room_id,
                    creator,
                    connection,
                    options,
                    self.rules,
                    self.words.clone(),
                );
                let handle = RoomActor::spawn(session, connection, sender, self.rooms.clone());
                entry.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    pub async fn join_room(
        &self,
        room_id: &str,
        name: &str,
        connection: ConnectionId,
        sender: PlayerSender,
    ) -> Result<RoomHandle, JoinError> {
        let handle = self
            .get(room_id)
            .ok_or_else(|| JoinError::RoomNotFound(room_id.to_string()))?;
        handle.join(name, connection, sender).await?;
        Ok(handle)
    }

    /// Create or join, as the handshake asked
    pub async fn enter(
        &self,
        request: &JoinRequest,
        connection: ConnectionId,
        sender: PlayerSender,
    ) -> Result<RoomHandle, JoinError> {
        match request {
            JoinRequest::Create {
                room,
                name,
                options,
            } => self.create_room(room, name, connection, sender, options.clone()),
            JoinRequest::Join { room, name } => {
                self.join_room(room, name, connection, sender).await
            }
        }
    }

    pub fn get(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms
            .get(room_id)
            .map(|entry| entry.value().clone())
            .filter(|handle| !handle.is_closed())
    }

    /// Take a player out of a room; the room closes itself once empty
    pub async fn remove_player(&self, room_id: &str, name: &str, connection: ConnectionId) {
        if let Some(handle) = self.get(room_id) {
            handle.leave(name, connection).await;
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
