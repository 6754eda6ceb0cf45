//! One tokio task per room.
//!
//! The actor owns the room's [`GameSession`] and is the only code that
//! touches it, so every action on a room is applied one at a time. Outbound
//! events are pushed onto each connection's channel with `try_send` and never
//! awaited.

use std::{collections::HashMap, sync::Arc};

use dashmap::DashMap;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};

use crate::{
    error::JoinError,
    game::{GameSession, Outbound, TimerDriver, TimerToken},
    models::ConnectionId,
    websocket::messages::{ClientEvent, RoomSnapshot, ServerEvent},
};

/// Commands queued per room before the actor stops accepting more
pub const ROOM_COMMAND_BUFFER: usize = 256;

/// Channel a connection reads its server events from
pub type PlayerSender = mpsc::Sender<ServerEvent>;

pub enum RoomCommand {
    Join {
        name: String,
        connection: ConnectionId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), JoinError>>,
    },
    Leave {
        name: String,
        connection: ConnectionId,
    },
    Client {
        name: String,
        connection: ConnectionId,
        event: ClientEvent,
    },
    TimerFired(TimerToken),
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Cheap handle for talking to a room's actor
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: String,
    commands: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Add a player. A room that shut down in the meantime reports
    /// `RoomNotFound`.
    pub async fn join(
        &self,
        name: &str,
        connection: ConnectionId,
        sender: PlayerSender,
    ) -> Result<(), JoinError> {
        let (reply, answer) = oneshot::channel();
        let command = RoomCommand::Join {
            name: name.to_string(),
            connection,
            sender,
            reply,
        };
        if self.commands.send(command).await.is_err() {
            return Err(JoinError::RoomNotFound(self.room_id.clone()));
        }
        answer
            .await
            .unwrap_or_else(|_| Err(JoinError::RoomNotFound(self.room_id.clone())))
    }

    pub async fn leave(&self, name: &str, connection: ConnectionId) {
        let _ = self
            .commands
            .send(RoomCommand::Leave {
                name: name.to_string(),
                connection,
            })
            .await;
    }

    /// Forward a client event; false once the room is gone
    pub async fn send(&self, name: &str, connection: ConnectionId, event: ClientEvent) -> bool {
        self.commands
            .send(RoomCommand::Client {
                name: name.to_string(),
                connection,
                event,
            })
            .await
            .is_ok()
    }

    pub async fn snapshot(&self) -> Option<RoomSnapshot> {
        let (reply, answer) = oneshot::channel();
        self.commands
            .send(RoomCommand::Snapshot { reply })
            .await
            .ok()?;
        answer.await.ok()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Resolves once the actor has shut down and left the registry
    pub async fn closed(&self) {
        self.commands.closed().await
    }

    fn is_handle_of(&self, commands: &mpsc::Sender<RoomCommand>) -> bool {
        self.commands.same_channel(commands)
    }
}

struct Connection {
    id: ConnectionId,
    sender: PlayerSender,
}

pub struct RoomActor {
    session: GameSession,
    connections: HashMap<String, Connection>,
    commands: mpsc::Receiver<RoomCommand>,
    /// Our own command channel, for timer expiries
    loopback: mpsc::Sender<RoomCommand>,
    driver: TimerDriver,
    rooms: Arc<DashMap<String, RoomHandle>>,
}

impl RoomActor {
    /// Start the actor for a freshly created session whose only player is
    /// the creator
    pub fn spawn(
        session: GameSession,
        creator_connection: ConnectionId,
        creator_sender: PlayerSender,
        rooms: Arc<DashMap<String, RoomHandle>>,
    ) -> RoomHandle {
        let (tx, rx) = mpsc::channel(ROOM_COMMAND_BUFFER);
        let handle = RoomHandle {
            room_id: session.room_id().to_string(),
            commands: tx.clone(),
        };

        let mut connections = HashMap::new();
        if let Some(creator) = session.players().first() {
            connections.insert(
                creator.name.clone(),
                Connection {
                    id: creator_connection,
                    sender: creator_sender,
                },
            );
        }

        let actor = RoomActor {
            session,
            connections,
            commands: rx,
            loopback: tx,
            driver: TimerDriver::default(),
            rooms,
        };
        tokio::spawn(actor.run());
        handle
    }

    async fn run(mut self) {
        self.flush();
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
            self.flush();
            self.driver
                .sync(self.session.timer(), &self.loopback, RoomCommand::TimerFired);
            if self.session.is_empty() {
                break;
            }
        }
        self.shutdown();
    }

    fn apply(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join {
                name,
                connection,
                sender,
                reply,
            } => {
                let result = self.session.join(&name, connection);
                if result.is_ok() {
                    self.connections.insert(
                        name,
                        Connection {
                            id: connection,
                            sender,
                        },
                    );
                }
                let _ = reply.send(result);
            }
            RoomCommand::Leave { name, connection } => {
                if self.is_current(&name, connection) {
                    self.connections.remove(&name);
                }
                self.session.leave(&name, connection);
            }
            RoomCommand::Client {
                name,
                connection,
                event,
            } => {
                if self.is_current(&name, connection) {
                    self.session.handle(&name, event);
                } else {
                    tracing::debug!(
                        "Ignoring event from stale connection {} in room {}",
                        name,
                        self.session.room_id()
                    );
                }
            }
            RoomCommand::TimerFired(token) => self.session.on_timer(token),
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
        }
    }

    fn is_current(&self, name: &str, connection: ConnectionId) -> bool {
        self.connections
            .get(name)
            .is_some_and(|conn| conn.id == connection)
    }

    /// Hand everything the session queued to the connections
    fn flush(&mut self) {
        for outbound in self.session.drain_outbox() {
            match outbound {
                Outbound::Room(event) => {
                    for (name, conn) in &self.connections {
                        deliver(self.session.room_id(), name, conn, event.clone());
                    }
                }
                Outbound::RoomExcept { except, event } => {
                    for (name, conn) in &self.connections {
                        if *name != except {
                            deliver(self.session.room_id(), name, conn, event.clone());
                        }
                    }
                }
                Outbound::To { player, event } => {
                    if let Some(conn) = self.connections.get(&player) {
                        deliver(self.session.room_id(), &player, conn, event);
                    }
                }
                Outbound::Disconnect { player } => {
                    // Dropping the sender ends the connection's write loop
                    self.connections.remove(&player);
                }
            }
        }
    }

    fn shutdown(mut self) {
        self.driver.cancel();
        let loopback = &self.loopback;
        self.rooms
            .remove_if(self.session.room_id(), |_, handle| handle.is_handle_of(loopback));
        tracing::info!("Room {} closed", self.session.room_id());

        self.commands.close();
        while let Ok(command) = self.commands.try_recv() {
            if let RoomCommand::Join { reply, .. } = command {
                let _ = reply.send(Err(JoinError::RoomNotFound(
                    self.session.room_id().to_string(),
                )));
            }
        }
    }
}

fn deliver(room_id: &str, name: &str, conn: &Connection, event: ServerEvent) {
    match conn.sender.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!("Dropped a message for {} in room {}: outbox full", name, room_id);
        }
        // The connection is gone and its leave is already queued
        Err(TrySendError::Closed(_)) => {}
    }
}
