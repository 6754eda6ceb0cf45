use crate::{
    websocket::{
        handshake::JoinQuery,
        messages::{ClientEvent, Color, ServerEvent},
    },
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        RawQuery, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Server events buffered per connection before new ones are dropped
pub const OUTBOUND_BUFFER: usize = 100;

/// WebSocket upgrade handler; the room handshake rides in the query string
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    RawQuery(query): RawQuery,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.unwrap_or_default()))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, query: String) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);
    let connection = Uuid::new_v4();
    // The room holds the only strong sender; when it lets go the socket closes
    let replies = tx.downgrade();

    let request = JoinQuery::parse(&query)
        .map_err(|e| e.to_string())
        .and_then(|q| q.validate().map_err(|e| e.to_string()));
    let joined = match request {
        Ok(request) => state
            .registry
            .enter(&request, connection, tx)
            .await
            .map(|room| (room, request.name().to_string()))
            .map_err(|e| e.to_string()),
        Err(e) => Err(e),
    };

    let (room, name) = match joined {
        Ok(joined) => joined,
        Err(error) => {
            tracing::info!("Join rejected: {}", error);
            send_event(&mut sender, &ServerEvent::JoinError { error }).await;
            let _ = sender.close().await;
            return;
        }
    };

    tracing::info!(
        "WebSocket connection established for {} in room {}",
        name,
        room.room_id()
    );

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !send_event(&mut sender, &event).await {
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Handle incoming messages from the client
    let room_for_recv = room.clone();
    let name_for_recv = name.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        if !room_for_recv.send(&name_for_recv, connection, event).await {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Failed to parse message from {}: {}", name_for_recv, e);
                        if let Some(tx) = replies.upgrade() {
                            let _ = tx.try_send(ServerEvent::Announcement {
                                msg: format!("Invalid message format: {}", e),
                                color: Color::Red,
                            });
                        }
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Client disconnected: {}", name_for_recv);
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    room.leave(&name, connection).await;

    tracing::info!(
        "WebSocket connection closed for {} in room {}",
        name,
        room.room_id()
    );
}

/// Serialize and write one event; false once the socket is gone
async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            true
        }
    }
}
