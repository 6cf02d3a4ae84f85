use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::server::AppState;
use crate::tasks::HeartbeatEmitter;

use super::message::ServerMessage;

const CHANNEL_BUFFER_SIZE: usize = 32;

/// WebSocket upgrade handler
#[tracing::instrument(name = "ws.upgrade", skip(ws, state))]
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// The socket sink is owned by a single send task draining this connection's
/// channel; everything that writes to the client (heartbeats, broadcasts)
/// goes through the channel, which serializes pushes per connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_start = std::time::Instant::now();

    // Create channel for sending messages to this connection
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CHANNEL_BUFFER_SIZE);
    let handle = state.registry.register(tx);
    let connection_id = handle.id;

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    // Start this connection's heartbeat emitter
    let emitter = HeartbeatEmitter::new(
        handle,
        state.registry.clone(),
        Duration::from_secs(state.settings.websocket.heartbeat_interval),
        state.shutdown.subscribe(),
    );
    let emitter_handle = tokio::spawn(emitter.run());

    // Split socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Task for sending messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize message");
                    continue;
                }
            };

            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Task watching the inbound side for close or transport error. The relay
    // defines no client protocol, so other inbound frames are drained and
    // ignored.
    let recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Received close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task completed");
        }
        _ = recv_task => {
            tracing::debug!(connection_id = %connection_id, "Receive task completed");
        }
    }

    // Unregister the connection and stop its heartbeat emitter
    state.registry.unregister(connection_id);
    emitter_handle.abort();

    tracing::info!(
        connection_id = %connection_id,
        duration_secs = connection_start.elapsed().as_secs_f64(),
        "WebSocket connection closed"
    );
}
