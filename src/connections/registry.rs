use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::websocket::ServerMessage;

/// Handle for a single WebSocket connection
pub struct ConnectionHandle {
    pub id: Uuid,
    pub sender: mpsc::Sender<ServerMessage>,
    pub connected_at: DateTime<Utc>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            connected_at: Utc::now(),
        }
    }

    /// Push a message down this connection's outbound channel.
    ///
    /// All writers (heartbeat emitter, broadcast dispatcher) go through this
    /// channel; the single task draining it owns the socket sink, so writes
    /// to one connection are never interleaved. Fails iff the draining task
    /// is gone, i.e. the connection is closed.
    pub async fn send(
        &self,
        message: ServerMessage,
    ) -> Result<(), mpsc::error::SendError<ServerMessage>> {
        self.sender.send(message).await
    }
}

/// The authoritative set of currently active connections.
///
/// A connection is a member iff it is open and has not yet failed a send or
/// explicitly disconnected. Shared by the WebSocket handlers, the broadcast
/// dispatcher, and the per-connection heartbeat emitters.
pub struct ConnectionRegistry {
    connections: DashMap<Uuid, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection
    pub fn register(&self, sender: mpsc::Sender<ServerMessage>) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(sender));
        self.connections.insert(handle.id, handle.clone());

        tracing::info!(connection_id = %handle.id, "Connection registered");

        handle
    }

    /// Unregister a connection. Removing an absent connection is a no-op, so
    /// the heartbeat emitter and the dispatcher may race on the same removal.
    pub fn unregister(&self, connection_id: Uuid) {
        if self.connections.remove(&connection_id).is_some() {
            tracing::info!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Point-in-time copy of the current members, safe to iterate without
    /// holding any registry lock.
    pub fn snapshot(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections.iter().map(|r| r.value().clone()).collect()
    }

    /// Current member count
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    pub fn contains(&self, connection_id: Uuid) -> bool {
        self.connections.contains_key(&connection_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
