use serde::{Deserialize, Serialize};

/// Reserved payload value for liveness messages
pub const HEARTBEAT_VALUE: &str = "Heartbeat";

/// A message broadcast to every connected client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub value: String,
    pub status: i64,
}

/// Messages sent from server to client.
///
/// Untagged: the wire format is the bare JSON object the clients already
/// speak, `{"value": ..., "status": ...}` for broadcasts and
/// `{"value": "Heartbeat"}` for liveness pings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Message(OutboundMessage),
    Heartbeat { value: String },
}

impl ServerMessage {
    pub fn heartbeat() -> Self {
        Self::Heartbeat {
            value: HEARTBEAT_VALUE.to_string(),
        }
    }
}

impl From<OutboundMessage> for ServerMessage {
    fn from(message: OutboundMessage) -> Self {
        Self::Message(message)
    }
}
