mod handler;
mod message;

pub use handler::ws_handler;
pub use message::{OutboundMessage, ServerMessage, HEARTBEAT_VALUE};
