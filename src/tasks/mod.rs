mod heartbeat;

pub use heartbeat::HeartbeatEmitter;
