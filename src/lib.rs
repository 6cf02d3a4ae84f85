// Domain layer
pub mod broadcast;
pub mod connections;

// Application layer
pub mod api;
pub mod server;
pub mod websocket;

// Supporting modules
pub mod config;
pub mod error;
pub mod tasks;
