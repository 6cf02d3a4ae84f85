use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::broadcast::BroadcastDispatcher;
use crate::config::Settings;
use crate::connections::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: Arc<BroadcastDispatcher>,
    /// Fans the process shutdown signal out to per-connection heartbeat emitters
    pub shutdown: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = Arc::new(BroadcastDispatcher::new(
            registry.clone(),
            Duration::from_millis(settings.websocket.send_timeout_ms),
        ));
        let (shutdown, _) = broadcast::channel(1);

        Self {
            settings: Arc::new(settings),
            registry,
            dispatcher,
            shutdown,
        }
    }
}
