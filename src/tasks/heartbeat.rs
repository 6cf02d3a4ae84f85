use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::connections::{ConnectionHandle, ConnectionRegistry};
use crate::websocket::ServerMessage;

/// Per-connection liveness task.
///
/// One emitter is spawned for each registered connection and pushes a
/// `{"value":"Heartbeat"}` message down it on a fixed period. The first beat
/// fires immediately after the connection is established.
///
/// The emitter stops when the push fails (the connection is gone; it then
/// unregisters it), when the process-wide shutdown signal arrives, or when
/// the WebSocket handler aborts it on close. There is no resumption.
pub struct HeartbeatEmitter {
    connection: Arc<ConnectionHandle>,
    registry: Arc<ConnectionRegistry>,
    period: Duration,
    shutdown: broadcast::Receiver<()>,
}

impl HeartbeatEmitter {
    pub fn new(
        connection: Arc<ConnectionHandle>,
        registry: Arc<ConnectionRegistry>,
        period: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            connection,
            registry,
            period,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.period);

        tracing::debug!(
            connection_id = %self.connection.id,
            period_ms = self.period.as_millis() as u64,
            "Heartbeat emitter started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::debug!(
                        connection_id = %self.connection.id,
                        "Heartbeat emitter received shutdown signal"
                    );
                    break;
                }
                _ = ticker.tick() => {
                    if self.connection.send(ServerMessage::heartbeat()).await.is_err() {
                        tracing::debug!(
                            connection_id = %self.connection.id,
                            "Failed to send heartbeat, connection is gone"
                        );
                        // Idempotent; a concurrent dispatcher-driven removal is fine
                        self.registry.unregister(self.connection.id);
                        break;
                    }
                }
            }
        }

        tracing::debug!(connection_id = %self.connection.id, "Heartbeat emitter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const PERIOD: Duration = Duration::from_millis(50);

    fn setup() -> (
        Arc<ConnectionRegistry>,
        Arc<ConnectionHandle>,
        mpsc::Receiver<ServerMessage>,
        broadcast::Sender<()>,
    ) {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, rx) = mpsc::channel(8);
        let handle = registry.register(tx);
        let (shutdown_tx, _) = broadcast::channel(1);
        (registry, handle, rx, shutdown_tx)
    }

    #[tokio::test]
    async fn test_emits_heartbeat_within_period() {
        let (registry, handle, mut rx, shutdown_tx) = setup();

        let emitter =
            HeartbeatEmitter::new(handle, registry, PERIOD, shutdown_tx.subscribe());
        let task = tokio::spawn(emitter.run());

        // First beat fires immediately, well within 1.5x the period
        let msg = tokio::time::timeout(PERIOD * 3 / 2, rx.recv())
            .await
            .expect("should receive a heartbeat")
            .expect("channel should be open");
        assert_eq!(msg, ServerMessage::heartbeat());

        // And keeps beating on the period
        let msg = tokio::time::timeout(PERIOD * 3 / 2, rx.recv())
            .await
            .expect("should receive a second heartbeat")
            .unwrap();
        assert_eq!(msg, ServerMessage::heartbeat());

        shutdown_tx.send(()).unwrap();
        let _ = task.await;
    }

    #[tokio::test]
    async fn test_stops_and_unregisters_on_closed_connection() {
        let (registry, handle, rx, shutdown_tx) = setup();
        let connection_id = handle.id;
        drop(rx);

        let emitter =
            HeartbeatEmitter::new(handle, registry.clone(), PERIOD, shutdown_tx.subscribe());
        let task = tokio::spawn(emitter.run());

        // Emitter terminates within one period of the transport closing
        tokio::time::timeout(PERIOD * 2, task)
            .await
            .expect("emitter should stop")
            .expect("emitter should not panic");

        assert!(!registry.contains(connection_id));
        assert_eq!(registry.size(), 0);
    }

    #[tokio::test]
    async fn test_stops_on_shutdown_signal() {
        let (registry, handle, mut rx, shutdown_tx) = setup();

        let emitter =
            HeartbeatEmitter::new(handle, registry.clone(), PERIOD, shutdown_tx.subscribe());
        let task = tokio::spawn(emitter.run());

        // Let it beat at least once
        let _ = tokio::time::timeout(PERIOD * 2, rx.recv()).await;

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("emitter should stop on shutdown")
            .expect("emitter should not panic");

        // Shutdown does not prune the registry; teardown happens with the process
        assert_eq!(registry.size(), 1);
    }
}
