use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::time::timeout;
use uuid::Uuid;

use crate::connections::ConnectionRegistry;
use crate::websocket::{OutboundMessage, ServerMessage};

/// Result of one broadcast round
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    /// Number of connections the message was delivered to
    pub delivered: usize,
    /// Number of connections that failed to receive
    pub failed: usize,
}

/// Cumulative dispatcher counters
#[derive(Debug, Default)]
struct DispatcherStats {
    broadcasts: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of dispatcher statistics
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStatsSnapshot {
    pub broadcasts: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// Delivers a message to every registered connection.
///
/// Broadcast is two-phase: snapshot the registry first, push to every member
/// of the snapshot, and only after the traversal completes remove the members
/// whose push failed. The registry is never mutated while being iterated.
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
    send_timeout: Duration,
    stats: DispatcherStats,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
            stats: DispatcherStats::default(),
        }
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatcherStatsSnapshot {
        DispatcherStatsSnapshot {
            broadcasts: self.stats.broadcasts.load(Ordering::Relaxed),
            delivered: self.stats.delivered.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
        }
    }

    /// Broadcast a message to all connected clients.
    ///
    /// Members are attempted in parallel, each under its own send timeout, so
    /// one stuck connection cannot stall the round. A failed push is terminal
    /// for that connection: it is unregistered, not retried. Failures are
    /// absorbed here and only show up in the returned counts.
    #[tracing::instrument(
        name = "dispatcher.broadcast",
        skip(self, message),
        fields(status = message.status)
    )]
    pub async fn broadcast(&self, message: OutboundMessage) -> DeliveryResult {
        let connections = self.registry.snapshot();

        if connections.is_empty() {
            self.stats.broadcasts.fetch_add(1, Ordering::Relaxed);
            return DeliveryResult {
                delivered: 0,
                failed: 0,
            };
        }

        let outbound = ServerMessage::from(message);

        let mut sends: FuturesUnordered<_> = connections
            .iter()
            .map(|conn| {
                let conn = conn.clone();
                let msg = outbound.clone();
                let send_timeout = self.send_timeout;

                async move {
                    match timeout(send_timeout, conn.send(msg)).await {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(_)) => {
                            tracing::debug!(
                                connection_id = %conn.id,
                                "Failed to push broadcast, connection is dead"
                            );
                            Err(conn.id)
                        }
                        Err(_) => {
                            tracing::debug!(
                                connection_id = %conn.id,
                                timeout_ms = send_timeout.as_millis() as u64,
                                "Broadcast push timed out"
                            );
                            Err(conn.id)
                        }
                    }
                }
            })
            .collect();

        let mut delivered = 0usize;
        let mut failures: Vec<Uuid> = Vec::new();

        while let Some(result) = sends.next().await {
            match result {
                Ok(()) => delivered += 1,
                Err(id) => failures.push(id),
            }
        }

        // Traversal done; apply removals
        let failed = failures.len();
        for id in failures {
            self.registry.unregister(id);
        }

        self.stats.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.stats
            .delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.stats.failed.fetch_add(failed as u64, Ordering::Relaxed);

        tracing::debug!(
            total = connections.len(),
            delivered = delivered,
            failed = failed,
            "Broadcast round completed"
        );

        DeliveryResult { delivered, failed }
    }
}
