use axum::{extract::State, Json};
use serde::Serialize;

use crate::broadcast::DispatcherStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub connections: ConnectionStats,
    pub broadcasts: DispatcherStatsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ConnectionStats {
    pub active: usize,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        connections: ConnectionStats {
            active: state.registry.size(),
        },
        broadcasts: state.dispatcher.stats(),
    })
}
