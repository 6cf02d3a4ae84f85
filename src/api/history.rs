//! Synthetic sample-metrics endpoint. Stateless, no relation to the
//! connection registry.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalMetric {
    pub id: u32,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Return a batch of synthetically generated metric records
#[tracing::instrument(name = "http.historical_data", skip(state))]
pub async fn historical_data(State(state): State<AppState>) -> Json<Vec<HistoricalMetric>> {
    let mut rng = rand::rng();
    let now = Utc::now();

    let records = (0..state.settings.metrics.sample_size)
        .map(|_| HistoricalMetric {
            id: rng.random_range(1..=1000),
            value: rng.random_range(0.0..100.0),
            timestamp: now,
        })
        .collect();

    Json(records)
}
