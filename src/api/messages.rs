//! Broadcast trigger endpoint

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::websocket::OutboundMessage;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub value: String,
    pub status: i64,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub status: String,
    /// Number of connections the message was delivered to
    pub to: usize,
}

/// Broadcast a message to all connected clients. Malformed bodies are
/// rejected here, before the dispatcher sees anything.
#[tracing::instrument(name = "http.send_message", skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let result = state
        .dispatcher
        .broadcast(OutboundMessage {
            value: request.value,
            status: request.status,
        })
        .await;

    Ok(Json(SendMessageResponse {
        status: "message sent".to_string(),
        to: result.delivered,
    }))
}
