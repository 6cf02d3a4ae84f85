use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::{health, stats};
use super::history::historical_data;
use super::messages::send_message;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Stats
        .route("/health", get(health))
        .route("/stats", get(stats))
        // Relay endpoints
        .route("/api/send-message", post(send_message))
        .route("/api/historical-data", get(historical_data))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::config::Settings;
    use crate::server::{create_app, AppState};
    use crate::websocket::ServerMessage;

    fn test_app() -> axum::Router {
        create_app(AppState::new(Settings::default()))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_send_message_with_no_connections() {
        let payload = serde_json::json!({"value": "Hello, World!", "status": 200});
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send-message")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "message sent");
        assert_eq!(json["to"], 0);
    }

    #[tokio::test]
    async fn test_send_message_echoes_delivered_count() {
        let state = AppState::new(Settings::default());

        // One live connection, one with a broken transport
        let (tx_live, mut rx_live) = mpsc::channel(8);
        state.registry.register(tx_live);
        let (tx_dead, rx_dead) = mpsc::channel(8);
        state.registry.register(tx_dead);
        drop(rx_dead);

        let payload = serde_json::json!({"value": "Hello, World!", "status": 200});
        let response = create_app(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send-message")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "message sent");
        assert_eq!(json["to"], 1);

        let msg = rx_live.recv().await.unwrap();
        assert!(matches!(msg, ServerMessage::Message(m) if m.value == "Hello, World!"));
    }

    #[tokio::test]
    async fn test_send_message_rejects_malformed_body() {
        // Missing the status field; rejected at the boundary
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send-message")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"value": "no status"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_historical_data_returns_sample_batch() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/historical-data")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 10);
        for record in records {
            assert!(record["id"].is_u64());
            assert!(record["value"].is_f64());
            assert!(record["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_stats_reports_empty_registry() {
        let response = test_app()
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["connections"]["active"], 0);
        assert_eq!(json["broadcasts"]["broadcasts"], 0);
    }
}
