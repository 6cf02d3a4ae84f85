//! API layer - HTTP endpoint handlers organized by domain.

mod health;
mod history;
mod messages;
mod routes;

pub use health::{health, stats};
pub use history::{historical_data, HistoricalMetric};
pub use messages::{send_message, SendMessageRequest, SendMessageResponse};
pub use routes::api_routes;
