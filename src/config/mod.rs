mod settings;

pub use settings::{MetricsConfig, ServerConfig, Settings, WebSocketConfig};
