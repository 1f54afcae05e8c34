//! Configuration files read by the host

pub mod app;

pub use app::{load_app_config, parse_app_config, AppConfig, BuildStanza};

/// File name looked up when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "builder.yml";

/// JSON Schema of the app configuration file, for editor tooling
pub fn app_config_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(AppConfig)).unwrap_or(serde_json::Value::Null)
}
