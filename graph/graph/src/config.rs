use crate::error::GraphError;
use log::{debug, trace};
use std::ffi::OsStr;

pub const ENDPOINT_KEY: &str = "NEPTUNE_ENDPOINT";
pub const TIMEOUT_KEY: &str = "GRAPH_PROVIDER_TIMEOUT";
pub const USE_BINDINGS_KEY: &str = "GRAPH_USE_BINDINGS";
pub const LOG_LEVEL_KEY: &str = "VOLUNTEER_GRAPH_LOG";

pub fn with_config_key<R>(
    key: impl AsRef<OsStr>,
    fail: impl FnOnce(GraphError) -> R,
    succeed: impl FnOnce(String) -> R,
) -> R {
    match validate_config_key(key) {
        Ok(value) => succeed(value),
        Err(error) => fail(error),
    }
}

pub fn get_optional_config(key: impl AsRef<OsStr>) -> Option<String> {
    std::env::var(key).ok()
}

pub fn get_config_with_default(key: impl AsRef<OsStr>, default: impl Into<String>) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

pub fn validate_config_key(key: impl AsRef<OsStr>) -> Result<String, GraphError> {
    let key_str = key.as_ref().to_string_lossy().to_string();
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| GraphError::ConnectionFailed(format!("Missing config key: {key_str}")))
}

pub fn get_timeout_config() -> u64 {
    get_config_with_default(TIMEOUT_KEY, "30")
        .parse()
        .unwrap_or(30)
}

pub fn get_use_bindings_config() -> bool {
    parse_flag(&get_config_with_default(USE_BINDINGS_KEY, "false"))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Settings for reaching the Gremlin HTTP endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Send writes as parameter-bound queries instead of inline literals.
    pub use_bindings: bool,
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout_secs: 30,
            use_bindings: false,
        }
    }

    pub fn from_env() -> Result<Self, GraphError> {
        if let Err(err) = dotenvy::dotenv() {
            trace!("No .env file loaded: {err}");
        }
        with_config_key(ENDPOINT_KEY, Err, |endpoint| {
            let config = Self {
                timeout_secs: get_timeout_config(),
                use_bindings: get_use_bindings_config(),
                ..Self::new(endpoint)
            };
            debug!(
                "Graph endpoint {} (timeout {}s, bindings {})",
                config.endpoint, config.timeout_secs, config.use_bindings
            );
            Ok(config)
        })
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_bindings(mut self, use_bindings: bool) -> Self {
        self.use_bindings = use_bindings;
        self
    }
}
