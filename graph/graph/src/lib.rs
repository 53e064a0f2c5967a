pub mod config;
pub mod error;
pub mod model;
pub mod value;

use crate::error::GraphError;
use serde_json::{Map, Value};
use std::sync::Mutex;

pub use crate::config::ConnectionConfig;
pub use crate::model::{DateRange, History, Preferences, Times, Volunteer};
pub use crate::value::PropertyValue;

/// The one capability the mapping layer needs from a graph database:
/// run a Gremlin script and hand back the decoded JSON body.
///
/// Transport, timeouts and connection lifecycle belong to the implementor.
pub trait GremlinExecutor {
    fn execute(&self, query: &str, bindings: Option<Map<String, Value>>)
        -> Result<Value, GraphError>;
}

impl<T: GremlinExecutor + ?Sized> GremlinExecutor for &T {
    fn execute(
        &self,
        query: &str,
        bindings: Option<Map<String, Value>>,
    ) -> Result<Value, GraphError> {
        (**self).execute(query, bindings)
    }
}

struct LoggingState {
    logging_initialized: bool,
}

impl LoggingState {
    fn init(&mut self) {
        if !self.logging_initialized {
            let level = config::get_config_with_default(config::LOG_LEVEL_KEY, "info");
            let filter = tracing_subscriber::EnvFilter::try_new(&level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
            self.logging_initialized = true;
        }
    }
}

static LOGGING_STATE: Mutex<LoggingState> = Mutex::new(LoggingState {
    logging_initialized: false,
});

/// Installs the process-wide log subscriber; later calls are no-ops.
pub fn init_logging() {
    if let Ok(mut state) = LOGGING_STATE.lock() {
        state.init();
    }
}
