use log::trace;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use volunteer_graph::error::{error_from_status, from_reqwest_error, GraphError};
use volunteer_graph::{ConnectionConfig, GremlinExecutor};

#[derive(Serialize, Debug)]
struct GremlinRequest<'a> {
    gremlin: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bindings: Option<Map<String, Value>>,
}

/// Gremlin-over-HTTP client for a Neptune (or any TinkerPop) endpoint.
/// Based on https://docs.aws.amazon.com/neptune/latest/userguide/access-graph-gremlin-rest.html
#[derive(Clone)]
pub struct NeptuneApi {
    client: Client,
    gremlin_url: String,
}

impl NeptuneApi {
    pub fn new(config: &ConnectionConfig) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| from_reqwest_error("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            gremlin_url: format!("{}/gremlin", config.endpoint.trim_end_matches('/')),
        })
    }

    pub fn gremlin_url(&self) -> &str {
        &self.gremlin_url
    }

    fn handle_response(response: Response) -> Result<Value, GraphError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<Value>()
                .map_err(|e| from_reqwest_error("Failed to decode Gremlin response", e))
        } else {
            let body = response.text().unwrap_or_default();
            Err(error_from_status(status, body))
        }
    }
}

impl GremlinExecutor for NeptuneApi {
    fn execute(
        &self,
        query: &str,
        bindings: Option<Map<String, Value>>,
    ) -> Result<Value, GraphError> {
        trace!("[NeptuneApi] POST {} gremlin={query}", self.gremlin_url);
        let request = GremlinRequest {
            gremlin: query,
            bindings,
        };

        let response = self
            .client
            .post(&self.gremlin_url)
            .json(&request)
            .send()
            .map_err(|e| from_reqwest_error("Gremlin request failed", e))?;

        Self::handle_response(response)
    }
}
