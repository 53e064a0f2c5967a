use crate::client::NeptuneApi;
use crate::graphson::{parse_count, parse_vertices};
use crate::query::{self, GremlinQuery, Rendering};
use crate::reconstruct::reconstruct_all;
use crate::upsert::build_upsert;
use log::{debug, error, trace};
use serde_json::Value;
use volunteer_graph::error::{invalid_input, GraphError};
use volunteer_graph::{init_logging, ConnectionConfig, GremlinExecutor, Volunteer};

/// Volunteer persistence over any [`GremlinExecutor`].
///
/// Holds no state besides the executor; every call is one query round-trip.
pub struct VolunteerRepository<E> {
    executor: E,
    rendering: Rendering,
}

impl<E: GremlinExecutor> VolunteerRepository<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            rendering: Rendering::Inline,
        }
    }

    pub fn with_rendering(mut self, rendering: Rendering) -> Self {
        self.rendering = rendering;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn run(&self, operation: &str, query: GremlinQuery) -> Result<Value, GraphError> {
        trace!("[{operation}] {}", query.text);
        self.executor
            .execute(&query.text, query.bindings)
            .map_err(|e| {
                error!("Volunteer {operation} failed: {e}");
                e
            })
    }

    /// Updates the vertex with this volunteer's `did`, creating it if absent.
    pub fn upsert(&self, volunteer: &Volunteer) -> Result<(), GraphError> {
        let upsert = build_upsert(volunteer)?;
        debug!(
            "Upserting volunteer {} with {} properties",
            upsert.did,
            upsert.steps.len()
        );
        self.run("upsert", upsert.render(self.rendering))?;
        Ok(())
    }

    pub fn get(&self, did: &str) -> Result<Option<Volunteer>, GraphError> {
        require_did(did)?;
        let response = self.run("get", query::get_by_did(did, self.rendering))?;
        let vertices = parse_vertices(&response).map_err(|e| {
            error!("Could not parse volunteer {did}: {e}");
            e
        })?;
        Ok(reconstruct_all(&vertices)?.into_iter().next())
    }

    /// Lists volunteers; vertices lacking a `did` are left out.
    pub fn list(&self, limit: Option<u64>) -> Result<Vec<Volunteer>, GraphError> {
        let response = self.run("list", query::list(limit))?;
        let vertices = parse_vertices(&response)?;
        reconstruct_all(&vertices)
    }

    pub fn delete(&self, did: &str) -> Result<(), GraphError> {
        require_did(did)?;
        debug!("Deleting volunteer {did}");
        self.run("delete", query::delete_by_did(did, self.rendering))?;
        Ok(())
    }

    /// Deletes up to `limit` volunteers, in no particular order.
    pub fn delete_many(&self, limit: u64) -> Result<(), GraphError> {
        debug!("Deleting up to {limit} volunteers");
        self.run("delete_many", query::delete_many(limit))?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64, GraphError> {
        let response = self.run("count", query::count())?;
        parse_count(&response)
    }
}

fn require_did(did: &str) -> Result<(), GraphError> {
    if did.trim().is_empty() {
        Err(invalid_input("did must not be empty"))
    } else {
        Ok(())
    }
}

/// Builds a repository backed by the HTTP endpoint in `config`.
pub fn connect(config: &ConnectionConfig) -> Result<VolunteerRepository<NeptuneApi>, GraphError> {
    init_logging();
    let api = NeptuneApi::new(config)?;
    debug!("Connected volunteer repository to {}", api.gremlin_url());
    Ok(VolunteerRepository::new(api).with_rendering(Rendering::from_flag(config.use_bindings)))
}

/// [`connect`] using `NEPTUNE_ENDPOINT` and friends from the environment.
pub fn connect_from_env() -> Result<VolunteerRepository<NeptuneApi>, GraphError> {
    connect(&ConnectionConfig::from_env()?)
}
