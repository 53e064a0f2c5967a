//! Volunteer profiles on a Gremlin property graph.
//!
//! Writes go `Volunteer` → [`flatten()`] → [`build_upsert()`] → executor; reads go
//! executor → [`parse_vertices()`] → [`reconstruct()`] → `Volunteer`.

pub mod client;
pub mod escape;
pub mod flatten;
pub mod graphson;
pub mod keys;
pub mod query;
pub mod reconstruct;
pub mod repository;
pub mod upsert;

#[cfg(test)]
mod fake_store;

pub use crate::client::NeptuneApi;
pub use crate::flatten::{flatten, FlatProperty};
pub use crate::graphson::{parse_vertices, Property, VertexProperties};
pub use crate::query::{GremlinQuery, Rendering};
pub use crate::reconstruct::{reconstruct, reconstruct_all};
pub use crate::repository::{connect, connect_from_env, VolunteerRepository};
pub use crate::upsert::{build_upsert, Cardinality, PropertyStep, UpsertTraversal};
