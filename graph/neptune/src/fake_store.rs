//! In-memory stand-in for a Gremlin store, driven by structured upserts and
//! answering reads in GraphSON 3.

use crate::graphson::{DOUBLE, INT32, INT64, LIST, MAP, TOKEN};
use crate::keys;
use crate::upsert::{Cardinality, UpsertTraversal};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use volunteer_graph::PropertyValue;

struct StoredVertex {
    id: i64,
    label: String,
    properties: Vec<(String, Vec<PropertyValue>)>,
}

impl StoredVertex {
    fn set(&mut self, key: &str, value: PropertyValue, cardinality: Cardinality) {
        match self.properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => match cardinality {
                Cardinality::Single => *values = vec![value],
                Cardinality::Set => {
                    if !values.contains(&value) {
                        values.push(value);
                    }
                }
            },
            None => self.properties.push((key.to_string(), vec![value])),
        }
    }

    fn did(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == keys::DID)
            .and_then(|(_, values)| values.first())
            .and_then(PropertyValue::as_str)
    }
}

pub(crate) struct InMemoryGraph {
    vertices: Vec<StoredVertex>,
    next_id: i64,
    preserve_set_order: bool,
}

impl InMemoryGraph {
    pub(crate) fn new() -> Self {
        Self {
            vertices: Vec::new(),
            next_id: 1,
            preserve_set_order: true,
        }
    }

    /// Returns set-valued properties in reverse insertion order.
    pub(crate) fn unordered() -> Self {
        Self {
            preserve_set_order: false,
            ..Self::new()
        }
    }

    pub(crate) fn apply(&mut self, upsert: &UpsertTraversal) {
        let existing = self.vertices.iter().position(|vertex| {
            vertex.label == upsert.label && vertex.did() == Some(upsert.did.as_str())
        });
        let index = match existing {
            Some(index) => {
                self.vertices[index]
                    .properties
                    .retain(|(key, _)| keys::PRESERVED_ON_UPDATE.contains(&key.as_str()));
                index
            }
            None => {
                let mut vertex = StoredVertex {
                    id: self.next_id,
                    label: upsert.label.to_string(),
                    properties: Vec::new(),
                };
                self.next_id += 1;
                vertex.set(keys::DID, upsert.did.as_str().into(), Cardinality::Single);
                vertex.set(
                    keys::CREATED_AT,
                    upsert.created_at.as_str().into(),
                    Cardinality::Single,
                );
                self.vertices.push(vertex);
                self.vertices.len() - 1
            }
        };

        let vertex = &mut self.vertices[index];
        for step in &upsert.steps {
            vertex.set(step.key, step.value.clone(), step.cardinality);
        }
    }

    pub(crate) fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub(crate) fn properties_of(&self, did: &str) -> Option<BTreeMap<String, Vec<PropertyValue>>> {
        self.vertices
            .iter()
            .find(|vertex| vertex.did() == Some(did))
            .map(|vertex| vertex.properties.iter().cloned().collect())
    }

    /// A `valueMap(true)` response over every vertex, in the HTTP envelope.
    pub(crate) fn value_map_response(&self) -> Value {
        let maps: Vec<Value> = self.vertices.iter().map(|v| self.value_map(v)).collect();
        json!({
            "requestId": "fake",
            "status": {"code": 200, "message": ""},
            "result": {"data": {"@type": LIST, "@value": maps}, "meta": {}}
        })
    }

    fn value_map(&self, vertex: &StoredVertex) -> Value {
        let mut entries = vec![
            json!({"@type": TOKEN, "@value": "id"}),
            json!({"@type": INT64, "@value": vertex.id}),
            json!({"@type": TOKEN, "@value": "label"}),
            json!(vertex.label),
        ];
        for (key, values) in &vertex.properties {
            let mut encoded: Vec<Value> = values.iter().map(encode).collect();
            if !self.preserve_set_order && keys::is_multi_valued(key) {
                encoded.reverse();
            }
            entries.push(json!(key));
            entries.push(json!({"@type": LIST, "@value": encoded}));
        }
        json!({"@type": MAP, "@value": entries})
    }
}

fn encode(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Int32(i) => json!({"@type": INT32, "@value": i}),
        PropertyValue::Int64(i) => json!({"@type": INT64, "@value": i}),
        PropertyValue::Float64(f) => json!({"@type": DOUBLE, "@value": f}),
        PropertyValue::Json(v) => Value::String(v.to_string()),
        other => other.to_json(),
    }
}
