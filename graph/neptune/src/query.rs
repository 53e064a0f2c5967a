use crate::escape::{quote, to_literal};
use crate::keys::{DID, VOLUNTEER_LABEL};
use serde_json::{Map, Value};
use volunteer_graph::PropertyValue;

/// How values are placed into a Gremlin script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Escaped literals inline in the script text.
    Inline,
    /// Named parameters sent alongside the script.
    Bindings,
}

impl Rendering {
    pub fn from_flag(use_bindings: bool) -> Self {
        if use_bindings {
            Rendering::Bindings
        } else {
            Rendering::Inline
        }
    }
}

/// A rendered script plus any parameters it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct GremlinQuery {
    pub text: String,
    pub bindings: Option<Map<String, Value>>,
}

impl GremlinQuery {
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bindings: None,
        }
    }
}

/// Collects parameters while a script is rendered, handing back either a
/// literal or a parameter name for each value.
pub(crate) struct Renderer {
    mode: Rendering,
    bindings: Map<String, Value>,
}

impl Renderer {
    pub(crate) fn new(mode: Rendering) -> Self {
        Self {
            mode,
            bindings: Map::new(),
        }
    }

    pub(crate) fn value(&mut self, name: &str, value: &PropertyValue) -> String {
        match self.mode {
            Rendering::Inline => to_literal(value),
            Rendering::Bindings => {
                self.bindings.insert(name.to_string(), binding_value(value));
                name.to_string()
            }
        }
    }

    pub(crate) fn key(&mut self, name: &str, key: &str) -> String {
        match self.mode {
            Rendering::Inline => quote(key),
            Rendering::Bindings => {
                self.bindings
                    .insert(name.to_string(), Value::String(key.to_string()));
                name.to_string()
            }
        }
    }

    pub(crate) fn finish(self, text: String) -> GremlinQuery {
        let bindings = match self.mode {
            Rendering::Inline => None,
            Rendering::Bindings => Some(self.bindings),
        };
        GremlinQuery { text, bindings }
    }
}

/// Bound values follow the literal rules: composites travel as JSON text.
fn binding_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Json(v) => Value::String(v.to_string()),
        other => other.to_json(),
    }
}

fn volunteer_by_did(renderer: &mut Renderer, did: &str) -> String {
    let did = renderer.value("did_value", &PropertyValue::from(did));
    format!(
        "g.V().hasLabel({}).has({}, {did})",
        quote(VOLUNTEER_LABEL),
        quote(DID)
    )
}

fn volunteers() -> String {
    format!("g.V().hasLabel({})", quote(VOLUNTEER_LABEL))
}

/// Reads one volunteer's property map, including the id/label tokens.
pub fn get_by_did(did: &str, mode: Rendering) -> GremlinQuery {
    let mut renderer = Renderer::new(mode);
    let text = format!("{}.valueMap(true)", volunteer_by_did(&mut renderer, did));
    renderer.finish(text)
}

pub fn list(limit: Option<u64>) -> GremlinQuery {
    let mut text = volunteers();
    if let Some(limit) = limit {
        text.push_str(&format!(".limit({limit})"));
    }
    text.push_str(".valueMap(true)");
    GremlinQuery::inline(text)
}

pub fn delete_by_did(did: &str, mode: Rendering) -> GremlinQuery {
    let mut renderer = Renderer::new(mode);
    let text = format!("{}.drop()", volunteer_by_did(&mut renderer, did));
    renderer.finish(text)
}

/// Drops at most `limit` volunteers; which ones is up to the store.
pub fn delete_many(limit: u64) -> GremlinQuery {
    GremlinQuery::inline(format!("{}.limit({limit}).drop()", volunteers()))
}

pub fn count() -> GremlinQuery {
    GremlinQuery::inline(format!("{}.count()", volunteers()))
}
