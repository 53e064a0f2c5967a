//! Decoding of GraphSON 3 responses into per-vertex property maps.
//!
//! Values arrive as `{"@type": ..., "@value": ...}` objects. They are decoded
//! once into [`GraphSon`] and everything downstream matches on that.

use crate::keys;
use log::trace;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use volunteer_graph::error::{malformed_response, GraphError};
use volunteer_graph::PropertyValue;

pub const LIST: &str = "g:List";
pub const SET: &str = "g:Set";
pub const MAP: &str = "g:Map";
pub const TOKEN: &str = "g:T";
pub const DIRECTION: &str = "g:Direction";
pub const INT32: &str = "g:Int32";
pub const INT64: &str = "g:Int64";
pub const DOUBLE: &str = "g:Double";
pub const FLOAT: &str = "g:Float";
pub const BOOLEAN: &str = "g:Boolean";

#[derive(Debug, Clone, PartialEq)]
pub enum GraphSon {
    List(Vec<GraphSon>),
    /// Entries in wire order; keys need not be strings.
    Map(Vec<(GraphSon, GraphSon)>),
    /// A `T` or `Direction` marker such as `id` or `label`.
    Token(String),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Boolean(bool),
    /// Anything untagged, or tagged with a type this decoder passes through.
    Plain(Value),
}

impl GraphSon {
    pub fn decode(value: &Value) -> Result<GraphSon, GraphError> {
        match value {
            Value::Array(items) => Ok(GraphSon::List(decode_all(items)?)),
            Value::Object(obj) => {
                match (obj.get("@type").and_then(Value::as_str), obj.get("@value")) {
                    (Some(tag), Some(inner)) => decode_tagged(tag, inner),
                    _ => Ok(GraphSon::Plain(value.clone())),
                }
            }
            other => Ok(GraphSon::Plain(other.clone())),
        }
    }

    fn describe(&self) -> String {
        match self {
            GraphSon::List(_) => LIST.to_string(),
            GraphSon::Map(_) => MAP.to_string(),
            GraphSon::Token(_) => TOKEN.to_string(),
            GraphSon::Int32(_) => INT32.to_string(),
            GraphSon::Int64(_) => INT64.to_string(),
            GraphSon::Double(_) => DOUBLE.to_string(),
            GraphSon::Boolean(_) => BOOLEAN.to_string(),
            GraphSon::Plain(value) => format!("untyped {value}"),
        }
    }

    pub fn into_property_value(self) -> PropertyValue {
        match self {
            GraphSon::Int32(i) => PropertyValue::Int32(i),
            GraphSon::Int64(i) => PropertyValue::Int64(i),
            GraphSon::Double(f) => PropertyValue::Float64(f),
            GraphSon::Boolean(b) => PropertyValue::Boolean(b),
            GraphSon::Token(t) => PropertyValue::StringValue(t),
            GraphSon::Plain(value) => PropertyValue::from(value),
            composite => PropertyValue::Json(composite.into_plain_json()),
        }
    }

    fn into_plain_json(self) -> Value {
        match self {
            GraphSon::List(items) => {
                Value::Array(items.into_iter().map(GraphSon::into_plain_json).collect())
            }
            GraphSon::Map(entries) => {
                let mut obj = Map::new();
                for (key, value) in entries {
                    let key = match key.into_plain_json() {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    obj.insert(key, value.into_plain_json());
                }
                Value::Object(obj)
            }
            scalar => scalar.into_property_value().to_json(),
        }
    }
}

fn decode_all(items: &[Value]) -> Result<Vec<GraphSon>, GraphError> {
    items.iter().map(GraphSon::decode).collect()
}

fn decode_tagged(tag: &str, inner: &Value) -> Result<GraphSon, GraphError> {
    match tag {
        LIST | SET => {
            let items = inner
                .as_array()
                .ok_or_else(|| malformed_response(format!("{tag} @value must be an array")))?;
            Ok(GraphSon::List(decode_all(items)?))
        }
        MAP => {
            let flat = inner
                .as_array()
                .ok_or_else(|| malformed_response("g:Map @value must be an array"))?;
            if flat.len() % 2 != 0 {
                return Err(malformed_response(format!(
                    "g:Map has an odd number of entries ({})",
                    flat.len()
                )));
            }
            let entries = flat
                .chunks(2)
                .map(|pair| -> Result<(GraphSon, GraphSon), GraphError> {
                    Ok((GraphSon::decode(&pair[0])?, GraphSon::decode(&pair[1])?))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(GraphSon::Map(entries))
        }
        TOKEN | DIRECTION => inner
            .as_str()
            .map(|t| GraphSon::Token(t.to_string()))
            .ok_or_else(|| malformed_response(format!("{tag} @value must be a string"))),
        INT32 => {
            let i = integer(tag, inner)?;
            i32::try_from(i)
                .map(GraphSon::Int32)
                .map_err(|_| malformed_response(format!("{tag} out of range: {i}")))
        }
        INT64 => integer(tag, inner).map(GraphSon::Int64),
        DOUBLE | FLOAT => double(tag, inner).map(GraphSon::Double),
        BOOLEAN => boolean(tag, inner).map(GraphSon::Boolean),
        _ => {
            trace!("Passing through GraphSON value tagged {tag}");
            GraphSon::decode(inner)
        }
    }
}

fn integer(tag: &str, inner: &Value) -> Result<i64, GraphError> {
    let parsed = match inner {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed_response(format!("{tag} has a non-integer value {inner}")))
}

fn double(tag: &str, inner: &Value) -> Result<f64, GraphError> {
    let parsed = match inner {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| malformed_response(format!("{tag} has a non-numeric value {inner}")))
}

fn boolean(tag: &str, inner: &Value) -> Result<bool, GraphError> {
    match inner {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        _ => Err(malformed_response(format!(
            "{tag} has a non-boolean value {inner}"
        ))),
    }
}

/// A decoded vertex property. Multi-valued domain fields keep every value;
/// the rest keep the first.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Single(PropertyValue),
    Multi(Vec<PropertyValue>),
}

/// The flat, dotted-key property map of one vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexProperties {
    pub id: Option<PropertyValue>,
    pub label: Option<String>,
    pub properties: BTreeMap<String, Property>,
}

impl VertexProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_single(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties
            .insert(key.into(), Property::Single(value.into()));
        self
    }

    pub fn with_list<V: Into<PropertyValue>>(
        mut self,
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.properties.insert(key.into(), Property::Multi(values));
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// The value of a single-valued key, or the first value of a list.
    pub fn single(&self, key: &str) -> Option<&PropertyValue> {
        match self.properties.get(key)? {
            Property::Single(value) => Some(value),
            Property::Multi(values) => values.first(),
        }
    }

    pub fn list(&self, key: &str) -> Option<&[PropertyValue]> {
        match self.properties.get(key)? {
            Property::Single(value) => Some(std::slice::from_ref(value)),
            Property::Multi(values) => Some(values),
        }
    }

    fn insert_raw(&mut self, key: String, value: GraphSon) {
        let values: Vec<PropertyValue> = match value {
            GraphSon::List(items) => items
                .into_iter()
                .map(GraphSon::into_property_value)
                .collect(),
            single => vec![single.into_property_value()],
        };

        if keys::is_multi_valued(&key) {
            if !values.is_empty() {
                self.properties.insert(key, Property::Multi(values));
            }
        } else if let Some(first) = values.into_iter().next() {
            self.properties.insert(key, Property::Single(first));
        }
    }
}

/// Unwraps the `result.data` envelope of an HTTP response, if present.
///
/// A `result` object without `data` is malformed rather than empty.
pub fn payload(response: &Value) -> Result<&Value, GraphError> {
    match response.get("result") {
        Some(result) => result
            .get("data")
            .ok_or_else(|| malformed_response("response result has no data")),
        None => Ok(response),
    }
}

/// Extracts one property map per vertex from a `valueMap(true)` response.
///
/// A single `g:Map` is treated as a one-vertex list. Untyped objects are
/// accepted only as list items. An empty list is a valid empty result; any
/// other shape is a [`GraphError::MalformedResponse`].
pub fn parse_vertices(response: &Value) -> Result<Vec<VertexProperties>, GraphError> {
    match GraphSon::decode(payload(response)?)? {
        GraphSon::List(items) => items.into_iter().map(parse_vertex).collect(),
        map @ GraphSon::Map(_) => Ok(vec![parse_vertex(map)?]),
        other => Err(malformed_response(format!(
            "expected a list or map of vertices, got {}",
            other.describe()
        ))),
    }
}

/// Reads the single number produced by a `count()` traversal.
pub fn parse_count(response: &Value) -> Result<u64, GraphError> {
    let first = match GraphSon::decode(payload(response)?)? {
        GraphSon::List(items) => items.into_iter().next(),
        scalar => Some(scalar),
    };
    let count = match first {
        Some(GraphSon::Int32(i)) => u64::try_from(i).ok(),
        Some(GraphSon::Int64(i)) => u64::try_from(i).ok(),
        Some(GraphSon::Plain(Value::Number(n))) => n.as_u64(),
        _ => None,
    };
    count.ok_or_else(|| malformed_response("expected a single non-negative count"))
}

fn parse_vertex(item: GraphSon) -> Result<VertexProperties, GraphError> {
    let entries = match item {
        GraphSon::Map(entries) => entries,
        GraphSon::Plain(Value::Object(obj)) => return parse_plain_vertex(obj),
        other => {
            return Err(malformed_response(format!(
                "expected a vertex map, got {}",
                other.describe()
            )))
        }
    };

    let mut vertex = VertexProperties::new();
    for (key, value) in entries {
        match key {
            GraphSon::Token(token) => match token.as_str() {
                "id" => vertex.id = Some(value.into_property_value()),
                "label" => vertex.label = value.into_property_value().to_text(),
                _ => trace!("Ignoring {token} entry in vertex map"),
            },
            GraphSon::Plain(Value::String(key)) => vertex.insert_raw(key, value),
            other => {
                return Err(malformed_response(format!(
                    "expected a string key in vertex map, got {}",
                    other.describe()
                )))
            }
        }
    }
    Ok(vertex)
}

/// Untyped (GraphSON 1) maps: `id`/`label` arrive as ordinary keys.
fn parse_plain_vertex(obj: Map<String, Value>) -> Result<VertexProperties, GraphError> {
    let mut vertex = VertexProperties::new();
    for (key, value) in obj {
        let value = GraphSon::decode(&value)?;
        match key.as_str() {
            "id" => vertex.id = Some(value.into_property_value()),
            "label" => vertex.label = value.into_property_value().to_text(),
            _ => vertex.insert_raw(key, value),
        }
    }
    Ok(vertex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(tag: &str, value: Value) -> Value {
        json!({"@type": tag, "@value": value})
    }

    fn vertex_map(entries: Vec<Value>) -> Value {
        typed(MAP, Value::Array(entries))
    }

    fn prop_list(values: Vec<Value>) -> Value {
        typed(LIST, Value::Array(values))
    }

    fn sample_vertex() -> Value {
        vertex_map(vec![
            typed(TOKEN, json!("id")),
            typed(INT64, json!(4096)),
            typed(TOKEN, json!("label")),
            json!("Volunteer"),
            json!("did"),
            prop_list(vec![json!("did:web:a")]),
            json!("age"),
            prop_list(vec![typed(INT32, json!("42"))]),
            json!("minor"),
            prop_list(vec![typed(BOOLEAN, json!("false"))]),
            json!("skills"),
            prop_list(vec![json!("Mechanic"), json!("Radio Operator")]),
            json!("preferences.maxDistanceKm"),
            prop_list(vec![typed(DOUBLE, json!(12.5))]),
        ])
    }

    #[test]
    fn test_decode_scalars_native_and_text() {
        assert_eq!(
            GraphSon::decode(&typed(INT32, json!(7))).unwrap(),
            GraphSon::Int32(7)
        );
        assert_eq!(
            GraphSon::decode(&typed(INT64, json!("9000000000"))).unwrap(),
            GraphSon::Int64(9_000_000_000)
        );
        assert_eq!(
            GraphSon::decode(&typed(DOUBLE, json!("2.5"))).unwrap(),
            GraphSon::Double(2.5)
        );
        assert_eq!(
            GraphSon::decode(&typed(BOOLEAN, json!("true"))).unwrap(),
            GraphSon::Boolean(true)
        );
        assert_eq!(
            GraphSon::decode(&json!("plain")).unwrap(),
            GraphSon::Plain(json!("plain"))
        );
    }

    #[test]
    fn test_decode_rejects_bad_scalars() {
        assert!(matches!(
            GraphSon::decode(&typed(INT32, json!("forty"))),
            Err(GraphError::MalformedResponse(_))
        ));
        assert!(matches!(
            GraphSon::decode(&typed(INT32, json!(5_000_000_000i64))),
            Err(GraphError::MalformedResponse(_))
        ));
        assert!(matches!(
            GraphSon::decode(&typed(BOOLEAN, json!("yes"))),
            Err(GraphError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_unknown_tags_pass_through() {
        assert_eq!(
            GraphSon::decode(&typed("g:UUID", json!("41d2e28a"))).unwrap(),
            GraphSon::Plain(json!("41d2e28a"))
        );
    }

    #[test]
    fn test_parse_list_of_vertices_in_envelope() {
        let response = json!({
            "requestId": "r1",
            "status": {"code": 200},
            "result": {"data": typed(LIST, json!([sample_vertex()])), "meta": {}}
        });
        let vertices = parse_vertices(&response).unwrap();
        assert_eq!(vertices.len(), 1);

        let vertex = &vertices[0];
        assert_eq!(vertex.id, Some(PropertyValue::Int64(4096)));
        assert_eq!(vertex.label.as_deref(), Some("Volunteer"));
        assert_eq!(
            vertex.properties.get("did"),
            Some(&Property::Single(PropertyValue::from("did:web:a")))
        );
        assert_eq!(vertex.single("age"), Some(&PropertyValue::Int32(42)));
        assert_eq!(vertex.single("minor"), Some(&PropertyValue::Boolean(false)));
        assert_eq!(
            vertex.properties.get("skills"),
            Some(&Property::Multi(vec![
                PropertyValue::from("Mechanic"),
                PropertyValue::from("Radio Operator"),
            ]))
        );
        assert_eq!(
            vertex.single("preferences.maxDistanceKm"),
            Some(&PropertyValue::Float64(12.5))
        );
        assert!(!vertex.contains("id"));
        assert!(!vertex.contains("label"));
    }

    #[test]
    fn test_single_map_payload_is_one_vertex() {
        let vertices = parse_vertices(&sample_vertex()).unwrap();
        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].single("did"), Some(&PropertyValue::from("did:web:a")));
    }

    #[test]
    fn test_single_valued_key_keeps_first_value() {
        let response = typed(
            LIST,
            json!([vertex_map(vec![
                json!("name"),
                prop_list(vec![json!("First"), json!("Second")]),
            ])]),
        );
        let vertices = parse_vertices(&response).unwrap();
        assert_eq!(
            vertices[0].properties.get("name"),
            Some(&Property::Single(PropertyValue::from("First")))
        );
    }

    #[test]
    fn test_empty_list_is_empty_result() {
        assert!(parse_vertices(&typed(LIST, json!([]))).unwrap().is_empty());
        assert!(parse_vertices(&json!({"result": {"data": typed(LIST, json!([]))}}))
            .unwrap()
            .is_empty());
        assert!(parse_vertices(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_unexpected_shapes_are_malformed() {
        for response in [
            typed(INT64, json!(3)),
            json!(null),
            json!("oops"),
            typed(LIST, json!([typed(INT32, json!(1))])),
            typed(MAP, json!(["dangling"])),
            vertex_map(vec![typed(INT32, json!(1)), json!("x")]),
            json!({"result": {}}),
            json!({"result": {"meta": {}}}),
            json!({"error": "boom"}),
            json!({"did": ["did:web:a"]}),
        ] {
            assert!(
                matches!(
                    parse_vertices(&response),
                    Err(GraphError::MalformedResponse(_))
                ),
                "expected malformed for {response}"
            );
        }
    }

    #[test]
    fn test_parse_count() {
        let response = json!({"result": {"data": typed(LIST, json!([typed(INT64, json!(12))]))}});
        assert_eq!(parse_count(&response).unwrap(), 12);
        assert_eq!(parse_count(&json!([3])).unwrap(), 3);
        assert!(matches!(
            parse_count(&typed(LIST, json!([]))),
            Err(GraphError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_plain_object_vertex() {
        let response = json!([{
            "id": 1,
            "label": "Volunteer",
            "did": ["did:web:plain"],
            "languages": ["en", "cy"]
        }]);
        let vertices = parse_vertices(&response).unwrap();
        assert_eq!(vertices[0].id, Some(PropertyValue::Int64(1)));
        assert_eq!(vertices[0].single("did"), Some(&PropertyValue::from("did:web:plain")));
        assert_eq!(
            vertices[0].list("languages").unwrap(),
            &[PropertyValue::from("en"), PropertyValue::from("cy")]
        );
    }
}
