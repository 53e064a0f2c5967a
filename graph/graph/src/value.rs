use serde_json::Value;
use std::fmt;

/// A scalar as stored on a vertex property.
///
/// `Json` carries composite values (arrays/objects) that the store can only
/// hold as their serialized text.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    StringValue(String),
    Json(Value),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Text form used when a string-typed field is read back from any scalar.
    pub fn to_text(&self) -> Option<String> {
        match self {
            PropertyValue::Null => None,
            PropertyValue::Boolean(b) => Some(b.to_string()),
            PropertyValue::Int32(i) => Some(i.to_string()),
            PropertyValue::Int64(i) => Some(i.to_string()),
            PropertyValue::Float64(f) => Some(f.to_string()),
            PropertyValue::StringValue(s) => Some(s.clone()),
            PropertyValue::Json(v) => Some(v.to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int32(i) => Some(i64::from(*i)),
            PropertyValue::Int64(i) => Some(*i),
            PropertyValue::Float64(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            PropertyValue::StringValue(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int32(i) => Some(f64::from(*i)),
            PropertyValue::Int64(i) => Some(*i as f64),
            PropertyValue::Float64(f) => Some(*f),
            PropertyValue::StringValue(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            PropertyValue::StringValue(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Plain JSON form, used for parameter bindings and opaque fields.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Null => Value::Null,
            PropertyValue::Boolean(b) => Value::Bool(*b),
            PropertyValue::Int32(i) => Value::from(*i),
            PropertyValue::Int64(i) => Value::from(*i),
            PropertyValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PropertyValue::StringValue(s) => Value::String(s.clone()),
            PropertyValue::Json(v) => v.clone(),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Boolean(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Int64(i)
                } else {
                    PropertyValue::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => PropertyValue::StringValue(s),
            composite => PropertyValue::Json(composite),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::StringValue(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::StringValue(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int64(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int64(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float64(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => f.write_str("null"),
        }
    }
}
