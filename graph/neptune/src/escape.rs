use volunteer_graph::PropertyValue;

/// Escapes a string for a single-quoted Gremlin literal.
///
/// Backslashes go first so the backslashes added for quotes are not doubled.
pub fn escape_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn quote(raw: &str) -> String {
    format!("'{}'", escape_string(raw))
}

/// Renders a property value as Gremlin literal text. Never fails.
pub fn to_literal(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => "null".to_string(),
        PropertyValue::Boolean(b) => b.to_string(),
        PropertyValue::Int32(i) => i.to_string(),
        PropertyValue::Int64(i) => i.to_string(),
        PropertyValue::Float64(f) => float_literal(*f),
        PropertyValue::StringValue(s) => quote(s),
        PropertyValue::Json(v) => quote(&v.to_string()),
    }
}

/// Doubles carry a `d` suffix; an unsuffixed decimal would be a `BigDecimal`
/// in Gremlin-Groovy.
fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "Double.NaN".to_string()
    } else if f == f64::INFINITY {
        "Double.POSITIVE_INFINITY".to_string()
    } else if f == f64::NEG_INFINITY {
        "Double.NEGATIVE_INFINITY".to_string()
    } else {
        format!("{f:?}d")
    }
}
