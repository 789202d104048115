//! Cycle-safe rendering of field values
//!
//! Two renderers walk a value graph: the JSON encoder used for records and
//! `%j`, and the human-oriented `inspect` form used by the message
//! formatter. Both keep a visited set of shared nodes for the duration of a
//! single top-level call. A node reached a second time is replaced by
//! [`CIRCULAR`]. Entries are never removed during a walk, so a node shared
//! between two siblings is also marked; this is accepted in exchange for a
//! single pass with bounded work.

use super::error::{LoggerError, Result};
use super::timestamp::format_iso8601;
use super::value::{ErrorValue, FieldValue, Fields};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// Marker written in place of a repeated reference
pub const CIRCULAR: &str = "[Circular]";

/// Encode a value as JSON; opaque values without a serializer are an error
pub fn to_json(value: &FieldValue) -> Result<Value> {
    JsonWalker::strict().value(value)
}

/// Encode a value as JSON, writing opaque values as `"[TypeName]"`
pub fn to_json_lossy(value: &FieldValue) -> Value {
    JsonWalker::lossy()
        .value(value)
        .unwrap_or_else(|_| Value::String(String::new()))
}

/// Encode a whole record; one visited set spans every top-level field
pub fn fields_to_json(fields: &Fields) -> Result<Map<String, Value>> {
    let mut walker = JsonWalker::strict();
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key.clone(), walker.value(value)?);
    }
    Ok(map)
}

/// `{message, name, stack}`, the shape an error takes on the wire
pub fn error_to_json(error: &ErrorValue) -> Value {
    let mut map = Map::new();
    map.insert("message".into(), Value::String(error.message()));
    map.insert("name".into(), Value::String(error.name().to_string()));
    map.insert("stack".into(), Value::String(error.stack()));
    Value::Object(map)
}

struct JsonWalker {
    seen: HashSet<usize>,
    strict: bool,
}

impl JsonWalker {
    fn strict() -> Self {
        Self {
            seen: HashSet::new(),
            strict: true,
        }
    }

    fn lossy() -> Self {
        Self {
            seen: HashSet::new(),
            strict: false,
        }
    }

    fn value(&mut self, value: &FieldValue) -> Result<Value> {
        if let Some(id) = value.identity() {
            if !self.seen.insert(id) {
                return Ok(Value::String(CIRCULAR.to_string()));
            }
        }
        Ok(match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::Number((*i).into()),
            FieldValue::UInt(u) => Value::Number((*u).into()),
            FieldValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Time(t) => Value::String(format_iso8601(t)),
            FieldValue::Array(items) => {
                let items = items.read();
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    out.push(self.value(item)?);
                }
                Value::Array(out)
            }
            FieldValue::Object(obj) => {
                let obj = obj.read();
                let mut out = Map::new();
                for (key, item) in obj.iter() {
                    out.insert(key.clone(), self.value(item)?);
                }
                Value::Object(out)
            }
            FieldValue::Error(e) => error_to_json(e),
            FieldValue::Opaque(o) => {
                if self.strict {
                    return Err(LoggerError::unencodable(o.type_name()));
                }
                Value::String(format!("[{}]", o.type_name()))
            }
        })
    }
}

/// Node-style human rendering: `{ a: 1, b: 'two' }`, `[ 1, 2 ]`
pub fn inspect(value: &FieldValue) -> String {
    let mut out = String::new();
    InspectWalker::default().value(value, &mut out);
    out
}

/// Inspect a bare field map as if it were an object
pub fn inspect_fields(fields: &Fields) -> String {
    let mut out = String::new();
    InspectWalker::default().fields(fields, &mut out);
    out
}

/// Number text the way a log reader expects it (`3`, `2.5`, `NaN`, `Infinity`)
pub fn format_number(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        f.to_string()
    }
}

/// Plain text for scalar values: strings unquoted, numbers as numbers
pub fn display_scalar(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "null".to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Int(i) => i.to_string(),
        FieldValue::UInt(u) => u.to_string(),
        FieldValue::Float(f) => format_number(*f),
        FieldValue::String(s) => s.clone(),
        FieldValue::Time(t) => format_iso8601(t),
        other => inspect(other),
    }
}

#[derive(Default)]
struct InspectWalker {
    seen: HashSet<usize>,
}

impl InspectWalker {
    fn value(&mut self, value: &FieldValue, out: &mut String) {
        if let Some(id) = value.identity() {
            if !self.seen.insert(id) {
                out.push_str(CIRCULAR);
                return;
            }
        }
        match value {
            FieldValue::String(s) => quote(s, out),
            FieldValue::Array(items) => {
                let items = items.read();
                if items.is_empty() {
                    out.push_str("[]");
                    return;
                }
                out.push_str("[ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.value(item, out);
                }
                out.push_str(" ]");
            }
            FieldValue::Object(obj) => {
                let obj = obj.read();
                self.fields(&obj, out);
            }
            FieldValue::Error(e) => {
                out.push('[');
                out.push_str(e.name());
                out.push_str(": ");
                out.push_str(&e.message());
                out.push(']');
            }
            FieldValue::Opaque(o) => {
                out.push('[');
                out.push_str(o.type_name());
                out.push(']');
            }
            scalar => out.push_str(&display_scalar(scalar)),
        }
    }

    fn fields(&mut self, fields: &Fields, out: &mut String) {
        if fields.is_empty() {
            out.push_str("{}");
            return;
        }
        out.push_str("{ ");
        for (i, (key, item)) in fields.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if is_identifier(key) {
                out.push_str(key);
            } else {
                quote(key, out);
            }
            out.push_str(": ");
            self.value(item, out);
        }
        out.push_str(" }");
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn quote(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn self_referential() -> FieldValue {
        let obj = FieldValue::object(Fields::new().with_field("bang", "boom"));
        obj.set("KABOOM", obj.clone());
        obj
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(to_json(&FieldValue::Int(-3)).unwrap(), json!(-3));
        assert_eq!(to_json(&FieldValue::Float(2.5)).unwrap(), json!(2.5));
        assert_eq!(to_json(&FieldValue::Float(f64::NAN)).unwrap(), Value::Null);
        assert_eq!(to_json(&FieldValue::from("x")).unwrap(), json!("x"));
    }

    #[test]
    fn test_json_cycle_terminates() {
        let json = to_json(&self_referential()).unwrap();
        assert_eq!(json, json!({"bang": "boom", "KABOOM": "[Circular]"}));
    }

    #[test]
    fn test_json_array_cycle() {
        let arr = FieldValue::array(vec![FieldValue::Int(1)]);
        arr.push(arr.clone());
        assert_eq!(to_json(&arr).unwrap(), json!([1, "[Circular]"]));
    }

    #[test]
    fn test_shared_sibling_is_marked() {
        let shared = FieldValue::object(Fields::new().with_field("n", 1));
        let fields = Fields::new()
            .with_field("a", shared.clone())
            .with_field("b", shared);
        let map = fields_to_json(&fields).unwrap();
        assert_eq!(map["a"], json!({"n": 1}));
        assert_eq!(map["b"], json!("[Circular]"));
    }

    #[test]
    fn test_opaque_strict_and_lossy() {
        struct Socket;
        let value = FieldValue::opaque(Socket);
        assert!(matches!(to_json(&value), Err(LoggerError::Unencodable { .. })));
        assert_eq!(to_json_lossy(&value), json!("[Socket]"));
    }

    #[test]
    fn test_error_shape() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let json = to_json(&FieldValue::error(err)).unwrap();
        assert_eq!(json["message"], "boom");
        assert_eq!(json["name"], "Error");
        assert!(json["stack"].as_str().unwrap().contains("boom"));
    }

    #[test]
    fn test_inspect_forms() {
        assert_eq!(inspect(&self_referential()), "{ KABOOM: [Circular], bang: 'boom' }");
        assert_eq!(inspect(&FieldValue::array(vec![1.into(), 2.into()])), "[ 1, 2 ]");
        assert_eq!(inspect(&FieldValue::array(vec![])), "[]");
        assert_eq!(inspect(&FieldValue::object(Fields::new())), "{}");
        assert_eq!(inspect(&FieldValue::from("it's")), "'it\\'s'");
        assert_eq!(
            inspect_fields(&Fields::new().with_field("a-b", true)),
            "{ 'a-b': true }"
        );
    }

    #[test]
    fn test_number_text() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
