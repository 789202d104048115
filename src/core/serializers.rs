//! Per-field serializers
//!
//! A serializer transforms the value of one named field before it is
//! included in a record. Serializer failures (an `Err` or a panic) never abort
//! emission: the field is replaced with a placeholder string and a warning
//! is printed once per field name.

use super::diagnostics;
use super::value::{FieldValue, Fields};
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A field transform
pub type Serializer = Arc<dyn Fn(&FieldValue) -> Result<FieldValue, BoxError> + Send + Sync>;

/// Mapping from field name to serializer
///
/// Cheap to clone; children get a copy they can extend without affecting
/// the parent.
#[derive(Clone, Default)]
pub struct Serializers {
    map: Arc<HashMap<String, Serializer>>,
}

impl Serializers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a serializer (builder form)
    #[must_use]
    pub fn with<F>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<FieldValue, BoxError> + Send + Sync + 'static,
    {
        self.insert(field, Arc::new(f));
        self
    }

    /// Register `serializer` for `field`, replacing any previous one
    pub fn insert(&mut self, field: impl Into<String>, serializer: Serializer) {
        Arc::make_mut(&mut self.map).insert(field.into(), serializer);
    }

    pub fn get(&self, field: &str) -> Option<&Serializer> {
        self.map.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.map.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.keys().cloned().collect();
        names.sort();
        names
    }

    /// This set overlaid with `other`; entries in `other` replace ours
    #[must_use]
    pub fn merged(&self, other: &Serializers) -> Serializers {
        if other.is_empty() {
            return self.clone();
        }
        let mut map = (*self.map).clone();
        for (field, serializer) in other.map.iter() {
            map.insert(field.clone(), Arc::clone(serializer));
        }
        Serializers { map: Arc::new(map) }
    }

    /// Apply serializers to every field that has one, in place
    ///
    /// Returns the number of serializers that failed.
    pub fn apply(&self, fields: &mut Fields) -> usize {
        if self.map.is_empty() {
            return 0;
        }
        let mut failures = 0;
        for (field, serializer) in self.map.iter() {
            let Some(value) = fields.get_mut(field) else {
                continue;
            };
            let outcome = catch_unwind(AssertUnwindSafe(|| serializer(value)));
            let problem = match outcome {
                Ok(Ok(serialized)) => {
                    *value = serialized;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(panic) => panic_message(panic.as_ref()),
            };
            failures += 1;
            diagnostics::warn_once(
                &format!("serializer:{}", field),
                &format!(
                    "Exception thrown from the \"{}\" serializer. \
                     This is a bug in that serializer function.\n{}",
                    field, problem
                ),
            );
            *value = FieldValue::String(format!(
                "(Error in log \"{}\" serializer broke field. See stderr for details.)",
                field
            ));
        }
        failures
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "serializer panicked".to_string()
    }
}

impl fmt::Debug for Serializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Standard serializers for errors and HTTP exchanges
pub mod std_serializers {
    use super::{BoxError, Serializers};
    use crate::core::render::error_to_json;
    use crate::core::value::FieldValue;
    use serde::Serialize;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    /// The parts of an incoming HTTP request worth logging
    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HttpRequest {
        pub method: String,
        pub url: String,
        pub headers: BTreeMap<String, String>,
        pub remote_address: Option<String>,
        pub remote_port: Option<u16>,
    }

    /// The parts of an outgoing HTTP response worth logging
    #[derive(Debug, Clone, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HttpResponse {
        pub status_code: u16,
        /// Raw header block as written to the wire
        pub header: Option<String>,
    }

    /// Error → `{message, name, stack}`; other values pass through
    pub fn err(value: &FieldValue) -> Result<FieldValue, BoxError> {
        match value {
            FieldValue::Error(e) => Ok(FieldValue::from(error_to_json(e))),
            other => Ok(other.clone()),
        }
    }

    /// `HttpRequest` → `{method, url, headers, remoteAddress, remotePort}`
    pub fn req(value: &FieldValue) -> Result<FieldValue, BoxError> {
        match value.downcast_ref::<HttpRequest>() {
            Some(request) => Ok(FieldValue::from(serde_json::to_value(request)?)),
            None => Ok(value.clone()),
        }
    }

    /// `HttpResponse` → `{statusCode, header}`
    pub fn res(value: &FieldValue) -> Result<FieldValue, BoxError> {
        match value.downcast_ref::<HttpResponse>() {
            Some(response) => Ok(FieldValue::from(serde_json::to_value(response)?)),
            None => Ok(value.clone()),
        }
    }

    /// Serializer for one of the standard field names
    pub fn by_name(name: &str) -> Option<super::Serializer> {
        match name {
            "err" => Some(Arc::new(err)),
            "req" => Some(Arc::new(req)),
            "res" => Some(Arc::new(res)),
            _ => None,
        }
    }

    /// `err`, `req` and `res` together
    pub fn all() -> Serializers {
        Serializers::new().with("err", err).with("req", req).with("res", res)
    }
}

#[cfg(test)]
mod tests {
    use super::std_serializers::{self, HttpRequest, HttpResponse};
    use super::*;

    #[test]
    fn test_apply_replaces_value() {
        let serializers = Serializers::new().with("user", |v: &FieldValue| {
            Ok(FieldValue::from(format!("user:{}", v)))
        });
        let mut fields = Fields::new().with_field("user", "ann").with_field("other", 1);
        assert_eq!(serializers.apply(&mut fields), 0);
        assert_eq!(fields.get("user").and_then(FieldValue::as_str), Some("user:ann"));
        assert_eq!(fields.get("other"), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn test_failing_serializer_gets_placeholder() {
        let serializers = Serializers::new()
            .with("bad", |_: &FieldValue| Err("nope".into()))
            .with("worse", |_: &FieldValue| -> Result<FieldValue, BoxError> {
                panic!("serializer exploded")
            });
        let mut fields = Fields::new().with_field("bad", 1).with_field("worse", 2);
        assert_eq!(serializers.apply(&mut fields), 2);
        assert_eq!(
            fields.get("bad").and_then(FieldValue::as_str),
            Some("(Error in log \"bad\" serializer broke field. See stderr for details.)")
        );
        assert!(fields
            .get("worse")
            .and_then(FieldValue::as_str)
            .is_some_and(|s| s.contains("\"worse\"")));
        assert!(diagnostics::has_warned("serializer:bad"));
    }

    #[test]
    fn test_merged_replaces_not_merges() {
        let parent = Serializers::new().with("a", |_: &FieldValue| Ok(FieldValue::from("parent")));
        let child = parent.merged(
            &Serializers::new().with("a", |_: &FieldValue| Ok(FieldValue::from("child"))),
        );
        let mut fields = Fields::new().with_field("a", 0);
        child.apply(&mut fields);
        assert_eq!(fields.get("a").and_then(FieldValue::as_str), Some("child"));
        assert_eq!(parent.len(), 1);
    }

    #[test]
    fn test_err_serializer() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let out = std_serializers::err(&FieldValue::error(err)).unwrap();
        assert_eq!(out.get("message"), Some(FieldValue::from("missing")));
        assert_eq!(out.get("name"), Some(FieldValue::from("Error")));
        assert_eq!(std_serializers::err(&FieldValue::from(5)).unwrap(), FieldValue::Int(5));
    }

    #[test]
    fn test_req_res_serializers() {
        let request = HttpRequest {
            method: "GET".into(),
            url: "/path?q=1".into(),
            headers: [("host".to_string(), "example.com".to_string())].into_iter().collect(),
            remote_address: Some("127.0.0.1".into()),
            remote_port: Some(51234),
        };
        let out = std_serializers::req(&FieldValue::opaque(request)).unwrap();
        let json = out.to_json();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["remoteAddress"], "127.0.0.1");
        assert_eq!(json["headers"]["host"], "example.com");

        let out = std_serializers::res(&FieldValue::opaque(HttpResponse {
            status_code: 404,
            header: None,
        }))
        .unwrap();
        assert_eq!(out.to_json()["statusCode"], 404);

        let plain = FieldValue::from("not a request");
        assert_eq!(std_serializers::req(&plain).unwrap(), plain);
    }

    #[test]
    fn test_all_and_by_name() {
        assert_eq!(std_serializers::all().names(), vec!["err", "req", "res"]);
        assert!(std_serializers::by_name("err").is_some());
        assert!(std_serializers::by_name("body").is_none());
    }
}
