//! Structured values carried in log records
//!
//! This module provides:
//! - `FieldValue`: any value a caller can attach to a record
//! - `Fields`: a string-keyed map of values (field sets, call fields, records)
//! - `ErrorValue` / `OpaqueValue`: wrappers for errors and platform handles
//!
//! Arrays and objects are shared nodes (`Arc<RwLock<..>>`). Cloning a
//! `FieldValue` never deep-copies them, which makes the same object reachable
//! from several places and allows self-referential structures. Identity is
//! pointer identity; see [`crate::core::render`] for cycle-safe output.

use super::render;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

pub type SharedObject = Arc<RwLock<Fields>>;
pub type SharedArray = Arc<RwLock<Vec<FieldValue>>>;

/// Value type for structured logging fields
#[derive(Clone)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Time(DateTime<Utc>),
    Array(SharedArray),
    Object(SharedObject),
    Error(ErrorValue),
    Opaque(OpaqueValue),
}

impl FieldValue {
    /// Wrap a field map as a shared object node
    pub fn object(fields: Fields) -> Self {
        FieldValue::Object(Arc::new(RwLock::new(fields)))
    }

    pub fn array(items: Vec<FieldValue>) -> Self {
        FieldValue::Array(Arc::new(RwLock::new(items)))
    }

    pub fn error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        FieldValue::Error(ErrorValue::new(error))
    }

    /// Wrap a value that needs a serializer before it can be encoded
    pub fn opaque<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        FieldValue::Opaque(OpaqueValue::new(value))
    }

    /// Set `key` on an object node in place; false if this is not an object
    pub fn set(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> bool {
        match self {
            FieldValue::Object(obj) => {
                obj.write().insert(key, value);
                true
            }
            _ => false,
        }
    }

    /// Append to an array node in place; false if this is not an array
    pub fn push(&self, value: impl Into<FieldValue>) -> bool {
        match self {
            FieldValue::Array(items) => {
                items.write().push(value.into());
                true
            }
            _ => false,
        }
    }

    /// Look up `key` on an object node (cloned out of the node)
    pub fn get(&self, key: &str) -> Option<FieldValue> {
        match self {
            FieldValue::Object(obj) => obj.read().get(key).cloned(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::UInt(u) => Some(*u as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            FieldValue::Opaque(o) => o.downcast_ref(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Scalars are everything that is not a composite node, error or opaque handle
    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            FieldValue::Array(_) | FieldValue::Object(_) | FieldValue::Error(_) | FieldValue::Opaque(_)
        )
    }

    /// Address of the shared node, used for identity tracking
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            FieldValue::Array(a) => Some(Arc::as_ptr(a) as *const () as usize),
            FieldValue::Object(o) => Some(Arc::as_ptr(o) as *const () as usize),
            _ => None,
        }
    }

    /// Cycle-safe JSON form; opaque handles are rendered as placeholders
    pub fn to_json(&self) -> serde_json::Value {
        render::to_json_lossy(self)
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::UInt(a), FieldValue::UInt(b)) => a == b,
            (FieldValue::Int(a), FieldValue::UInt(b)) | (FieldValue::UInt(b), FieldValue::Int(a)) => {
                u64::try_from(*a).map(|a| a == *b).unwrap_or(false)
            }
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Time(a), FieldValue::Time(b)) => a == b,
            (FieldValue::Array(a), FieldValue::Array(b)) => Arc::ptr_eq(a, b),
            (FieldValue::Object(a), FieldValue::Object(b)) => Arc::ptr_eq(a, b),
            (FieldValue::Error(a), FieldValue::Error(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            (FieldValue::Opaque(a), FieldValue::Opaque(b)) => Arc::ptr_eq(&a.inner, &b.inner),
            _ => false,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::inspect(self))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            other => f.write_str(&render::inspect(other)),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Null
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::Int(u as i64)
    }
}

impl From<u16> for FieldValue {
    fn from(u: u16) -> Self {
        FieldValue::Int(u as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Time(t)
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::object(fields)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::array(items)
    }
}

impl From<ErrorValue> for FieldValue {
    fn from(e: ErrorValue) -> Self {
        FieldValue::Error(e)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::UInt(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => {
                FieldValue::array(items.into_iter().map(FieldValue::from).collect())
            }
            serde_json::Value::Object(map) => FieldValue::object(Fields::from(map)),
        }
    }
}

/// An error attached to a record, remembered with its type name
#[derive(Clone)]
pub struct ErrorValue {
    name: String,
    inner: Arc<dyn StdError + Send + Sync>,
}

impl ErrorValue {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            name: short_type_name(std::any::type_name::<E>()).to_string(),
            inner: Arc::new(error),
        }
    }

    pub fn from_arc(name: impl Into<String>, inner: Arc<dyn StdError + Send + Sync>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    /// Message followed by the `source()` chain, one cause per line
    pub fn stack(&self) -> String {
        let mut stack = format!("{}: {}", self.name, self.inner);
        let mut source = self.inner.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        stack
    }

    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.inner.as_ref()
    }
}

impl fmt::Debug for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}: {}]", self.name, self.inner)
    }
}

/// A value the encoder cannot represent on its own (request handles and the like)
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: short_type_name(std::any::type_name::<T>()),
            inner: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.type_name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// String-keyed map of field values
///
/// Keys are kept sorted, so iteration order (and JSON key order) is stable.
/// Cloning is shallow with respect to composite values.
#[derive(Clone, Default, PartialEq)]
pub struct Fields {
    entries: BTreeMap<String, FieldValue>,
}

impl Fields {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add a field (builder form)
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Add a field, returning the previous value under that key
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<FieldValue>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.entries.iter()
    }

    /// Overlay `other` onto this map; `other` wins on key collisions
    pub fn merge(&mut self, other: Fields) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::inspect_fields(self))
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> Extend<(K, V)> for Fields {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.entries.insert(k.into(), v.into());
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Fields {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk unplugged")
        }
    }

    impl StdError for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "write failed")
        }
    }

    impl StdError for Outer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_fields_builder() {
        let fields = Fields::new()
            .with_field("user_id", 123)
            .with_field("username", "john_doe")
            .with_field("active", true);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("user_id"), Some(&FieldValue::Int(123)));
        assert_eq!(fields.get("username").and_then(FieldValue::as_str), Some("john_doe"));
    }

    #[test]
    fn test_merge_priority() {
        let mut base = Fields::new().with_field("key", "base").with_field("keep", 1);
        base.merge(Fields::new().with_field("key", "overlay"));

        assert_eq!(base.get("key").and_then(FieldValue::as_str), Some("overlay"));
        assert!(base.contains_key("keep"));
    }

    #[test]
    fn test_clone_is_shallow_for_composites() {
        let obj = FieldValue::object(Fields::new().with_field("a", 1));
        let fields = Fields::new().with_field("obj", obj.clone());
        let copy = fields.clone();

        obj.set("b", 2);
        let seen = copy.get("obj").and_then(|v| v.get("b"));
        assert_eq!(seen, Some(FieldValue::Int(2)));
    }

    #[test]
    fn test_identity_equality() {
        let a = FieldValue::object(Fields::new().with_field("x", 1));
        let b = FieldValue::object(Fields::new().with_field("x", 1));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_self_reference_is_expressible() {
        let obj = FieldValue::object(Fields::new().with_field("a", 1));
        assert!(obj.set("self", obj.clone()));
        assert_eq!(obj.get("self"), Some(obj.clone()));
    }

    #[test]
    fn test_error_value_stack() {
        let err = ErrorValue::new(Outer(Inner));
        assert_eq!(err.name(), "Outer");
        assert_eq!(err.message(), "write failed");
        assert_eq!(err.stack(), "Outer: write failed\n    caused by: disk unplugged");
    }

    #[test]
    fn test_opaque_downcast() {
        let value = FieldValue::opaque(42u8);
        assert_eq!(value.downcast_ref::<u8>(), Some(&42));
        assert!(value.downcast_ref::<u16>().is_none());
        assert!(!value.is_scalar());
    }

    #[test]
    fn test_from_json() {
        let value = FieldValue::from(serde_json::json!({"a": [1, 2.5, "x"], "b": null}));
        assert_eq!(value.get("b"), Some(FieldValue::Null));
        let json = value.to_json();
        assert_eq!(json["a"][1], 2.5);
    }
}
