//! Logger configuration
//!
//! [`LoggerOptions`] is consumed by [`Logger::new`](super::Logger::new) and
//! [`Logger::child`](super::Logger::child). It can be built in code or read
//! from a JSON object of the shape
//! `{ name, level?, stream?, streams?, serializers?, src?, ...fields }`.

use super::appender::SharedSink;
use super::error::{LoggerError, Result};
use super::log_level::LevelArg;
use super::serializers::{std_serializers, Serializers};
use super::stream::StreamSpec;
use super::value::{FieldValue, Fields};
use crate::appenders::ConsoleSink;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Options for a logger or a child logger
///
/// # Example
///
/// ```
/// use rust_bunyan::{LoggerOptions, StreamSpec};
/// use rust_bunyan::appenders::RingBuffer;
/// use std::sync::Arc;
///
/// let ring = Arc::new(RingBuffer::new(10));
/// let options = LoggerOptions::new("myapp")
///     .with_streams(vec![StreamSpec::raw(ring).with_level("debug")])
///     .with_field("component", "db");
/// ```
#[derive(Clone, Default)]
pub struct LoggerOptions {
    pub(crate) name: Option<String>,
    pub(crate) level: Option<LevelArg>,
    pub(crate) stream: Option<SharedSink>,
    pub(crate) streams: Option<Vec<StreamSpec>>,
    pub(crate) serializers: Option<Serializers>,
    pub(crate) src: Option<bool>,
    pub(crate) fields: Fields,
}

impl LoggerOptions {
    /// Options for a top-level logger called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Options for a child logger (no name)
    pub fn child() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<LevelArg>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Single text destination (cannot be combined with `streams`)
    #[must_use]
    pub fn with_stream(mut self, sink: SharedSink) -> Self {
        self.stream = Some(sink);
        self
    }

    #[must_use]
    pub fn with_streams(mut self, streams: Vec<StreamSpec>) -> Self {
        self.streams = Some(streams);
        self
    }

    /// Append one destination to `streams`
    #[must_use]
    pub fn add_stream(mut self, spec: StreamSpec) -> Self {
        self.streams.get_or_insert_with(Vec::new).push(spec);
        self
    }

    #[must_use]
    pub fn with_serializers(mut self, serializers: Serializers) -> Self {
        self.serializers = Some(serializers);
        self
    }

    /// Capture the call site as `src` on every record
    #[must_use]
    pub fn with_src(mut self, src: bool) -> Self {
        self.src = Some(src);
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields.merge(fields);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Read options from a JSON object
    ///
    /// `stream` and entries of `streams` may name `"stdout"` or `"stderr"`;
    /// `serializers` maps field names to a standard serializer
    /// (`"err"`, `"req"` or `"res"`). Unrecognized keys become fields.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(LoggerError::other("logger options must be a JSON object"));
        };
        let mut options = Self::default();
        for (key, item) in map {
            match key.as_str() {
                "name" => match item {
                    Value::String(name) if !name.is_empty() => options.name = Some(name.clone()),
                    _ => return Err(LoggerError::MissingName),
                },
                "level" => options.level = Some(level_from_json(item)?),
                "stream" => options.stream = Some(console_from_json(item)?),
                "streams" => {
                    let Value::Array(entries) = item else {
                        return Err(LoggerError::invalid_streams("must be an array"));
                    };
                    let specs = entries
                        .iter()
                        .map(stream_from_json)
                        .collect::<Result<Vec<_>>>()?;
                    options.streams = Some(specs);
                }
                "serializers" => options.serializers = Some(serializers_from_json(item)?),
                "src" => match item {
                    Value::Bool(src) => options.src = Some(*src),
                    _ => return Err(LoggerError::other("invalid options.src: must be a boolean")),
                },
                _ => {
                    options.fields.insert(key.clone(), FieldValue::from(item.clone()));
                }
            }
        }
        Ok(options)
    }
}

fn level_from_json(value: &Value) -> Result<LevelArg> {
    match value {
        Value::String(name) => Ok(LevelArg::Name(name.clone())),
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(LevelArg::Number)
            .ok_or_else(|| LoggerError::invalid_level(n)),
        other => Err(LoggerError::invalid_level(other)),
    }
}

fn console_from_json(value: &Value) -> Result<SharedSink> {
    match value.as_str() {
        Some("stdout") => Ok(Arc::new(ConsoleSink::stdout())),
        Some("stderr") => Ok(Arc::new(ConsoleSink::stderr())),
        _ => Err(LoggerError::invalid_streams(format!(
            "unknown stream {}, expected \"stdout\" or \"stderr\"",
            value
        ))),
    }
}

fn stream_from_json(value: &Value) -> Result<StreamSpec> {
    let Value::Object(entry) = value else {
        return Err(LoggerError::invalid_streams("each stream must be an object"));
    };
    let mut spec = StreamSpec::new();
    if let Some(stream) = entry.get("stream") {
        spec = spec.with_sink(console_from_json(stream)?);
    }
    if let Some(path) = entry.get("path") {
        let Some(path) = path.as_str() else {
            return Err(LoggerError::invalid_streams("stream path must be a string"));
        };
        spec = spec.with_path(path);
    }
    if let Some(kind) = entry.get("type") {
        let Some(kind) = kind.as_str() else {
            return Err(LoggerError::invalid_streams("stream type must be a string"));
        };
        spec = spec.with_kind(kind);
    }
    if let Some(level) = entry.get("level") {
        spec = spec.with_level(level_from_json(level)?);
    }
    if let Some(name) = entry.get("name").and_then(Value::as_str) {
        spec = spec.with_name(name);
    }
    if let Some(close) = bool_entry(entry, "closeOnExit")? {
        spec = spec.with_close_on_exit(close);
    }
    if let Some(reemit) = bool_entry(entry, "reemitErrorEvents")? {
        spec = spec.with_reemit_errors(reemit);
    }
    Ok(spec)
}

fn bool_entry(entry: &Map<String, Value>, key: &str) -> Result<Option<bool>> {
    match entry.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(LoggerError::invalid_streams(format!("{} must be a boolean", key))),
    }
}

fn serializers_from_json(value: &Value) -> Result<Serializers> {
    let Value::Object(map) = value else {
        return Err(LoggerError::invalid_serializers("must be an object"));
    };
    let mut serializers = Serializers::new();
    for (field, name) in map {
        let serializer = name.as_str().and_then(std_serializers::by_name).ok_or_else(|| {
            LoggerError::invalid_serializers(format!(
                "invalid serializer for \"{}\" field: must name \"err\", \"req\" or \"res\"",
                field
            ))
        })?;
        serializers.insert(field.clone(), serializer);
    }
    Ok(serializers)
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("stream", &self.stream.as_ref().map(|s| s.name().to_string()))
            .field("streams", &self.streams)
            .field("serializers", &self.serializers)
            .field("src", &self.src)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let options = LoggerOptions::new("app")
            .with_level("debug")
            .with_src(true)
            .with_field("component", "api");
        assert_eq!(options.name(), Some("app"));
        assert_eq!(options.level, Some(LevelArg::Name("debug".into())));
        assert_eq!(options.fields().len(), 1);
    }

    #[test]
    fn test_from_json_full_shape() {
        let options = LoggerOptions::from_json(&json!({
            "name": "svc",
            "streams": [
                {"stream": "stderr", "level": "warn"},
                {"path": "/tmp/svc.log", "level": 20, "closeOnExit": false, "name": "disk"}
            ],
            "serializers": {"err": "err", "request": "req"},
            "src": true,
            "region": "eu"
        }))
        .unwrap();

        assert_eq!(options.name(), Some("svc"));
        assert_eq!(options.streams.as_ref().map(Vec::len), Some(2));
        let serializers = options.serializers.as_ref().unwrap();
        assert!(serializers.contains("request"));
        assert_eq!(options.src, Some(true));
        assert_eq!(
            options.fields().get("region").and_then(FieldValue::as_str),
            Some("eu")
        );
    }

    #[test]
    fn test_from_json_rejects_wrong_shapes() {
        let err = LoggerOptions::from_json(&json!({"name": "a", "streams": {}})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidStreams { .. }));

        let err = LoggerOptions::from_json(&json!({"name": "a", "serializers": []})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidSerializers { .. }));

        let err =
            LoggerOptions::from_json(&json!({"name": "a", "serializers": {"x": "nope"}})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidSerializers { .. }));

        let err = LoggerOptions::from_json(&json!({"name": "a", "stream": "socket"})).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidStreams { .. }));

        let err = LoggerOptions::from_json(&json!({"name": 3})).unwrap_err();
        assert!(matches!(err, LoggerError::MissingName));
    }
}
