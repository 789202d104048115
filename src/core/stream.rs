//! Destination bindings
//!
//! A [`StreamBinding`] pairs a sink with its threshold level and delivery
//! metadata. Bindings are built from a [`StreamSpec`], which infers the
//! destination kind and fills in defaults. Write failures never reach the
//! caller of a log method; they are reported through the [`ErrorChannel`]
//! of the logger that created the binding.

use super::appender::{SharedSink, Sink, WriteUnit};
use super::diagnostics;
use super::error::{LoggerError, Result};
use super::log_level::{resolve_level, Level, LevelArg};
use crate::appenders::FileSink;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// How a destination receives records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    /// Text lines to a caller-supplied sink
    Stream,
    /// Text lines to a file
    File,
    /// In-memory records
    Raw,
}

impl StreamType {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamType::Stream => "stream",
            StreamType::File => "file",
            StreamType::Raw => "raw",
        }
    }

    /// Text kinds need the record stringified
    pub fn is_text(self) -> bool {
        !matches!(self, StreamType::Raw)
    }
}

impl FromStr for StreamType {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stream" => Ok(StreamType::Stream),
            "file" => Ok(StreamType::File),
            "raw" => Ok(StreamType::Raw),
            other => Err(LoggerError::unknown_kind(other)),
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a binding attached to a reported error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    pub index: usize,
    pub name: Option<String>,
    pub kind: StreamType,
    pub level: Level,
    pub path: Option<PathBuf>,
}

/// A destination failure together with the binding it came from
#[derive(Debug)]
pub struct StreamError {
    pub error: LoggerError,
    pub stream: StreamInfo,
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stream.name {
            Some(name) => write!(f, "{} stream \"{}\": {}", self.stream.kind, name, self.error),
            None => write!(f, "{} stream #{}: {}", self.stream.kind, self.stream.index, self.error),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type ErrorHandler = Arc<dyn Fn(&StreamError) + Send + Sync>;

/// Subscribers for destination errors of one logger
///
/// With no subscriber an error is printed to stderr.
#[derive(Default)]
pub struct ErrorChannel {
    handlers: RwLock<Vec<ErrorHandler>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: ErrorHandler) {
        self.handlers.write().push(handler);
    }

    pub fn has_subscribers(&self) -> bool {
        !self.handlers.read().is_empty()
    }

    pub fn notify(&self, error: &StreamError) {
        let handlers = self.handlers.read().clone();
        if handlers.is_empty() {
            diagnostics::error(&format!("unhandled stream error: {}", error));
            return;
        }
        for handler in handlers {
            handler(error);
        }
    }
}

impl fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("subscribers", &self.handlers.read().len())
            .finish()
    }
}

/// A sink bound into a logger's destination list
#[derive(Clone)]
pub struct StreamBinding {
    sink: SharedSink,
    kind: StreamType,
    level: Level,
    name: Option<String>,
    path: Option<PathBuf>,
    close_on_exit: bool,
    reemit_errors: bool,
    errors: Arc<ErrorChannel>,
}

impl StreamBinding {
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    pub fn kind(&self) -> StreamType {
        self.kind
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether closing the owning logger closes this sink
    pub fn close_on_exit(&self) -> bool {
        self.close_on_exit
    }

    pub fn reemit_errors(&self) -> bool {
        self.reemit_errors
    }

    pub fn info(&self, index: usize) -> StreamInfo {
        StreamInfo {
            index,
            name: self.name.clone(),
            kind: self.kind,
            level: self.level,
            path: self.path.clone(),
        }
    }

    pub(crate) fn with_level(&self, level: Level) -> Self {
        Self {
            level,
            ..self.clone()
        }
    }

    /// Copy for a derived logger; the copy never closes the sink
    pub(crate) fn borrowed(&self) -> Self {
        Self {
            close_on_exit: false,
            ..self.clone()
        }
    }

    /// Hand one unit to the sink, turning a panic into an error
    pub(crate) fn deliver(&self, unit: &WriteUnit) -> Result<()> {
        match catch_unwind(AssertUnwindSafe(|| self.sink.write(unit))) {
            Ok(result) => result,
            Err(panic) => Err(LoggerError::SinkPanicked(panic_text(panic.as_ref()))),
        }
    }

    /// Route a failure to the sink (when re-emitting) and the error channel
    pub(crate) fn report(&self, error: LoggerError, index: usize) {
        if self.reemit_errors {
            self.sink.on_error(&error);
        }
        self.errors.notify(&StreamError {
            error,
            stream: self.info(index),
        });
    }
}

impl fmt::Debug for StreamBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamBinding")
            .field("sink", &self.sink.name())
            .field("kind", &self.kind)
            .field("level", &self.level)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("close_on_exit", &self.close_on_exit)
            .field("reemit_errors", &self.reemit_errors)
            .finish()
    }
}

fn panic_text(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Description of a destination to bind
///
/// # Example
///
/// ```
/// use rust_bunyan::appenders::RingBuffer;
/// use rust_bunyan::StreamSpec;
/// use std::sync::Arc;
///
/// let ring = Arc::new(RingBuffer::new(50));
/// let spec = StreamSpec::raw(ring).with_level("trace").with_name("recent");
/// ```
#[derive(Clone, Default)]
pub struct StreamSpec {
    sink: Option<SharedSink>,
    path: Option<PathBuf>,
    kind: Option<String>,
    level: Option<LevelArg>,
    name: Option<String>,
    close_on_exit: Option<bool>,
    reemit_errors: Option<bool>,
}

impl StreamSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text destination writing to `sink`
    pub fn sink(sink: impl Sink + 'static) -> Self {
        Self::shared(Arc::new(sink))
    }

    /// Text destination writing to an already shared sink
    pub fn shared(sink: SharedSink) -> Self {
        Self {
            sink: Some(sink),
            ..Self::default()
        }
    }

    /// File destination appending to `path`
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Raw destination receiving in-memory records
    pub fn raw(sink: SharedSink) -> Self {
        Self::shared(sink).with_kind("raw")
    }

    /// Explicit destination kind: `stream`, `file` or `raw`
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<LevelArg>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_close_on_exit(mut self, close: bool) -> Self {
        self.close_on_exit = Some(close);
        self
    }

    #[must_use]
    pub fn with_reemit_errors(mut self, reemit: bool) -> Self {
        self.reemit_errors = Some(reemit);
        self
    }

    pub(crate) fn has_level(&self) -> bool {
        self.level.is_some()
    }

    /// Resolve this spec into a binding
    ///
    /// `existing` is the list the binding will join; a file path already
    /// opened there is shared rather than opened twice, and the earlier
    /// binding keeps sole ownership of closing it.
    pub(crate) fn into_binding(
        self,
        default_level: Level,
        errors: Arc<ErrorChannel>,
        existing: &[StreamBinding],
    ) -> Result<StreamBinding> {
        let kind = match (&self.kind, &self.sink, &self.path) {
            (Some(kind), _, _) => kind.parse::<StreamType>()?,
            (None, Some(_), _) => StreamType::Stream,
            (None, None, Some(_)) => StreamType::File,
            (None, None, None) => {
                return Err(LoggerError::invalid_streams(
                    "each stream needs a sink or a path",
                ))
            }
        };
        let level = match self.level {
            Some(arg) => resolve_level(arg)?,
            None => default_level,
        };

        let path_backed = self.sink.is_none();
        let (sink, owns_path, reused) = match (kind, self.sink) {
            (_, Some(sink)) => (sink, false, false),
            (StreamType::File, None) => {
                let Some(path) = self.path.as_ref() else {
                    return Err(LoggerError::invalid_streams("file stream needs a path"));
                };
                let shared = existing
                    .iter()
                    .find(|b| b.kind == StreamType::File && b.path.as_deref() == Some(path.as_path()));
                match shared {
                    Some(binding) => (Arc::clone(&binding.sink), false, true),
                    None => (Arc::new(FileSink::new(path.clone())) as SharedSink, true, false),
                }
            }
            (other, None) => {
                return Err(LoggerError::invalid_streams(format!(
                    "\"{}\" stream needs a sink",
                    other
                )))
            }
        };

        Ok(StreamBinding {
            sink,
            kind,
            level,
            name: self.name,
            path: self.path,
            close_on_exit: !reused && self.close_on_exit.unwrap_or(owns_path),
            reemit_errors: self.reemit_errors.unwrap_or(!path_backed),
            errors,
        })
    }
}

impl fmt::Debug for StreamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSpec")
            .field("sink", &self.sink.as_ref().map(|s| s.name().to_string()))
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("level", &self.level)
            .field("name", &self.name)
            .finish()
    }
}
