//! Main logger implementation
//!
//! A [`Logger`] owns a field set, an ordered list of destination bindings,
//! a serializer map and an effective level (the lowest threshold among its
//! bindings). Every log call is checked against the effective level before
//! any other work. A record that passes is built once, turned into a JSON
//! line at most once, and written to each qualifying binding in order.

use super::{
    appender::WriteUnit,
    builder::EventBuilder,
    config::LoggerOptions,
    diagnostics,
    error::{LoggerError, Result},
    log_level::{resolve_level, Level, LevelArg},
    message::format_message,
    metrics::LoggerMetrics,
    record::{LogRecord, Record, SourceLocation, LOG_VERSION},
    serializers::Serializers,
    stream::{ErrorChannel, StreamBinding, StreamError, StreamSpec},
    value::{FieldValue, Fields},
};
use crate::appenders::ConsoleSink;
use chrono::Utc;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

const TEXT_UNKNOWN: u8 = 0;
const TEXT_ABSENT: u8 = 1;
const TEXT_PRESENT: u8 = 2;

/// Identifies one binding for per-destination level access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamId {
    Index(usize),
    Name(String),
}

impl From<usize> for StreamId {
    fn from(index: usize) -> Self {
        StreamId::Index(index)
    }
}

impl From<&str> for StreamId {
    fn from(name: &str) -> Self {
        StreamId::Name(name.to_string())
    }
}

impl From<String> for StreamId {
    fn from(name: String) -> Self {
        StreamId::Name(name)
    }
}

pub struct Logger {
    fields: Arc<Fields>,
    serializers: Serializers,
    src: bool,
    /// Replaced wholesale on mutation; readers hold their own `Arc`
    streams: RwLock<Arc<Vec<StreamBinding>>>,
    level: AtomicU32,
    has_text_streams: AtomicU8,
    owns_streams: bool,
    closed: AtomicBool,
    errors: Arc<ErrorChannel>,
    metrics: Arc<LoggerMetrics>,
}

impl Logger {
    /// Create a top-level logger
    ///
    /// # Example
    ///
    /// ```
    /// use rust_bunyan::{Logger, LoggerOptions, StreamSpec};
    /// use rust_bunyan::appenders::RingBuffer;
    /// use std::sync::Arc;
    ///
    /// let ring = Arc::new(RingBuffer::new(10));
    /// let log = Logger::new(
    ///     LoggerOptions::new("myapp").add_stream(StreamSpec::raw(ring.clone())),
    /// )
    /// .unwrap();
    ///
    /// log.info("hello");
    /// assert_eq!(ring.get(0).unwrap().msg(), "hello");
    /// ```
    pub fn new(options: LoggerOptions) -> Result<Self> {
        let LoggerOptions {
            name,
            level,
            stream,
            streams,
            serializers,
            src,
            fields: extra,
        } = options;

        let name = name.filter(|n| !n.is_empty()).ok_or(LoggerError::MissingName)?;
        if streams.is_some() && (stream.is_some() || level.is_some()) {
            return Err(LoggerError::ConflictingStreamConfig);
        }

        let errors = Arc::new(ErrorChannel::new());
        let mut bindings: Vec<StreamBinding> = Vec::new();
        match (stream, streams) {
            (_, Some(specs)) => {
                for spec in specs {
                    let binding = spec.into_binding(Level::INFO, Arc::clone(&errors), &bindings)?;
                    bindings.push(binding);
                }
            }
            (sink, None) => {
                let level = match level {
                    Some(arg) => resolve_level(arg)?,
                    None => Level::INFO,
                };
                let sink = sink.unwrap_or_else(|| Arc::new(ConsoleSink::stdout()));
                let binding = StreamSpec::shared(sink)
                    .with_kind("stream")
                    .with_level(level)
                    .with_close_on_exit(false)
                    .into_binding(Level::INFO, Arc::clone(&errors), &bindings)?;
                bindings.push(binding);
            }
        }

        let serializers = serializers.unwrap_or_default();
        let metrics = Arc::new(LoggerMetrics::new());

        let mut fields = extra;
        fields.insert("name", name);
        let failures = serializers.apply(&mut fields);
        metrics.record_serializer_failures(failures as u64);
        if !fields.contains_key("hostname") {
            fields.insert("hostname", hostname());
        }
        if !fields.contains_key("pid") {
            fields.insert("pid", std::process::id());
        }

        let level = min_level(&bindings).unwrap_or(Level::OFF);
        Ok(Self {
            fields: Arc::new(fields),
            serializers,
            src: src.unwrap_or(false),
            streams: RwLock::new(Arc::new(bindings)),
            level: AtomicU32::new(level.value()),
            has_text_streams: AtomicU8::new(TEXT_UNKNOWN),
            owns_streams: true,
            closed: AtomicBool::new(false),
            errors,
            metrics,
        })
    }

    /// Derive a child logger
    ///
    /// The child inherits this logger's bindings (without closing rights),
    /// serializers and fields. `level` re-levels the inherited bindings of
    /// the child only; `stream` / `streams` add bindings to the child only.
    /// As with [`Logger::new`], `streams` excludes `stream` and `level`.
    /// Serializers run on the child's new fields alone.
    pub fn child(&self, options: LoggerOptions) -> Result<Logger> {
        let LoggerOptions {
            name,
            level,
            stream,
            streams,
            serializers,
            src,
            fields: extra,
        } = options;

        if name.is_some() {
            return Err(LoggerError::NameImmutableInChild);
        }
        if streams.is_some() && (stream.is_some() || level.is_some()) {
            return Err(LoggerError::ConflictingStreamConfig);
        }

        let level = level.map(resolve_level).transpose()?;
        let parent = self.streams.read().clone();
        let mut bindings: Vec<StreamBinding> = parent
            .iter()
            .map(|b| match level {
                Some(level) => b.borrowed().with_level(level),
                None => b.borrowed(),
            })
            .collect();

        let errors = Arc::new(ErrorChannel::new());
        if let Some(sink) = stream {
            let binding = StreamSpec::shared(sink)
                .with_kind("stream")
                .with_level(level.unwrap_or(Level::INFO))
                .with_close_on_exit(false)
                .into_binding(Level::INFO, Arc::clone(&errors), &bindings)?;
            bindings.push(binding);
        }
        for spec in streams.unwrap_or_default() {
            let binding = spec.into_binding(Level::INFO, Arc::clone(&errors), &bindings)?;
            bindings.push(binding);
        }

        let serializers = match serializers {
            Some(added) => self.serializers.merged(&added),
            None => self.serializers.clone(),
        };

        let mut added = extra;
        let failures = serializers.apply(&mut added);
        self.metrics.record_serializer_failures(failures as u64);
        let mut fields = (*self.fields).clone();
        fields.merge(added);

        let effective = min_level(&bindings)
            .or(level)
            .unwrap_or_else(|| self.level());
        Ok(Logger {
            fields: Arc::new(fields),
            serializers,
            src: src.unwrap_or(self.src),
            streams: RwLock::new(Arc::new(bindings)),
            level: AtomicU32::new(effective.value()),
            has_text_streams: AtomicU8::new(TEXT_UNKNOWN),
            owns_streams: true,
            closed: AtomicBool::new(false),
            errors,
            metrics: Arc::clone(&self.metrics),
        })
    }

    /// Derive a child that only adds fields
    ///
    /// Shares this logger's binding list, serializers, level and error
    /// channel. The new fields are taken as given: serializers are not run
    /// on them. The child owns none of its bindings, so closing it is a
    /// no-op.
    pub fn child_fast(&self, fields: Fields) -> Logger {
        let mut merged = (*self.fields).clone();
        merged.merge(fields);
        Logger {
            fields: Arc::new(merged),
            serializers: self.serializers.clone(),
            src: self.src,
            streams: RwLock::new(self.streams.read().clone()),
            level: AtomicU32::new(self.level.load(Ordering::Relaxed)),
            has_text_streams: AtomicU8::new(self.has_text_streams.load(Ordering::Relaxed)),
            owns_streams: false,
            closed: AtomicBool::new(false),
            errors: Arc::clone(&self.errors),
            metrics: Arc::clone(&self.metrics),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(FieldValue::as_str)
    }

    /// Fields included in every record from this logger
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn serializers(&self) -> &Serializers {
        &self.serializers
    }

    /// Whether call sites are captured as `src`
    pub fn src(&self) -> bool {
        self.src
    }

    /// Current binding list
    pub fn streams(&self) -> Arc<Vec<StreamBinding>> {
        self.streams.read().clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Effective level: the lowest threshold among this logger's bindings
    pub fn level(&self) -> Level {
        Level::new(self.level.load(Ordering::Relaxed))
    }

    /// Set every binding of this logger to `level`
    pub fn set_level(&self, level: impl Into<LevelArg>) -> Result<()> {
        let level = resolve_level(level)?;
        let mut slot = self.streams.write();
        let updated: Vec<StreamBinding> = slot.iter().map(|b| b.with_level(level)).collect();
        *slot = Arc::new(updated);
        self.level.store(level.value(), Ordering::Relaxed);
        Ok(())
    }

    /// Threshold of every binding, in registration order
    pub fn stream_levels(&self) -> Vec<Level> {
        self.streams.read().iter().map(StreamBinding::level).collect()
    }

    /// Threshold of one binding, by index or name
    pub fn stream_level(&self, id: impl Into<StreamId>) -> Result<Level> {
        let streams = self.streams.read().clone();
        let index = find_stream(&streams, &id.into())?;
        Ok(streams[index].level())
    }

    /// Set the threshold of one binding, by index or name
    ///
    /// The effective level is recomputed as the minimum over all bindings.
    pub fn set_stream_level(&self, id: impl Into<StreamId>, level: impl Into<LevelArg>) -> Result<()> {
        let id = id.into();
        let level = resolve_level(level)?;
        let mut slot = self.streams.write();
        let index = find_stream(&slot, &id)?;
        let mut updated: Vec<StreamBinding> = slot.to_vec();
        updated[index] = updated[index].with_level(level);
        let effective = min_level(&updated).unwrap_or(level);
        *slot = Arc::new(updated);
        self.level.store(effective.value(), Ordering::Relaxed);
        Ok(())
    }

    /// Whether a call at `level` would reach any binding
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        self.level.load(Ordering::Relaxed) <= level.value()
    }

    /// Add a binding to this logger only
    ///
    /// Threshold defaults to `info`. Lowers the effective level if needed.
    pub fn add_stream(&self, spec: StreamSpec) -> Result<()> {
        let mut slot = self.streams.write();
        let binding = spec.into_binding(Level::INFO, Arc::clone(&self.errors), &slot)?;
        let level = binding.level();
        let mut updated: Vec<StreamBinding> = slot.to_vec();
        updated.push(binding);
        *slot = Arc::new(updated);
        self.level.fetch_min(level.value(), Ordering::Relaxed);
        self.has_text_streams.store(TEXT_UNKNOWN, Ordering::Relaxed);
        Ok(())
    }

    /// Subscribe to destination errors of the bindings this logger created
    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&StreamError) + Send + Sync + 'static,
    {
        self.errors.subscribe(Arc::new(handler));
    }

    /// Flush every binding
    pub fn flush(&self) -> Result<()> {
        let mut first_error = None;
        for binding in self.streams().iter() {
            if let Err(e) = binding.sink().flush() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Close the bindings this logger owns; later calls do nothing
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) || !self.owns_streams {
            return Ok(());
        }
        let mut first_error = None;
        for binding in self.streams().iter().filter(|b| b.close_on_exit()) {
            if let Err(e) = binding.sink().close() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Fluent builder for `level`, which may be any registered name or number
    pub fn at(&self, level: impl Into<LevelArg>) -> Result<EventBuilder<'_>> {
        Ok(EventBuilder::new(self, resolve_level(level)?))
    }

    /// Log at `level` with optional call fields and message arguments
    ///
    /// Does nothing beyond a level comparison when `level` is disabled.
    #[track_caller]
    pub fn log(&self, level: Level, fields: Option<Fields>, args: Vec<FieldValue>) {
        self.log_at(level, fields, args, SourceLocation::caller());
    }

    /// [`Logger::log`] with an explicit call site
    pub fn log_at(
        &self,
        level: Level,
        fields: Option<Fields>,
        args: Vec<FieldValue>,
        location: SourceLocation,
    ) {
        if !self.enabled(level) {
            self.metrics.record_filtered();
            return;
        }
        let record = self.mk_record(fields, level, args, location);
        self.emit(record);
    }

    /// Package one call without touching the logger's fields
    pub fn mk_record(
        &self,
        fields: Option<Fields>,
        level: Level,
        args: Vec<FieldValue>,
        location: SourceLocation,
    ) -> Record {
        Record {
            base: Arc::clone(&self.fields),
            fields,
            level,
            args,
            location,
        }
    }

    /// Build the final record and write it to every qualifying binding
    pub fn emit(&self, record: Record) {
        self.metrics.record_emitted();
        let Record {
            base,
            fields,
            level,
            args,
            location,
        } = record;

        let mut obj = (*base).clone();
        obj.insert("level", level.value());
        if let Some(mut call_fields) = fields {
            let failures = self.serializers.apply(&mut call_fields);
            if failures > 0 {
                self.metrics.record_serializer_failures(failures as u64);
            }
            obj.merge(call_fields);
        }
        obj.insert("msg", format_message(&args));
        if !obj.contains_key("time") {
            obj.insert("time", Utc::now());
        }
        if self.src && !obj.contains_key("src") {
            obj.insert("src", location.to_value());
        }
        obj.insert("v", LOG_VERSION);
        let record = Arc::new(LogRecord::from_fields(obj));

        let streams = self.streams();
        let line = if self.has_text_streams(&streams) {
            Some(self.stringify(&base, &record, &location))
        } else {
            None
        };

        for (index, binding) in streams.iter().enumerate() {
            if binding.level() > level {
                continue;
            }
            let unit = match (binding.kind().is_text(), &line) {
                (true, Some(line)) => WriteUnit::Text(Arc::clone(line)),
                (true, None) => continue,
                (false, _) => WriteUnit::Raw(Arc::clone(&record)),
            };
            match binding.deliver(&unit) {
                Ok(()) => {
                    self.metrics.record_write();
                }
                Err(LoggerError::SinkUnavailable { .. }) => {
                    self.metrics.record_write_failure();
                }
                Err(e) => {
                    self.metrics.record_write_failure();
                    binding.report(e, index);
                }
            }
        }
    }

    fn has_text_streams(&self, streams: &[StreamBinding]) -> bool {
        match self.has_text_streams.load(Ordering::Relaxed) {
            TEXT_PRESENT => true,
            TEXT_ABSENT => false,
            _ => {
                let present = streams.iter().any(|b| b.kind().is_text());
                self.has_text_streams.store(
                    if present { TEXT_PRESENT } else { TEXT_ABSENT },
                    Ordering::Relaxed,
                );
                present
            }
        }
    }

    fn stringify(&self, base: &Fields, record: &LogRecord, location: &SourceLocation) -> Arc<str> {
        self.metrics.record_stringify();
        match record.to_json_line() {
            Ok(line) => Arc::from(line),
            Err(e) => {
                let problem = format!("could not stringify log record from {}: {}", location, e);
                diagnostics::warn_once(&location.to_string(), &problem);
                let time = record.get("time").cloned().unwrap_or_default();
                Arc::from(LogRecord::fallback_line(base, record.msg(), &time, &problem))
            }
        }
    }
}

macro_rules! level_methods {
    ($( $level:ident => $plain:ident, $with:ident, $builder:ident, $is_enabled:ident; )*) => {
        impl Logger {
            $(
                #[doc = concat!("Log a message at `", stringify!($plain), "`")]
                #[track_caller]
                pub fn $plain(&self, msg: impl Into<FieldValue>) {
                    self.log(Level::$level, None, vec![msg.into()]);
                }

                #[doc = concat!("Log a message with call fields at `", stringify!($plain), "`")]
                #[track_caller]
                pub fn $with(&self, fields: Fields, msg: impl Into<FieldValue>) {
                    self.log(Level::$level, Some(fields), vec![msg.into()]);
                }

                pub fn $builder(&self) -> EventBuilder<'_> {
                    EventBuilder::new(self, Level::$level)
                }

                #[inline]
                pub fn $is_enabled(&self) -> bool {
                    self.enabled(Level::$level)
                }
            )*
        }
    };
}

level_methods! {
    TRACE => trace, trace_with, trace_builder, is_trace_enabled;
    DEBUG => debug, debug_with, debug_builder, is_debug_enabled;
    INFO => info, info_with, info_builder, is_info_enabled;
    WARN => warn, warn_with, warn_builder, is_warn_enabled;
    ERROR => error, error_with, error_builder, is_error_enabled;
    FATAL => fatal, fatal_with, fatal_builder, is_fatal_enabled;
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("fields", &self.fields)
            .field("level", &self.level())
            .field("streams", &self.streams())
            .field("serializers", &self.serializers)
            .field("src", &self.src)
            .finish()
    }
}

fn min_level(bindings: &[StreamBinding]) -> Option<Level> {
    bindings.iter().map(StreamBinding::level).min()
}

fn find_stream(streams: &[StreamBinding], id: &StreamId) -> Result<usize> {
    match id {
        StreamId::Index(index) => {
            if *index < streams.len() {
                Ok(*index)
            } else {
                Err(LoggerError::UnknownStreamIndex { index: *index })
            }
        }
        StreamId::Name(name) => streams
            .iter()
            .position(|b| b.name() == Some(name.as_str()))
            .ok_or_else(|| LoggerError::UnknownStreamName { name: name.clone() }),
    }
}

fn hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
