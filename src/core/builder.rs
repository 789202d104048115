//! Fluent record builder
//!
//! Collects call fields and message arguments for one log call. The level
//! is checked once when the builder is created; a builder for a disabled
//! level ignores everything handed to it.

use super::log_level::Level;
use super::logger::Logger;
use super::record::SourceLocation;
use super::value::{ErrorValue, FieldValue, Fields};
use std::error::Error as StdError;

/// Builder for one log call
///
/// # Example
///
/// ```
/// use rust_bunyan::{Logger, LoggerOptions, StreamSpec};
/// use rust_bunyan::appenders::RingBuffer;
/// use std::sync::Arc;
///
/// let ring = Arc::new(RingBuffer::new(10));
/// let log = Logger::new(LoggerOptions::new("api").add_stream(StreamSpec::raw(ring.clone()))).unwrap();
///
/// log.info_builder()
///     .field("user_id", 12345)
///     .field("latency_ms", 42.5)
///     .msg("request %s took %dms")
///     .arg("/users")
///     .arg(42)
///     .log();
///
/// assert_eq!(ring.get(0).unwrap().msg(), "request /users took 42ms");
/// ```
#[must_use = "a builder does nothing until `log` is called"]
pub struct EventBuilder<'a> {
    logger: &'a Logger,
    level: Level,
    enabled: bool,
    fields: Option<Fields>,
    args: Vec<FieldValue>,
    err_message: Option<String>,
    location: Option<SourceLocation>,
}

impl<'a> EventBuilder<'a> {
    pub fn new(logger: &'a Logger, level: Level) -> Self {
        Self {
            logger,
            level,
            enabled: logger.enabled(level),
            fields: None,
            args: Vec::new(),
            err_message: None,
            location: None,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether this builder's level reaches any destination
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        if self.enabled {
            self.fields.get_or_insert_with(Fields::new).insert(key, value);
        }
        self
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        if self.enabled {
            self.fields.get_or_insert_with(Fields::new).merge(fields);
        }
        self
    }

    /// Attach an error as the `err` field
    ///
    /// When no message is given, the error's message becomes `msg`.
    pub fn err<E>(self, error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        if !self.enabled {
            return self;
        }
        self.err_value(ErrorValue::new(error))
    }

    pub fn err_value(mut self, error: ErrorValue) -> Self {
        if !self.enabled {
            return self;
        }
        self.err_message = Some(error.message());
        self.fields
            .get_or_insert_with(Fields::new)
            .insert("err", FieldValue::Error(error));
        self
    }

    /// Message format string; replaces any arguments given so far
    pub fn msg(mut self, format: impl Into<FieldValue>) -> Self {
        if !self.enabled {
            return self;
        }
        self.args.clear();
        self.args.push(format.into());
        self
    }

    pub fn arg(mut self, value: impl Into<FieldValue>) -> Self {
        if self.enabled {
            self.args.push(value.into());
        }
        self
    }

    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        if self.enabled {
            self.args.extend(values.into_iter().map(Into::into));
        }
        self
    }

    /// Override the call site recorded as `src`
    pub fn location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Emit the record; a disabled level costs one comparison
    #[track_caller]
    pub fn log(self) {
        if !self.enabled {
            self.logger.metrics().record_filtered();
            return;
        }
        let location = self.location.unwrap_or_else(SourceLocation::caller);
        let Self {
            logger,
            level,
            fields,
            mut args,
            err_message,
            ..
        } = self;
        if args.is_empty() {
            if let Some(message) = err_message {
                args.push(FieldValue::String(message));
            }
        }
        logger.log_at(level, fields, args, location);
    }
}
