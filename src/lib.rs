//! # Rust Bunyan
//!
//! Structured JSON logging: every log call becomes one JSON record that is
//! written to any number of destinations, each with its own level.
//!
//! ## Features
//!
//! - **Structured records**: `name`, `hostname`, `pid`, `level`, `msg`, `time`
//!   and `v` on every record, plus any fields you attach
//! - **Child loggers**: derive loggers that add fields, destinations or a
//!   different level without touching the parent
//! - **Serializers**: per-field functions that turn rich values (errors,
//!   requests, responses) into loggable ones
//! - **Multiple destinations**: text streams, files and in-memory raw sinks
//!   such as [`RingBuffer`](appenders::RingBuffer)
//! - **Cycle safe**: self-referencing values render as `"[Circular]"`
//!
//! ## Example
//!
//! ```
//! use rust_bunyan::prelude::*;
//! use std::sync::Arc;
//!
//! let ring = Arc::new(RingBuffer::new(10));
//! let log = Logger::new(
//!     LoggerOptions::new("myapp").add_stream(StreamSpec::raw(ring.clone()).with_level("debug")),
//! )
//! .unwrap();
//!
//! let request_log = log
//!     .child(LoggerOptions::child().with_field("req_id", "abc-123"))
//!     .unwrap();
//! request_log.debug("handling request");
//!
//! let record = ring.get(0).unwrap();
//! assert_eq!(record.msg(), "handling request");
//! assert_eq!(record.get("req_id").and_then(FieldValue::as_str), Some("abc-123"));
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleSink, ConsoleTarget, FileSink, RingBuffer};
    pub use crate::core::{
        std_serializers, EventBuilder, FieldValue, Fields, Level, LevelArg, LogRecord, Logger,
        LoggerError, LoggerMetrics, LoggerOptions, OutputMode, RenderOptions, Result, Serializers,
        Sink, SourceLocation, StreamId, StreamSpec, StreamType, WriteUnit,
    };
}

pub use appenders::{ConsoleSink, ConsoleTarget, FileSink, RingBuffer, DEFAULT_RING_BUFFER_LIMIT};
pub use core::{
    format_message, level_name, register_level, render_line, render_record, resolve_level,
    std_serializers, BoxError, ErrorChannel, ErrorHandler, ErrorValue, EventBuilder, FieldValue,
    Fields, Level, LevelArg, LevelRegistry, LogRecord, Logger, LoggerError, LoggerMetrics,
    LoggerOptions, OpaqueValue, OutputMode, Record, RenderOptions, Result, Serializer,
    Serializers, SharedSink, Sink, SourceLocation, StreamBinding, StreamError, StreamId,
    StreamInfo, StreamSpec, StreamType, TimeDisplay, WriteUnit, CIRCULAR, LOG_VERSION,
    RESERVED_NAMES,
};
