//! Core logger types and traits

pub mod appender;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod log_level;
pub mod logger;
pub mod message;
pub mod metrics;
pub mod output_format;
pub mod record;
pub mod render;
pub mod serializers;
pub mod stream;
pub mod timestamp;
pub mod value;

pub use appender::{SharedSink, Sink, WriteUnit};
pub use builder::EventBuilder;
pub use config::LoggerOptions;
pub use error::{LoggerError, Result};
pub use log_level::{
    level_name, register_level, resolve_level, Level, LevelArg, LevelRegistry, RESERVED_NAMES,
};
pub use logger::{Logger, StreamId};
pub use message::format_message;
pub use metrics::LoggerMetrics;
pub use output_format::{render_line, render_record, OutputMode, RenderOptions};
pub use record::{LogRecord, Record, SourceLocation, LOG_VERSION};
pub use render::CIRCULAR;
pub use serializers::{std_serializers, BoxError, Serializer, Serializers};
pub use stream::{
    ErrorChannel, ErrorHandler, StreamBinding, StreamError, StreamInfo, StreamSpec, StreamType,
};
pub use timestamp::TimeDisplay;
pub use value::{ErrorValue, FieldValue, Fields, OpaqueValue};
