//! Logging macros
//!
//! Message arguments use printf-style tokens (`%s`, `%d`, `%j`, `%%`);
//! arguments left over are appended separated by spaces. Arguments are only
//! evaluated when the level is enabled.
//!
//! # Examples
//!
//! ```
//! use rust_bunyan::prelude::*;
//! use rust_bunyan::{fields, info, warn};
//! use std::sync::Arc;
//!
//! let ring = Arc::new(RingBuffer::new(10));
//! let log = Logger::new(LoggerOptions::new("app").add_stream(StreamSpec::raw(ring.clone()))).unwrap();
//!
//! // Basic logging
//! info!(log, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(log, "Server listening on port %d", port);
//!
//! // With call fields
//! warn!(log, { "user_id" => 42, "action" => "login" }, "slow %s", "request");
//!
//! assert_eq!(ring.get(0).unwrap().msg(), "slow request");
//! ```

/// Build a [`Fields`](crate::Fields) map.
///
/// # Examples
///
/// ```
/// use rust_bunyan::fields;
///
/// let fields = fields! { "user" => "ann", "attempt" => 3 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(fields.insert($key, $value);)+
        fields
    }};
}

/// Log at any level, with optional call fields.
///
/// # Examples
///
/// ```
/// # use rust_bunyan::prelude::*;
/// # use std::sync::Arc;
/// # let log = Logger::new(LoggerOptions::new("app").add_stream(StreamSpec::raw(Arc::new(RingBuffer::default())))).unwrap();
/// use rust_bunyan::log;
/// log!(log, Level::INFO, "Simple message");
/// log!(log, Level::ERROR, "Error code: %d", 500);
/// log!(log, Level::new(45), { "component" => "db" }, "custom level");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }, $($arg:expr),+ $(,)?) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log_at(
                level,
                Some($crate::fields!($($key => $value),*)),
                vec![$($crate::FieldValue::from($arg)),+],
                $crate::SourceLocation::new(file!(), line!(), Some(module_path!())),
            );
        } else {
            logger.metrics().record_filtered();
        }
    }};
    ($logger:expr, $level:expr, $($arg:expr),+ $(,)?) => {{
        let logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log_at(
                level,
                None,
                vec![$($crate::FieldValue::from($arg)),+],
                $crate::SourceLocation::new(file!(), line!(), Some(module_path!())),
            );
        } else {
            logger.metrics().record_filtered();
        }
    }};
}

/// Log a trace-level message.
///
/// ```
/// # use rust_bunyan::prelude::*;
/// # use std::sync::Arc;
/// # let log = Logger::new(LoggerOptions::new("app").add_stream(StreamSpec::raw(Arc::new(RingBuffer::default())).with_level("trace"))).unwrap();
/// use rust_bunyan::trace;
/// trace!(log, "Entering function: calculate()");
/// trace!(log, "Variable value: %d", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::TRACE, $($rest)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($rest)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($rest)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::WARN, $($rest)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use rust_bunyan::prelude::*;
/// # use std::sync::Arc;
/// # let log = Logger::new(LoggerOptions::new("app").add_stream(StreamSpec::raw(Arc::new(RingBuffer::default())))).unwrap();
/// use rust_bunyan::error;
/// error!(log, "Failed to connect to database");
/// error!(log, { "code" => 500 }, "Error code: %d, message: %s", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($rest)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::FATAL, $($rest)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::RingBuffer;
    use crate::core::{FieldValue, Level, Logger, LoggerOptions, StreamSpec};
    use std::sync::Arc;

    fn logger(level: &str) -> (Logger, Arc<RingBuffer>) {
        let ring = Arc::new(RingBuffer::new(20));
        let log = Logger::new(
            LoggerOptions::new("macros")
                .with_src(true)
                .add_stream(StreamSpec::raw(ring.clone()).with_level(level)),
        )
        .unwrap();
        (log, ring)
    }

    #[test]
    fn test_fields_macro() {
        let fields = fields! { "a" => 1, "b" => "two" };
        assert_eq!(fields.get("a"), Some(&FieldValue::Int(1)));
        assert!(fields!().is_empty());
    }

    #[test]
    fn test_log_macro() {
        let (log, ring) = logger("info");
        log!(log, Level::INFO, "Test message");
        log!(log, Level::INFO, "Formatted: %d", 42);
        assert_eq!(ring.get(0).unwrap().msg(), "Formatted: 42");
        assert_eq!(ring.get(1).unwrap().msg(), "Test message");
    }

    #[test]
    fn test_level_macros() {
        let (log, ring) = logger("trace");
        trace!(log, "t");
        debug!(log, "d");
        info!(log, "i");
        warn!(log, "w");
        error!(log, "e");
        fatal!(log, "f");
        let levels: Vec<Level> = ring.records().iter().map(|r| r.level()).collect();
        assert_eq!(
            levels,
            vec![Level::TRACE, Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR, Level::FATAL]
        );
    }

    #[test]
    fn test_call_fields() {
        let (log, ring) = logger("info");
        warn!(log, { "retry" => 1, "of" => 3 }, "Retry %d of %d", 1, 3);
        let rec = ring.get(0).unwrap();
        assert_eq!(rec.msg(), "Retry 1 of 3");
        assert_eq!(rec.get("of"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn test_disabled_level_skips_arguments() {
        let (log, ring) = logger("warn");
        let mut evaluated = false;
        debug!(log, "value %s", {
            evaluated = true;
            "x"
        });
        assert!(!evaluated);
        assert!(ring.is_empty());
        assert_eq!(log.metrics().filtered(), 1);
    }

    #[test]
    fn test_src_records_module_path() {
        let (log, ring) = logger("info");
        info!(log, "where");
        let src = ring.get(0).unwrap().get("src").cloned().unwrap();
        assert!(src.get("file").unwrap().as_str().unwrap().ends_with("macros.rs"));
        assert_eq!(
            src.get("func").unwrap().as_str(),
            Some("rust_bunyan::macros::tests")
        );
    }
}
