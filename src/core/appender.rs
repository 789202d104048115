//! Sink trait for log output destinations

use super::{error::Result, record::LogRecord, LoggerError};
use std::sync::Arc;

/// What a destination receives for one emission
#[derive(Debug, Clone)]
pub enum WriteUnit {
    /// Newline-terminated JSON line
    Text(Arc<str>),
    /// The in-memory record, shared by every raw destination of one emission
    Raw(Arc<LogRecord>),
}

impl WriteUnit {
    /// Text form of this unit; raw records are encoded on demand
    pub fn to_text(&self) -> Result<Arc<str>> {
        match self {
            WriteUnit::Text(line) => Ok(Arc::clone(line)),
            WriteUnit::Raw(record) => Ok(Arc::from(record.to_json_line()?)),
        }
    }
}

/// A destination the logger can write to
///
/// Methods take `&self`; implementations guard their own state.
pub trait Sink: Send + Sync {
    fn write(&self, unit: &WriteUnit) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Release the underlying resource; later writes may fail
    fn close(&self) -> Result<()> {
        self.flush()
    }

    /// Receives errors re-emitted from the logger for this sink's binding
    fn on_error(&self, _error: &LoggerError) {}

    fn name(&self) -> &str;
}

pub type SharedSink = Arc<dyn Sink>;
