//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A level name that is not registered, or a malformed level value
    #[error("invalid level: {value}")]
    InvalidLevel { value: String },

    /// Level name already registered, or reserved by the logger API
    #[error("level '{name}' already exists")]
    DuplicateLevel { name: String },

    /// Another level name already maps to the requested number
    #[error("level '{name}' would duplicate '{existing}' ({level})")]
    ConflictingLevel {
        name: String,
        existing: String,
        level: u32,
    },

    /// Level name is blank or not made of letters and underscores
    #[error("level name '{name}' is invalid")]
    InvalidName { name: String },

    /// Top-level logger created without a name
    #[error("options.name (string) is required")]
    MissingName,

    /// Both the single-stream shorthand and an explicit stream list were given
    #[error("cannot mix \"streams\" with \"stream\" or \"level\" options")]
    ConflictingStreamConfig,

    /// Serializer configuration of the wrong shape
    #[error("invalid options.serializers: {message}")]
    InvalidSerializers { message: String },

    /// Stream configuration of the wrong shape
    #[error("invalid options.streams: {message}")]
    InvalidStreams { message: String },

    /// Destination kind that the engine does not know
    #[error("unknown stream type \"{kind}\"")]
    UnknownDestinationKind { kind: String },

    /// A child logger tried to set its own name
    #[error("invalid options.name: child cannot set logger name")]
    NameImmutableInChild,

    #[error("invalid stream index: {index}")]
    UnknownStreamIndex { index: usize },

    #[error("no stream with name \"{name}\"")]
    UnknownStreamName { name: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Value that has no JSON form without a serializer
    #[error("cannot encode value of type {type_name} as JSON")]
    Unencodable { type_name: String },

    /// Sink whose underlying resource could never be acquired
    #[error("sink for '{path}' is unavailable")]
    SinkUnavailable { path: String },

    /// Sink that has been ended and no longer accepts writes
    #[error("sink '{sink}' has been ended already")]
    SinkClosed { sink: String },

    /// Sink panicked while handling a write
    #[error("sink panicked: {0}")]
    SinkPanicked(String),

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid level error
    pub fn invalid_level(value: impl ToString) -> Self {
        LoggerError::InvalidLevel {
            value: value.to_string(),
        }
    }

    pub fn duplicate_level(name: impl Into<String>) -> Self {
        LoggerError::DuplicateLevel { name: name.into() }
    }

    pub fn conflicting_level(name: impl Into<String>, existing: impl Into<String>, level: u32) -> Self {
        LoggerError::ConflictingLevel {
            name: name.into(),
            existing: existing.into(),
            level,
        }
    }

    pub fn invalid_name(name: impl Into<String>) -> Self {
        LoggerError::InvalidName { name: name.into() }
    }

    pub fn invalid_serializers(message: impl Into<String>) -> Self {
        LoggerError::InvalidSerializers {
            message: message.into(),
        }
    }

    pub fn invalid_streams(message: impl Into<String>) -> Self {
        LoggerError::InvalidStreams {
            message: message.into(),
        }
    }

    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        LoggerError::UnknownDestinationKind { kind: kind.into() }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn unencodable(type_name: impl Into<String>) -> Self {
        LoggerError::Unencodable {
            type_name: type_name.into(),
        }
    }

    pub fn sink_unavailable(path: impl Into<String>) -> Self {
        LoggerError::SinkUnavailable { path: path.into() }
    }

    pub fn sink_closed(sink: impl Into<String>) -> Self {
        LoggerError::SinkClosed { sink: sink.into() }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this error comes from configuration rather than from a destination
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidLevel { .. }
                | LoggerError::DuplicateLevel { .. }
                | LoggerError::ConflictingLevel { .. }
                | LoggerError::InvalidName { .. }
                | LoggerError::MissingName
                | LoggerError::ConflictingStreamConfig
                | LoggerError::InvalidSerializers { .. }
                | LoggerError::InvalidStreams { .. }
                | LoggerError::UnknownDestinationKind { .. }
                | LoggerError::NameImmutableInChild
                | LoggerError::UnknownStreamIndex { .. }
                | LoggerError::UnknownStreamName { .. }
        )
    }
}
