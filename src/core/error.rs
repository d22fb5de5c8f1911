//! Error types for the logging facility

use std::fmt;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Coarse classification used to decide whether an error is fatal.
///
/// `Config` and `SinkInit` errors surface from initialization and must stop
/// startup. `RuntimeWrite` and `Template` errors happen while records are
/// being written and are only ever reported through the error callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    SinkInit,
    RuntimeWrite,
    Template,
}

/// A single semantic problem found in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted location inside the document, e.g. `handlers.file.formatter`
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
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

    /// The configuration document could not be parsed
    #[error("Failed to parse {format} configuration: {message}")]
    ConfigParse { format: String, message: String },

    /// The configuration document parsed but is semantically invalid
    #[error("Configuration validation failed: {}", join_validation(.0))]
    Validation(Vec<ValidationError>),

    /// A configuration value is invalid; `component` is its dotted path
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Formatter template problem
    #[error("Template error in formatter '{formatter}': {message}")]
    Template { formatter: String, message: String },

    /// A handler's sink could not be opened
    #[error("Failed to initialize sink for handler '{handler}': {message}")]
    SinkInit { handler: String, message: String },

    /// Writing or flushing a log file failed
    #[error("Failed to write log file '{path}': {message}")]
    FileWrite { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// A sink reported a failed write
    #[error("Writer error: {0}")]
    WriterError(String),

    /// The process-wide facility was already installed
    #[error("Logging facility already initialized")]
    AlreadyInitialized,

    /// Facility already shut down
    #[error("Logging facility already shut down")]
    LoggerStopped,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
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

    /// Create a parse error for the given document format
    pub fn config_parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::ConfigParse {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error at `component`
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(formatter: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Template {
            formatter: formatter.into(),
            message: message.into(),
        }
    }

    /// Create a sink initialization error
    pub fn sink_init(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkInit {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create a log file write error
    pub fn file_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a sink write error
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            LoggerError::ConfigParse { .. }
            | LoggerError::Validation(_)
            | LoggerError::InvalidConfiguration { .. }
            | LoggerError::AlreadyInitialized => ErrorCategory::Config,
            LoggerError::SinkInit { .. } => ErrorCategory::SinkInit,
            LoggerError::Template { .. } => ErrorCategory::Template,
            LoggerError::IoOperation { .. }
            | LoggerError::IoError(_)
            | LoggerError::FileWrite { .. }
            | LoggerError::FileRotationError { .. }
            | LoggerError::WriterError(_)
            | LoggerError::LoggerStopped
            | LoggerError::Other(_) => ErrorCategory::RuntimeWrite,
        }
    }

    /// Whether this error must abort startup
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Config | ErrorCategory::SinkInit
        )
    }

    /// Validation problems carried by this error, if any
    #[must_use]
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            LoggerError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
