//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

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

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Webhook URL rejected at registration
    #[error("Invalid webhook URL '{url}': {message}")]
    InvalidWebhookUrl { url: String, message: String },

    /// Webhook platform name that has no payload formatter
    #[error("Unsupported webhook platform: '{0}'")]
    UnsupportedPlatform(String),

    /// File writer error with path
    #[error("File writer error for '{path}': {message}")]
    FileWriterError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Compression of a rotated file failed
    #[error("Compression failed for '{path}': {message}")]
    CompressionError { path: String, message: String },

    /// Webhook endpoint answered with a non-success status
    #[error("Webhook returned HTTP {status}")]
    HttpStatus { status: u16 },

    /// Webhook request never produced a response
    #[error("Webhook transport error: {0}")]
    HttpTransport(String),
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

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an invalid webhook URL error
    pub fn webhook_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidWebhookUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a file writer error
    pub fn file_writer(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileWriterError {
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

    /// Create a compression error
    pub fn compression(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::CompressionError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16) -> Self {
        LoggerError::HttpStatus { status }
    }

    /// Create an HTTP transport error
    pub fn http_transport<S: Into<String>>(msg: S) -> Self {
        LoggerError::HttpTransport(msg.into())
    }

    /// Whether this error is a registration-time configuration error
    ///
    /// Configuration errors are the only failures surfaced to callers; all
    /// other variants are recovered inside the delivery engine.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidConfiguration { .. }
                | LoggerError::InvalidWebhookUrl { .. }
                | LoggerError::UnsupportedPlatform(_)
        )
    }

    /// Whether a webhook request failing this way may succeed if repeated
    ///
    /// Transport failures, `429 Too Many Requests` and server errors are
    /// transient; other statuses mean the request itself was refused.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            LoggerError::HttpTransport(_) => true,
            LoggerError::HttpStatus { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
