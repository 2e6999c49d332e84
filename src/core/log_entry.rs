//! Log entry structure

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric/named identifier attached to an entry by the call site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventId {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    /// An event id is rendered only when it carries information
    pub fn is_empty(&self) -> bool {
        self.id == 0 && self.name.is_none()
    }
}

/// Structured error attached to an entry
///
/// This is the only part of an entry allowed to span several lines when
/// rendered: the cause chain and backtrace are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

impl ErrorDetail {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
            backtrace: None,
        }
    }

    /// Capture an error, its concrete type name and its `source()` chain
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized + 'static,
    {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind: std::any::type_name::<E>().to_string(),
            message: err.to_string(),
            causes,
            backtrace: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    /// Cause chain flattened into a single string, if there is one
    pub fn inner(&self) -> Option<String> {
        if self.causes.is_empty() {
            None
        } else {
            Some(self.causes.join(" ---> "))
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        for cause in &self.causes {
            write!(f, "\n ---> {}", cause)?;
        }
        if let Some(ref backtrace) = self.backtrace {
            write!(f, "\n{}", backtrace)?;
        }
        Ok(())
    }
}

/// A single logging call, alive only until it has been formatted
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub category: String,
    pub message: Option<String>,
    pub error: Option<ErrorDetail>,
    pub event_id: EventId,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            category: category.into(),
            message: Some(message.into()),
            error: None,
            event_id: EventId::default(),
            timestamp: Utc::now(),
        }
    }

    /// An entry that only carries an error
    pub fn from_error(level: LogLevel, category: impl Into<String>, error: ErrorDetail) -> Self {
        Self {
            level,
            category: category.into(),
            message: None,
            error: Some(error),
            event_id: EventId::default(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_error(mut self, error: ErrorDetail) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Entries with neither a message nor an error produce no output
    pub fn is_suppressed(&self) -> bool {
        self.message.is_none() && self.error.is_none()
    }
}
