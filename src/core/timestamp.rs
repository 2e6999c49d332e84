//! Timestamp formatting utilities
//!
//! Provides standardized, configurable timestamp formats for log output,
//! rendered either in UTC or in the local time zone.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Write};

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use litty_logs::core::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Utc::now(), true);
/// // Output: "2026-02-19T10:30:45.123Z"
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2026-02-19T10:30:45.123Z`
    ///
    /// Local time renders the offset instead: `2026-02-19T11:30:45.123+01:00`.
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2026-02-19T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2026-02-19T10:30:45.123456789+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1771497045123`
    UnixMillis,

    /// Custom strftime format
    ///
    /// ```
    /// use litty_logs::core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%H:%M:%S".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Format an instant, in UTC or converted to the local time zone
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>, use_utc: bool) -> String {
        if use_utc {
            self.render(datetime, true)
        } else {
            self.render(&datetime.with_timezone(&Local), false)
        }
    }

    /// Check that a custom format string only uses known specifiers
    ///
    /// ```
    /// use litty_logs::core::TimestampFormat;
    ///
    /// assert!(TimestampFormat::Custom("%H:%M:%S".into()).validate("FileSink").is_ok());
    /// assert!(TimestampFormat::Custom("%Q".into()).validate("FileSink").is_err());
    /// ```
    pub fn validate(&self, component: &str) -> Result<()> {
        let TimestampFormat::Custom(format_str) = self else {
            return Ok(());
        };
        if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
            return Err(LoggerError::config(
                component,
                format!("invalid timestamp format '{}'", format_str),
            ));
        }
        Ok(())
    }

    fn render<Tz>(&self, datetime: &DateTime<Tz>, is_utc: bool) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match self {
            TimestampFormat::Iso8601 if is_utc => {
                datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
            }
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Iso8601Micros if is_utc => {
                datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
            }
            TimestampFormat::Iso8601Micros => {
                datetime.format("%Y-%m-%dT%H:%M:%S%.6f%:z").to_string()
            }
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut rendered = String::new();
                if write!(rendered, "{}", datetime.format(format_str)).is_err() {
                    return TimestampFormat::Iso8601.render(datetime, is_utc);
                }
                rendered
            }
        }
    }

    /// Get a description of this format
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            TimestampFormat::Iso8601 => "ISO 8601 with milliseconds (2026-02-19T10:30:45.123Z)",
            TimestampFormat::Iso8601Micros => {
                "ISO 8601 with microseconds (2026-02-19T10:30:45.123456Z)"
            }
            TimestampFormat::Rfc3339 => "RFC 3339 with timezone (2026-02-19T10:30:45+00:00)",
            TimestampFormat::UnixMillis => "Unix timestamp in milliseconds (1771497045123)",
            TimestampFormat::Custom(_) => "Custom strftime format",
        }
    }
}
