//! Formatting options shared by every sink
//!
//! Options are immutable values: each sink receives its own copy at
//! construction and never mutates it afterwards.

use super::error::Result;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Encoding of a formatted line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[🔥 info] [2026-02-19T10:30:45.123Z] [Lifetime] message`
    #[default]
    Text,

    /// `{"timestamp":"…","level":"info","emoji":"🔥","category":"Lifetime","message":"…"}`
    Json,
}

/// How a log entry is rendered
///
/// # Examples
///
/// ```
/// use litty_logs::core::{FormatOptions, TimestampFormat};
///
/// let options = FormatOptions::new()
///     .with_colors(false)
///     .with_timestamp_first(true)
///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
/// assert!(options.timestamp_first);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Replace well-known framework messages with their embellished version
    pub rewrite_messages: bool,
    /// ANSI colors in text output
    pub use_colors: bool,
    /// `My.App.Lifetime` becomes `Lifetime`
    pub shorten_categories: bool,
    /// `[timestamp] [category]` bracket before the level bracket (text only)
    pub timestamp_first: bool,
    /// UTC instead of local time
    pub use_utc: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            rewrite_messages: true,
            use_colors: true,
            shorten_categories: true,
            timestamp_first: false,
            use_utc: true,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl FormatOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rewrite(mut self, enabled: bool) -> Self {
        self.rewrite_messages = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.use_colors = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shorten_categories(mut self, enabled: bool) -> Self {
        self.shorten_categories = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timestamp_first(mut self, enabled: bool) -> Self {
        self.timestamp_first = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_utc(mut self, enabled: bool) -> Self {
        self.use_utc = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Reject options that would fail on every line, naming `component`
    pub fn validate(&self, component: &str) -> Result<()> {
        self.timestamp_format.validate(component)
    }
}

/// Serialize `Duration` as whole milliseconds in config files
pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FormatOptions::default();
        assert!(options.rewrite_messages);
        assert!(options.use_colors);
        assert!(options.shorten_categories);
        assert!(!options.timestamp_first);
        assert!(options.use_utc);
        assert_eq!(options.timestamp_format, TimestampFormat::Iso8601);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let options: FormatOptions =
            serde_json::from_str(r#"{"timestamp_first": true, "use_colors": false}"#).unwrap();
        assert!(options.timestamp_first);
        assert!(!options.use_colors);
        assert!(options.rewrite_messages);
    }

    #[test]
    fn test_output_format_names() {
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, OutputFormat::Json);
    }
}
