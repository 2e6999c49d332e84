//! Entry formatter
//!
//! Turns a [`LogEntry`] into one formatted line, either text or a compact
//! JSON object. Formatting is a pure function of the entry and the options;
//! nothing here touches I/O.
//!
//! Message text never contributes a raw line break: `\n` and `\r` are
//! replaced with spaces so a caller-supplied string cannot forge a second
//! log line. The attached [`ErrorDetail`] is the only part allowed to span
//! several lines and is appended verbatim.

use super::{
    log_entry::{ErrorDetail, EventId, LogEntry},
    log_level::LogLevel,
    options::{FormatOptions, OutputFormat},
};
use colored::Colorize;
use serde::Serialize;
use std::borrow::Cow;

/// Replace raw line breaks in message text with single spaces
///
/// Each `\n` and each `\r` becomes one space, so `"a\r\nb"` turns into
/// `"a  b"`.
pub fn sanitize(message: &str) -> Cow<'_, str> {
    if message.contains(['\n', '\r']) {
        Cow::Owned(message.replace(['\n', '\r'], " "))
    } else {
        Cow::Borrowed(message)
    }
}

/// `My.App.Services.OrderService` becomes `OrderService`
///
/// Rust module paths (`my_app::services::orders`) are shortened the same
/// way on their last `::` segment.
pub fn shorten_category(category: &str) -> &str {
    let dotted = category.rsplit('.').next().unwrap_or(category);
    dotted.rsplit("::").next().unwrap_or(dotted)
}

/// Formats entries with one fixed set of options
///
/// # Examples
///
/// ```
/// use litty_logs::core::{EntryFormatter, FormatOptions, LogEntry, LogLevel, OutputFormat};
///
/// let formatter = EntryFormatter::new(
///     OutputFormat::Text,
///     FormatOptions::new().with_colors(false),
/// );
/// let entry = LogEntry::new(LogLevel::Info, "My.App.Lifetime", "we vibing");
/// let line = formatter.format(&entry).unwrap();
/// assert!(line.starts_with("[🔥 info] ["));
/// assert!(line.ends_with("[Lifetime] we vibing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntryFormatter {
    format: OutputFormat,
    options: FormatOptions,
}

impl EntryFormatter {
    pub fn new(format: OutputFormat, options: FormatOptions) -> Self {
        Self { format, options }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Format an entry in the configured encoding
    ///
    /// Returns `None` when the entry has neither a message nor an error.
    pub fn format(&self, entry: &LogEntry) -> Option<String> {
        match self.format {
            OutputFormat::Text => self.format_text(entry),
            OutputFormat::Json => self.format_json(entry),
        }
    }

    /// Text line including the indented error block
    pub fn format_text(&self, entry: &LogEntry) -> Option<String> {
        let mut line = self.format_text_line(entry)?;

        if let Some(ref error) = entry.error {
            let block = format!("  {}", error);
            line.push('\n');
            if self.options.use_colors {
                line.push_str(&block.red().to_string());
            } else {
                line.push_str(&block);
            }
        }

        Some(line)
    }

    /// Primary text line only, without any error block
    ///
    /// Used by sinks that render the error themselves.
    pub fn format_text_line(&self, entry: &LogEntry) -> Option<String> {
        if entry.is_suppressed() {
            return None;
        }

        let level_bracket = format!("[{} {}]", entry.level.emoji(), entry.level.label());
        let stamp_bracket = format!(
            "[{}] [{}]",
            self.timestamp(entry),
            self.category(&entry.category)
        );

        let (level_bracket, stamp_bracket) = if self.options.use_colors {
            (
                level_bracket.color(entry.level.color_code()).to_string(),
                stamp_bracket.dimmed().to_string(),
            )
        } else {
            (level_bracket, stamp_bracket)
        };

        let (first, second) = if self.options.timestamp_first {
            (stamp_bracket, level_bracket)
        } else {
            (level_bracket, stamp_bracket)
        };

        let message = entry.message.as_deref().map(sanitize).unwrap_or_default();
        let mut line = format!("{} {} {}", first, second, message);
        if message.is_empty() {
            line.truncate(line.trim_end().len());
        }

        Some(line)
    }

    /// Compact single-line JSON object
    ///
    /// Key order is fixed with `timestamp` first. Non-ASCII text, emoji
    /// included, is written as literal UTF-8 rather than `\u` escapes.
    pub fn format_json(&self, entry: &LogEntry) -> Option<String> {
        if entry.is_suppressed() {
            return None;
        }

        let timestamp = self.timestamp(entry);
        let message = entry.message.as_deref().map(sanitize);
        let record = JsonRecord {
            timestamp: &timestamp,
            level: entry.level.label(),
            emoji: entry.level.emoji(),
            category: self.category(&entry.category),
            message: message.as_deref(),
            event_id: (!entry.event_id.is_empty()).then_some(&entry.event_id),
            exception: entry.error.as_ref().map(JsonException::from),
        };

        match serde_json::to_string(&record) {
            Ok(json) => Some(json),
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to serialize log entry: {}", e);
                None
            }
        }
    }

    fn timestamp(&self, entry: &LogEntry) -> String {
        self.options
            .timestamp_format
            .format(&entry.timestamp, self.options.use_utc)
    }

    fn category<'a>(&self, category: &'a str) -> &'a str {
        if self.options.shorten_categories {
            shorten_category(category)
        } else {
            category
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: &'a str,
    level: &'static str,
    emoji: &'static str,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(rename = "eventId", skip_serializing_if = "Option::is_none")]
    event_id: Option<&'a EventId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<JsonException<'a>>,
}

#[derive(Serialize)]
struct JsonException<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    message: &'a str,
    #[serde(rename = "stackTrace", skip_serializing_if = "Option::is_none")]
    stack_trace: Option<&'a str>,
    #[serde(rename = "innerException", skip_serializing_if = "Option::is_none")]
    inner_exception: Option<String>,
}

impl<'a> From<&'a ErrorDetail> for JsonException<'a> {
    fn from(error: &'a ErrorDetail) -> Self {
        Self {
            kind: &error.kind,
            message: &error.message,
            stack_trace: error.backtrace.as_deref(),
            inner_exception: error.inner(),
        }
    }
}

/// Level carried by a JSON line, if it is one of ours
pub fn level_of_json(line: &str) -> Option<LogLevel> {
    let value: serde_json::Value = serde_json::from_str(line).ok()?;
    let label = value.get("level")?.as_str()?;
    LogLevel::ALL.into_iter().find(|level| level.label() == label)
}
