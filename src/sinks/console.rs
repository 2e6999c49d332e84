//! Console sink implementation

use crate::core::{
    error::Result,
    formatter::EntryFormatter,
    log_level::LogLevel,
    metrics::SinkMetrics,
    options::{FormatOptions, OutputFormat},
    sink::Sink,
};
use std::io::Write;

/// Synchronous sink writing to the terminal
///
/// Colored text by default. Error and Critical lines go to stderr,
/// everything else to stdout. There is no queue: each line is written on
/// the calling thread.
pub struct ConsoleSink {
    formatter: EntryFormatter,
    min_level: LogLevel,
    metrics: SinkMetrics,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            formatter: EntryFormatter::new(OutputFormat::Text, FormatOptions::default()),
            min_level: LogLevel::Trace,
            metrics: SinkMetrics::new(),
        }
    }

    /// Replace the formatting options
    ///
    /// # Example
    ///
    /// ```
    /// use litty_logs::core::FormatOptions;
    /// use litty_logs::sinks::ConsoleSink;
    ///
    /// let sink = ConsoleSink::new()
    ///     .with_options(FormatOptions::new().with_timestamp_first(true));
    /// ```
    #[must_use]
    pub fn with_options(self, options: FormatOptions) -> Self {
        Self {
            formatter: EntryFormatter::new(self.formatter.output_format(), options),
            ..self
        }
    }

    /// Replace the formatting options, rejecting ones that cannot render
    ///
    /// # Example
    ///
    /// ```
    /// use litty_logs::core::{FormatOptions, TimestampFormat};
    /// use litty_logs::sinks::ConsoleSink;
    ///
    /// let bad = FormatOptions::new().with_timestamp_format(TimestampFormat::Custom("%Q".into()));
    /// assert!(ConsoleSink::new().try_with_options(bad).is_err());
    /// ```
    pub fn try_with_options(self, options: FormatOptions) -> Result<Self> {
        options.validate("ConsoleSink")?;
        Ok(self.with_options(options))
    }

    /// Set the output format for this sink
    ///
    /// # Example
    ///
    /// ```
    /// use litty_logs::core::OutputFormat;
    /// use litty_logs::sinks::ConsoleSink;
    ///
    /// let sink = ConsoleSink::new().with_output_format(OutputFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(self, format: OutputFormat) -> Self {
        Self {
            formatter: EntryFormatter::new(format, self.formatter.options().clone()),
            ..self
        }
    }

    /// Only print entries at or above `level`
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn is_enabled(&self, level: LogLevel, _category: &str) -> bool {
        level >= self.min_level
    }

    fn formatter(&self) -> &EntryFormatter {
        &self.formatter
    }

    fn submit(&self, level: LogLevel, line: String) {
        let result = if level >= LogLevel::Error {
            writeln!(std::io::stderr().lock(), "{}", line)
        } else {
            writeln!(std::io::stdout().lock(), "{}", line)
        };

        match result {
            Ok(()) => {
                self.metrics.record_written(1);
            }
            Err(_) => {
                self.metrics.record_write_failure();
            }
        }
    }

    fn shutdown(&self) -> bool {
        let stdout = std::io::stdout().flush();
        let stderr = std::io::stderr().flush();
        stdout.is_ok() && stderr.is_ok()
    }

    fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}
