//! Sink trait for log delivery targets

use super::{
    formatter::EntryFormatter, log_entry::LogEntry, log_level::LogLevel, metrics::SinkMetrics,
};

/// A delivery target fed by the logger façade
///
/// All methods take `&self`: a sink is shared by every logger handed out
/// by a factory. `submit` must not block on I/O; queued sinks hand the
/// line to their background consumer and return.
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    /// Whether entries of this level and category reach this sink
    fn is_enabled(&self, level: LogLevel, category: &str) -> bool;

    fn formatter(&self) -> &EntryFormatter;

    /// Turn an entry into the line this sink delivers
    ///
    /// `None` suppresses the entry.
    fn render(&self, entry: &LogEntry) -> Option<String> {
        self.formatter().format(entry)
    }

    /// Hand a rendered line to the sink
    ///
    /// `level` is the level of the entry the line was rendered from.
    fn submit(&self, level: LogLevel, line: String);

    /// Stop the sink, delivering what is still queued
    ///
    /// Returns `false` if outstanding work had to be abandoned. Calling it
    /// again after the first time is a no-op returning `true`.
    fn shutdown(&self) -> bool;

    fn metrics(&self) -> &SinkMetrics;
}
