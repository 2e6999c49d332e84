//! Logger façade
//!
//! A [`LoggerFactory`] owns the registered sinks; every [`Logger`] it hands
//! out is a cheap per-category handle over the same sinks. Logging calls
//! filter, rewrite, format and enqueue, and never block on I/O, panic, or
//! report delivery failures to the caller.

use super::{
    error::Result,
    log_entry::{ErrorDetail, EventId, LogEntry},
    log_level::LogLevel,
    rewrite,
    sink::Sink,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default grace period for draining a network sink on shutdown (5 seconds)
///
/// File sinks always drain completely; network sinks give up after this
/// long so a dead endpoint cannot hang the process.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct Shared {
    sinks: Vec<Arc<dyn Sink>>,
    min_level: RwLock<LogLevel>,
}

impl Shared {
    fn dispatch(&self, entry: LogEntry) {
        if entry.is_suppressed() || entry.level < *self.min_level.read() {
            return;
        }

        let mut rewritten: Option<LogEntry> = None;

        for sink in &self.sinks {
            if !sink.is_enabled(entry.level, &entry.category) {
                continue;
            }

            let target: &LogEntry = if sink.formatter().options().rewrite_messages {
                rewritten.get_or_insert_with(|| rewrite_entry(&entry))
            } else {
                &entry
            };

            // Per-sink panic isolation: one broken sink must not take the
            // caller or the other sinks down with it
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                if let Some(line) = sink.render(target) {
                    sink.submit(target.level, line);
                }
            }));

            if let Err(panic_info) = result {
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' panicked: {}. Other sinks continue to function.",
                    sink.name(),
                    panic_message(&*panic_info)
                );
            }
        }
    }

    fn is_enabled(&self, level: LogLevel, category: &str) -> bool {
        level >= *self.min_level.read()
            && self.sinks.iter().any(|sink| sink.is_enabled(level, category))
    }
}

fn rewrite_entry(entry: &LogEntry) -> LogEntry {
    let mut rewritten = entry.clone();
    if let Some(message) = entry.message.as_deref().and_then(rewrite::try_rewrite) {
        rewritten.message = Some(message);
    }
    rewritten
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Owner of the registered sinks
///
/// Dropping the factory shuts every sink down, draining queued entries.
///
/// # Example
/// ```
/// use litty_logs::prelude::*;
///
/// let factory = LoggerFactory::builder()
///     .min_level(LogLevel::Debug)
///     .sink(ConsoleSink::new().with_options(FormatOptions::new().with_colors(false)))
///     .build();
///
/// let logger = factory.logger("My.App.Worker");
/// logger.info("Now listening on: http://localhost:5000");
/// ```
pub struct LoggerFactory {
    shared: Arc<Shared>,
    shut_down: AtomicBool,
}

impl LoggerFactory {
    pub fn builder() -> LoggerFactoryBuilder {
        LoggerFactoryBuilder::new()
    }

    /// A logger bound to one category
    pub fn logger(&self, category: impl Into<String>) -> Logger {
        let category: String = category.into();
        Logger {
            category: Arc::from(category),
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.shared.min_level.write() = level;
    }

    pub fn min_level(&self) -> LogLevel {
        *self.shared.min_level.read()
    }

    pub fn sinks(&self) -> impl Iterator<Item = &Arc<dyn Sink>> {
        self.shared.sinks.iter()
    }

    /// Shut down every sink, delivering what is still queued
    ///
    /// Returns `true` if every sink finished cleanly. Loggers that outlive
    /// the shutdown stay usable; queued sinks report themselves disabled
    /// and the entries are discarded.
    pub fn shutdown(&self) -> bool {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return true;
        }

        let mut clean = true;
        for sink in &self.shared.sinks {
            if !sink.shutdown() {
                eprintln!(
                    "[LOGGER WARNING] Sink '{}' did not shut down cleanly. Some logs may be lost.",
                    sink.name()
                );
                clean = false;
            }

            let dropped = sink.metrics().total_dropped();
            if dropped > 0 {
                eprintln!(
                    "[LOGGER WARNING] Sink '{}' shutting down with {} dropped logs (drop rate: {:.2}%)",
                    sink.name(),
                    dropped,
                    sink.metrics().drop_rate()
                );
            }
        }
        clean
    }
}

impl Drop for LoggerFactory {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Per-category logging handle
///
/// Cloning is cheap; clones share the factory's sinks.
#[derive(Clone)]
pub struct Logger {
    category: Arc<str>,
    shared: Arc<Shared>,
}

impl Logger {
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether an entry at `level` would reach any sink
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.shared.is_enabled(level, &self.category)
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_entry(LogEntry::new(level, &*self.category, message));
    }

    /// Log a message with an attached error and its cause chain
    pub fn log_error<E>(&self, level: LogLevel, message: impl Into<String>, error: &E)
    where
        E: std::error::Error + ?Sized + 'static,
    {
        let entry = LogEntry::new(level, &*self.category, message)
            .with_error(ErrorDetail::from_error(error));
        self.log_entry(entry);
    }

    pub fn log_event(&self, level: LogLevel, event_id: EventId, message: impl Into<String>) {
        let entry = LogEntry::new(level, &*self.category, message).with_event_id(event_id);
        self.log_entry(entry);
    }

    /// Log a fully built entry
    ///
    /// The entry keeps its own category.
    pub fn log_entry(&self, entry: LogEntry) {
        self.shared.dispatch(entry);
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .field("sinks", &self.shared.sinks.len())
            .finish()
    }
}

/// Builder for constructing a [`LoggerFactory`] with a fluent API
pub struct LoggerFactoryBuilder {
    min_level: LogLevel,
    sinks: Vec<Arc<dyn Sink>>,
}

impl LoggerFactoryBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            sinks: Vec::new(),
        }
    }

    /// Set minimum log level for every sink
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Register a sink
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Register a sink that the caller also keeps a handle to
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Register a sink whose construction may fail validation
    ///
    /// Configuration errors surface here, before any logging happens.
    pub fn try_sink<S, F>(self, make: F) -> Result<Self>
    where
        S: Sink + 'static,
        F: FnOnce() -> Result<S>,
    {
        Ok(self.sink(make()?))
    }

    pub fn build(self) -> LoggerFactory {
        LoggerFactory {
            shared: Arc::new(Shared {
                sinks: self.sinks,
                min_level: RwLock::new(self.min_level),
            }),
            shut_down: AtomicBool::new(false),
        }
    }
}

impl Default for LoggerFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntryFormatter, FormatOptions, OutputFormat, SinkMetrics};
    use parking_lot::Mutex;

    struct MemorySink {
        formatter: EntryFormatter,
        lines: Mutex<Vec<String>>,
        min_level: LogLevel,
        shutdowns: Mutex<u32>,
        metrics: SinkMetrics,
    }

    impl MemorySink {
        fn new(options: FormatOptions) -> Arc<Self> {
            Arc::new(Self {
                formatter: EntryFormatter::new(OutputFormat::Text, options.with_colors(false)),
                lines: Mutex::new(Vec::new()),
                min_level: LogLevel::Trace,
                shutdowns: Mutex::new(0),
                metrics: SinkMetrics::new(),
            })
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }
    }

    impl Sink for MemorySink {
        fn name(&self) -> &str {
            "memory"
        }

        fn is_enabled(&self, level: LogLevel, _category: &str) -> bool {
            level >= self.min_level
        }

        fn formatter(&self) -> &EntryFormatter {
            &self.formatter
        }

        fn submit(&self, _level: LogLevel, line: String) {
            self.lines.lock().push(line);
        }

        fn shutdown(&self) -> bool {
            *self.shutdowns.lock() += 1;
            true
        }

        fn metrics(&self) -> &SinkMetrics {
            &self.metrics
        }
    }

    struct PanickingSink(EntryFormatter, SinkMetrics);

    impl Sink for PanickingSink {
        fn name(&self) -> &str {
            "panicking"
        }
        fn is_enabled(&self, _: LogLevel, _: &str) -> bool {
            true
        }
        fn formatter(&self) -> &EntryFormatter {
            &self.0
        }
        fn submit(&self, _level: LogLevel, _line: String) {
            panic!("sink exploded");
        }
        fn shutdown(&self) -> bool {
            true
        }
        fn metrics(&self) -> &SinkMetrics {
            &self.1
        }
    }

    #[test]
    fn test_min_level_filters() {
        let sink = MemorySink::new(FormatOptions::new());
        let factory = LoggerFactory::builder()
            .min_level(LogLevel::Warning)
            .shared_sink(sink.clone())
            .build();
        let logger = factory.logger("App");

        logger.info("skipped");
        logger.warning("kept");
        assert!(!logger.is_enabled(LogLevel::Info));
        assert!(logger.is_enabled(LogLevel::Error));

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("kept"));
    }

    #[test]
    fn test_rewrite_applied_per_sink() {
        let rewriting = MemorySink::new(FormatOptions::new());
        let verbatim = MemorySink::new(FormatOptions::new().with_rewrite(false));
        let factory = LoggerFactory::builder()
            .shared_sink(rewriting.clone())
            .shared_sink(verbatim.clone())
            .build();

        factory
            .logger("Microsoft.Hosting.Lifetime")
            .info("Hosting environment: Production");

        assert!(rewriting.lines()[0].ends_with("we in our Production era rn ✨"));
        assert!(verbatim.lines()[0].ends_with("Hosting environment: Production"));
    }

    #[test]
    fn test_error_attached() {
        let sink = MemorySink::new(FormatOptions::new());
        let factory = LoggerFactory::builder().shared_sink(sink.clone()).build();
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing");

        factory
            .logger("App")
            .log_error(LogLevel::Error, "boot failed", &err);

        let line = &sink.lines()[0];
        assert_eq!(line.lines().count(), 2);
        assert!(line.contains("config.toml missing"));
    }

    #[test]
    fn test_panicking_sink_is_isolated() {
        let sink = MemorySink::new(FormatOptions::new());
        let factory = LoggerFactory::builder()
            .sink(PanickingSink(EntryFormatter::default(), SinkMetrics::new()))
            .shared_sink(sink.clone())
            .build();

        factory.logger("App").error("still delivered");
        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn test_shutdown_once() {
        let sink = MemorySink::new(FormatOptions::new());
        let factory = LoggerFactory::builder().shared_sink(sink.clone()).build();

        assert!(factory.shutdown());
        assert!(factory.shutdown());
        drop(factory);
        assert_eq!(*sink.shutdowns.lock(), 1);
    }

    #[test]
    fn test_try_sink_surfaces_configuration_errors() {
        let result = LoggerFactory::builder().try_sink(|| -> Result<PanickingSink> {
            Err(crate::core::LoggerError::config("test", "nope"))
        });
        assert!(matches!(result, Err(ref e) if e.is_configuration()));
    }
}
