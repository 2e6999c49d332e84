//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. The message is
//! only formatted when some sink would accept the level.
//!
//! # Examples
//!
//! ```
//! use litty_logs::prelude::*;
//! use litty_logs::info;
//!
//! let factory = LoggerFactory::builder().build();
//! let logger = factory.logger("My.App");
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use litty_logs::prelude::*;
/// # let factory = LoggerFactory::builder().build();
/// # let logger = factory.logger("App");
/// use litty_logs::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log(level, format!($($arg)+));
        }
    }};
}

/// Log a trace-level message.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use litty_logs::prelude::*;
/// # let factory = LoggerFactory::builder().build();
/// # let logger = factory.logger("App");
/// use litty_logs::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use litty_logs::prelude::*;
/// # let factory = LoggerFactory::builder().build();
/// # let logger = factory.logger("App");
/// use litty_logs::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// # use litty_logs::prelude::*;
/// # let factory = LoggerFactory::builder().build();
/// # let logger = factory.logger("App");
/// use litty_logs::critical;
/// critical!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{FormatOptions, LogLevel, LoggerFactory};
    use crate::sinks::{FileSink, FileSinkOptions};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn written(level: LogLevel, emit: impl FnOnce(&crate::core::Logger)) -> String {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("macros.log");
        let sink = FileSink::new(
            FileSinkOptions::new(&path).with_format(FormatOptions::new().with_rewrite(false)),
        )
        .unwrap();
        let factory = LoggerFactory::builder().min_level(level).sink(sink).build();

        emit(&factory.logger("Macros"));
        factory.shutdown();
        fs::read_to_string(&path).unwrap_or_default()
    }

    #[test]
    fn test_log_macro() {
        let out = written(LogLevel::Info, |logger| {
            log!(logger, LogLevel::Info, "Test message");
            log!(logger, LogLevel::Info, "Formatted: {}", 42);
        });
        assert!(out.contains("[🔥 info]"));
        assert!(out.contains("Formatted: 42"));
    }

    #[test]
    fn test_level_macros() {
        let out = written(LogLevel::Trace, |logger| {
            trace!(logger, "t {}", 1);
            debug!(logger, "d {}", 2);
            info!(logger, "i {}", 3);
            warning!(logger, "w {}", 4);
            error!(logger, "e {}", 5);
            critical!(logger, "c {}", 6);
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("[👀 trace]") && lines[0].ends_with("t 1"));
        assert!(lines[3].starts_with("[😤 warning]") && lines[3].ends_with("w 4"));
        assert!(lines[5].starts_with("[☠️ crit]") && lines[5].ends_with("c 6"));
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        let evaluated = Cell::new(false);
        let out = written(LogLevel::Error, |logger| {
            debug!(logger, "{}", {
                evaluated.set(true);
                "expensive"
            });
            error!(logger, "kept");
        });
        assert!(!evaluated.get());
        assert_eq!(out.lines().count(), 1);
    }
}
