//! # litty_logs
//!
//! Asynchronous log delivery with a lot of personality.
//!
//! ## Features
//!
//! - **Emoji-forward formatting**: `[🔥 info] [timestamp] [category] message`,
//!   as colored text or single-line JSON
//! - **Message rewrites**: well-known framework lifecycle messages get an
//!   embellished makeover
//! - **Non-blocking sinks**: file and webhook sinks enqueue and return; a
//!   background consumer does the I/O
//! - **File rotation**: daily, hourly and size-based, with gzip compression
//!   of rotated files
//! - **Chat webhooks**: batched delivery to Matrix (hookshot) and Microsoft
//!   Teams (Adaptive Cards)
//!
//! ## Example
//!
//! ```no_run
//! use litty_logs::prelude::*;
//!
//! let factory = LoggerFactory::builder()
//!     .sink(ConsoleSink::new())
//!     .try_sink(|| FileSink::new(FileSinkOptions::new("logs/app.log")))
//!     .unwrap()
//!     .build();
//!
//! let logger = factory.logger("My.App.Lifetime");
//! litty_logs::info!(logger, "Now listening on: {}", "http://localhost:5000");
//! factory.shutdown();
//! ```

pub mod core;
pub mod macros;
pub mod payload;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        ErrorDetail, EventId, FormatOptions, LogEntry, LogLevel, Logger, LoggerError,
        LoggerFactory, LoggerFactoryBuilder, OutputFormat, OverflowPolicy, Result, Sink,
        SinkMetrics, TimestampFormat,
    };
    pub use crate::payload::WebhookPlatform;
    pub use crate::sinks::{
        CompressionMode, ConsoleSink, FileSink, FileSinkOptions, FlushPolicy, RollingInterval,
        WebhookOptions, WebhookSink,
    };
}

pub use crate::core::{
    EntryFormatter, ErrorDetail, EventId, FormatOptions, LogEntry, LogLevel, Logger, LoggerError,
    LoggerFactory, LoggerFactoryBuilder, OutputFormat, OverflowCallback, OverflowPolicy, Result,
    Sink, SinkMetrics, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::payload::WebhookPlatform;
pub use crate::sinks::{ConsoleSink, FileSink, FileSinkOptions, WebhookOptions, WebhookSink};
