//! Core logger types and traits

pub mod error;
pub mod formatter;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod options;
pub mod overflow_policy;
pub mod queue;
pub mod rewrite;
pub mod sink;
pub mod timestamp;

pub use error::{LoggerError, Result};
pub use formatter::{sanitize, shorten_category, EntryFormatter};
pub use log_entry::{ErrorDetail, EventId, LogEntry};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerFactory, LoggerFactoryBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::SinkMetrics;
pub use options::{FormatOptions, OutputFormat};
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use queue::{DeliveryQueue, DEFAULT_QUEUE_CAPACITY};
pub use sink::Sink;
pub use timestamp::TimestampFormat;
