//! Delivery targets: terminal, rotating files and chat webhooks

pub mod compression;
pub mod console;
pub mod file;
pub mod rotation;
pub mod transport;
pub mod webhook;

pub use compression::{compress_file, CompressionMode};
pub use console::ConsoleSink;
pub use file::{FileSink, FileSinkOptions, FlushPolicy};
pub use rotation::{RollingInterval, RotationState};
#[cfg(feature = "webhook")]
pub use transport::HttpTransport;
pub use transport::{RetryingTransport, WebhookTransport};
pub use webhook::{validate_url, WebhookOptions, WebhookSink};
