//! Webhook sink posting batched lines to a chat platform
//!
//! Logging calls enqueue the formatted line and return. A consumer thread
//! groups lines into batches, closing a batch when it reaches
//! `batch_size` or when `batch_interval` has passed since its first line,
//! and posts each batch as one request. A failed request loses that batch
//! only; delivery continues with the next one.

use super::transport::{RetryingTransport, WebhookTransport};
use crate::core::{
    error::{LoggerError, Result},
    formatter::EntryFormatter,
    log_entry::LogEntry,
    log_level::LogLevel,
    logger::DEFAULT_SHUTDOWN_TIMEOUT,
    metrics::SinkMetrics,
    options::{duration_millis, FormatOptions, OutputFormat},
    overflow_policy::{OverflowCallback, OverflowPolicy},
    queue::{DeliveryQueue, DEFAULT_QUEUE_CAPACITY},
    sink::Sink,
};
use crate::payload::{self, PayloadFormatter, WebhookPlatform};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use url::Url;

/// Crates whose categories are never delivered to a webhook
///
/// The HTTP stack logs about the very requests this sink makes; letting
/// those entries through would feed every post back into the queue.
/// A category matches when it is the crate name itself or continues it
/// with `::`, `_` or `.`.
const GUARDED_CATEGORIES: &[&str] = &["reqwest", "hyper", "h2", "rustls", module_path!()];

const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Webhook sink configuration
///
/// # Examples
///
/// ```
/// use litty_logs::sinks::WebhookOptions;
/// use litty_logs::payload::WebhookPlatform;
/// use std::time::Duration;
///
/// let options = WebhookOptions::new("https://hookshot.example.org/webhook/abc")
///     .with_platform(WebhookPlatform::Teams)
///     .with_batch_interval(Duration::from_millis(500));
/// assert_eq!(options.batch_size, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookOptions {
    pub url: String,
    pub platform: WebhookPlatform,
    pub output_format: OutputFormat,
    pub min_level: LogLevel,
    pub username: String,
    pub batch_size: usize,
    #[serde(with = "duration_millis")]
    pub batch_interval: Duration,
    #[serde(with = "duration_millis")]
    pub shutdown_timeout: Duration,
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
    /// Extra attempts for a request that failed transiently; 0 disables retries
    pub max_retries: u32,
    #[serde(with = "duration_millis")]
    pub initial_retry_delay: Duration,
    #[serde(with = "duration_millis")]
    pub max_retry_delay: Duration,
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    /// Colors are always off for webhooks regardless of this value
    #[serde(flatten)]
    pub format: FormatOptions,
}

impl Default for WebhookOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            platform: WebhookPlatform::Matrix,
            output_format: OutputFormat::Text,
            min_level: LogLevel::Warning,
            username: "LittyLogs".to_string(),
            batch_size: 10,
            batch_interval: Duration::from_secs(2),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(5),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::DropOldest,
            format: FormatOptions::default(),
        }
    }
}

impl WebhookOptions {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_platform(mut self, platform: WebhookPlatform) -> Self {
        self.platform = platform;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_batch_interval(mut self, interval: Duration) -> Self {
        self.batch_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before the first retry, and the cap the doubling delay stops at
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_retry_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_retry_delay = initial;
        self.max_retry_delay = max;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Check everything that can be checked without a network round trip
    fn validate(&self) -> Result<Url> {
        let url = validate_url(&self.url)?;
        if self.batch_size == 0 {
            return Err(LoggerError::config(
                "WebhookSink",
                "batch size must be greater than 0",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "WebhookSink",
                "queue capacity must be greater than 0",
            ));
        }
        self.format.validate("WebhookSink")?;
        Ok(url)
    }
}

/// Parse a webhook URL, accepting only absolute `http`/`https` URLs
///
/// # Examples
///
/// ```
/// use litty_logs::sinks::validate_url;
///
/// assert!(validate_url("https://matrix.example.org/webhook/abc").is_ok());
/// assert!(validate_url("file:///etc/passwd").is_err());
/// assert!(validate_url("  ").is_err());
/// ```
pub fn validate_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LoggerError::webhook_url(raw, "URL must not be empty"));
    }

    let url = Url::parse(trimmed).map_err(|e| LoggerError::webhook_url(raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoggerError::webhook_url(
            raw,
            format!("scheme '{}' is not allowed, use http or https", url.scheme()),
        ));
    }
    if !url.has_host() {
        return Err(LoggerError::webhook_url(raw, "URL has no host"));
    }
    Ok(url)
}

fn is_guarded(category: &str) -> bool {
    GUARDED_CATEGORIES.iter().any(|name| {
        category.strip_prefix(name).is_some_and(|rest| {
            rest.is_empty() || rest.starts_with("::") || rest.starts_with(['_', '.'])
        })
    })
}

/// Consumer-side state: batching and posting
struct WebhookWriter {
    url: Url,
    username: String,
    batch_size: usize,
    batch_interval: Duration,
    payload: Box<dyn PayloadFormatter>,
    transport: Arc<dyn WebhookTransport>,
    cancelled: Arc<AtomicBool>,
    metrics: Arc<SinkMetrics>,
}

impl WebhookWriter {
    fn run(self, receiver: Receiver<String>) {
        let mut batch = Vec::with_capacity(self.batch_size);

        // recv keeps yielding buffered lines after close, then errors out
        while let Ok(first) = receiver.recv() {
            batch.push(first);
            let deadline = Instant::now() + self.batch_interval;

            while batch.len() < self.batch_size {
                match receiver.recv_deadline(deadline) {
                    Ok(line) => batch.push(line),
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            if self.cancelled.load(Ordering::Acquire) {
                self.abandon(batch.len() + receiver.len());
                return;
            }

            self.send(&batch);
            batch.clear();
        }
    }

    fn send(&self, batch: &[String]) {
        let result = self
            .payload
            .format_payload(batch, &self.username)
            .and_then(|body| self.transport.post_json(&self.url, body));

        match result {
            Ok(()) => {
                self.metrics.record_batch_sent();
                self.metrics.record_written(batch.len() as u64);
            }
            Err(e) => {
                self.metrics.record_batch_failed();
                eprintln!(
                    "[LOGGER WARNING] Webhook delivery to {} failed: {}. Dropped {} message(s).",
                    self.payload.platform(),
                    e,
                    batch.len()
                );
            }
        }
    }

    fn abandon(&self, count: usize) {
        for _ in 0..count {
            self.metrics.record_dropped_closed();
        }
        if count > 0 {
            eprintln!(
                "[LOGGER WARNING] Webhook writer cancelled, {} message(s) not delivered",
                count
            );
        }
    }
}

/// Sink posting batches of lines to a Matrix or Teams webhook
///
/// # Example
///
/// ```no_run
/// use litty_logs::prelude::*;
/// use litty_logs::sinks::{WebhookOptions, WebhookSink};
///
/// let factory = LoggerFactory::builder()
///     .try_sink(|| WebhookSink::new(WebhookOptions::new("https://hookshot.example.org/webhook/abc")))
///     .unwrap()
///     .build();
///
/// factory.logger("Payments").error("card declined");
/// factory.shutdown();
/// ```
pub struct WebhookSink {
    name: String,
    min_level: LogLevel,
    shutdown_timeout: Duration,
    formatter: EntryFormatter,
    queue: DeliveryQueue<String>,
    worker: Mutex<Option<JoinHandle<()>>>,
    cancelled: Arc<AtomicBool>,
    metrics: Arc<SinkMetrics>,
}

impl WebhookSink {
    /// Validate the options and start the consumer with an HTTP transport
    ///
    /// Requests failing transiently are retried as `max_retries` and the
    /// retry delays describe.
    #[cfg(feature = "webhook")]
    pub fn new(options: WebhookOptions) -> Result<Self> {
        options.validate()?;
        let http = super::transport::HttpTransport::new(options.request_timeout)?;
        let transport = RetryingTransport::new(http)
            .with_max_retries(options.max_retries)
            .with_delays(options.initial_retry_delay, options.max_retry_delay);
        Self::with_transport(options, Arc::new(transport))
    }

    /// Validate the options and start the consumer with a caller-supplied transport
    ///
    /// The transport is used as given; wrap it in a [`RetryingTransport`]
    /// to retry failed requests.
    pub fn with_transport(
        options: WebhookOptions,
        transport: Arc<dyn WebhookTransport>,
    ) -> Result<Self> {
        let url = options.validate()?;

        let name = format!("webhook:{}", options.platform);
        let metrics = Arc::new(SinkMetrics::new());
        let cancelled = Arc::new(AtomicBool::new(false));
        let (queue, receiver) = DeliveryQueue::new(
            name.clone(),
            options.queue_capacity,
            options.overflow_policy,
            Arc::clone(&metrics),
        );

        let writer = WebhookWriter {
            url,
            username: options.username.clone(),
            batch_size: options.batch_size,
            batch_interval: options.batch_interval,
            payload: payload::for_platform(options.platform),
            transport,
            cancelled: Arc::clone(&cancelled),
            metrics: Arc::clone(&metrics),
        };
        let handle = thread::Builder::new()
            .name("litty-webhook-writer".to_string())
            .spawn(move || writer.run(receiver))
            .map_err(|e| {
                LoggerError::io_operation(
                    "start webhook writer",
                    "Failed to spawn consumer thread",
                    e,
                )
            })?;

        Ok(Self {
            name,
            min_level: options.min_level,
            shutdown_timeout: options.shutdown_timeout,
            formatter: EntryFormatter::new(
                options.output_format,
                options.format.with_colors(false),
            ),
            queue,
            worker: Mutex::new(Some(handle)),
            cancelled,
            metrics,
        })
    }

    /// Call `callback` with the running drop count when the queue overflows
    ///
    /// Fires on the first dropped line and on every thousandth after it.
    #[must_use = "builder methods return a new value"]
    pub fn with_overflow_callback(mut self, callback: OverflowCallback) -> Self {
        self.queue.set_overflow_callback(callback);
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Lines queued but not yet batched
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Sink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self, level: LogLevel, category: &str) -> bool {
        level >= self.min_level && !is_guarded(category) && !self.queue.is_closed()
    }

    fn formatter(&self) -> &EntryFormatter {
        &self.formatter
    }

    /// Text lines carry their error as a fenced block instead of the
    /// indented one used on terminals and in files
    fn render(&self, entry: &LogEntry) -> Option<String> {
        if self.formatter.output_format() == OutputFormat::Json {
            return self.formatter.format_json(entry);
        }

        let mut line = self.formatter.format_text_line(entry)?;
        if let Some(ref error) = entry.error {
            line.push_str("\n```\n");
            line.push_str(&error.to_string());
            line.push_str("\n```");
        }
        Some(line)
    }

    fn submit(&self, _level: LogLevel, line: String) {
        self.queue.push(line);
    }

    /// Deliver what is queued, waiting at most `shutdown_timeout`
    ///
    /// On timeout the consumer is told to stop after its current request
    /// and left to finish on its own; `false` is returned.
    fn shutdown(&self) -> bool {
        self.queue.close();

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let deadline = Instant::now() + self.shutdown_timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.cancelled.store(true, Ordering::Release);
                eprintln!(
                    "[LOGGER WARNING] {} did not drain within {:?}, abandoning remaining messages",
                    self.name, self.shutdown_timeout
                );
                return false;
            }
            thread::sleep(SHUTDOWN_POLL);
        }

        if handle.join().is_err() {
            eprintln!("[LOGGER ERROR] Webhook writer thread panicked during shutdown");
            return false;
        }
        true
    }

    fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}

impl Drop for WebhookSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}
