//! File sink with rotation and compression
//!
//! Logging calls only enqueue the formatted line. A dedicated consumer
//! thread owns the file handle and the rotation state; nothing else ever
//! touches them.
//!
//! The first line after start-up is appended to the existing file without
//! a rotation check, so restarting a process never rotates away the file it
//! just opened. Every later line is preceded by a rotation check.

use super::{
    compression::{compress_rotated, CompressionMode},
    rotation::{RollingInterval, RotationState},
};
use crate::core::{
    error::{LoggerError, Result},
    formatter::EntryFormatter,
    log_level::LogLevel,
    metrics::SinkMetrics,
    options::{FormatOptions, OutputFormat},
    overflow_policy::{OverflowCallback, OverflowPolicy},
    queue::{DeliveryQueue, DEFAULT_QUEUE_CAPACITY},
    sink::Sink,
};
use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// When buffered lines are pushed to the OS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// Flush after every line; bounds loss to the line being written
    #[default]
    EveryWrite,

    /// Flush once the queue is momentarily empty, and at rotation and close
    ///
    /// Much higher throughput under bursts, at the cost of losing the
    /// current burst if the process is killed.
    WhenIdle,
}

/// File sink configuration
///
/// # Examples
///
/// ```
/// use litty_logs::sinks::{CompressionMode, FileSinkOptions, RollingInterval};
///
/// let options = FileSinkOptions::new("logs/app.log")
///     .with_rolling_interval(RollingInterval::Daily)
///     .with_max_file_size(10 * 1024 * 1024)
///     .with_compression(CompressionMode::Gzip);
/// assert_eq!(options.queue_capacity, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSinkOptions {
    pub path: PathBuf,
    pub output_format: OutputFormat,
    /// 0 disables size-based rotation
    pub max_file_size_bytes: u64,
    pub rolling_interval: RollingInterval,
    pub compression: CompressionMode,
    pub flush_policy: FlushPolicy,
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    /// Colors are always off in files regardless of this value
    #[serde(flatten)]
    pub format: FormatOptions,
}

impl Default for FileSinkOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/app.log"),
            output_format: OutputFormat::Text,
            max_file_size_bytes: 0,
            rolling_interval: RollingInterval::None,
            compression: CompressionMode::None,
            flush_policy: FlushPolicy::EveryWrite,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::DropOldest,
            format: FormatOptions::default(),
        }
    }
}

impl FileSinkOptions {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_rolling_interval(mut self, interval: RollingInterval) -> Self {
        self.rolling_interval = interval;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, mode: CompressionMode) -> Self {
        self.compression = mode;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.flush_policy = policy;
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

    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() || self.path.file_name().is_none() {
            return Err(LoggerError::config(
                "FileSink",
                format!("'{}' is not a file path", self.path.display()),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "FileSink",
                "queue capacity must be greater than 0",
            ));
        }
        self.format.validate("FileSink")
    }
}

/// Consumer-side state: the open handle, rotation bookkeeping and the
/// compression jobs spawned so far
struct FileWriter {
    rotation: RotationState,
    compression: CompressionMode,
    flush_policy: FlushPolicy,
    writer: Option<BufWriter<File>>,
    first_write: bool,
    compressions: Vec<JoinHandle<()>>,
    metrics: Arc<SinkMetrics>,
}

impl FileWriter {
    fn new(options: &FileSinkOptions, metrics: Arc<SinkMetrics>) -> Self {
        Self {
            rotation: RotationState::new(
                options.path.clone(),
                options.rolling_interval,
                options.max_file_size_bytes,
                options.format.use_utc,
            ),
            compression: options.compression,
            flush_policy: options.flush_policy,
            writer: None,
            first_write: true,
            compressions: Vec::new(),
            metrics,
        }
    }

    fn run(mut self, receiver: Receiver<String>) {
        // recv keeps yielding buffered lines after close, then errors out
        while let Ok(line) = receiver.recv() {
            self.write_line(&line, Utc::now());

            if self.flush_policy == FlushPolicy::WhenIdle && receiver.is_empty() {
                self.flush();
            }
        }
        self.close();
    }

    fn write_line(&mut self, line: &str, now: DateTime<Utc>) {
        let mut rotation_failed = false;

        if self.first_write {
            self.first_write = false;
        } else if self.writer.is_some() && self.rotation.should_rotate(&now) {
            if let Err(e) = self.rotate(&now) {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );
                rotation_failed = true;
            }
        }

        if let Err(e) = self.ensure_writer(&now) {
            eprintln!("[LOGGER ERROR] {}. Dropping log line.", e);
            self.metrics.record_write_failure();
            return;
        }

        if rotation_failed {
            // let the file grow past the limit rather than retry on every line
            self.rotation.reset_size();
        }

        let result = match self.writer.as_mut() {
            Some(writer) => writer.write_all(line.as_bytes()).and_then(|()| writer.write_all(b"\n")),
            None => return,
        };

        match result {
            Ok(()) => {
                self.rotation.record_write(line.len());
                self.metrics.record_written(1);
                if self.flush_policy == FlushPolicy::EveryWrite {
                    self.flush();
                }
            }
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] Failed to write to '{}': {}. Reopening on next write.",
                    self.rotation.active_path().display(),
                    e
                );
                self.metrics.record_write_failure();
                // a half-written handle is not trusted again
                self.writer = None;
            }
        }
    }

    /// Open (or append to) the file for the current bucket if none is open
    fn ensure_writer(&mut self, now: &DateTime<Utc>) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }

        let path = self.rotation.resolve_path(now);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_writer(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let existing_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        self.rotation.opened(path, existing_size, now);
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Close the active file, move it out of the way if needed, and hand
    /// it to a compression thread
    fn rotate(&mut self, now: &DateTime<Utc>) -> Result<()> {
        let closed_path = self.rotation.active_path().to_path_buf();

        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    closed_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let rotated_path = if self.rotation.needs_rename(now) {
            let target = self.rotation.next_rotated_path(now);
            fs::rename(&closed_path, &target).map_err(|e| {
                LoggerError::file_rotation(
                    closed_path.display().to_string(),
                    format!("Failed to rename to '{}': {}", target.display(), e),
                )
            })?;
            target
        } else {
            closed_path
        };

        self.metrics.record_rotation();

        if self.compression == CompressionMode::Gzip {
            self.spawn_compression(rotated_path);
        }

        self.ensure_writer(now)
    }

    fn spawn_compression(&mut self, path: PathBuf) {
        let metrics = Arc::clone(&self.metrics);
        let spawned = thread::Builder::new()
            .name("litty-compress".to_string())
            .spawn(move || match compress_rotated(&path) {
                Ok(_) => {
                    metrics.record_compression();
                }
                Err(e) => {
                    metrics.record_compression_failure();
                    eprintln!(
                        "[LOGGER WARNING] {}. Keeping uncompressed file.",
                        e
                    );
                }
            });

        match spawned {
            Ok(handle) => {
                self.compressions.retain(|h| !h.is_finished());
                self.compressions.push(handle);
            }
            Err(e) => {
                self.metrics.record_compression_failure();
                eprintln!(
                    "[LOGGER WARNING] Could not start compression thread: {}",
                    e
                );
            }
        }
    }

    fn flush(&mut self) {
        if let Some(ref mut writer) = self.writer {
            if let Err(e) = writer.flush() {
                eprintln!(
                    "[LOGGER ERROR] Failed to flush '{}': {}",
                    self.rotation.active_path().display(),
                    e
                );
            }
        }
    }

    fn close(mut self) {
        self.flush();
        drop(self.writer.take());

        for handle in self.compressions.drain(..) {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Compression thread panicked during shutdown");
            }
        }
    }
}

/// Sink writing to a local file, rotated and optionally gzip-compressed
///
/// # Example
///
/// ```no_run
/// use litty_logs::prelude::*;
/// use litty_logs::sinks::{FileSink, FileSinkOptions, RollingInterval};
///
/// let sink = FileSink::new(
///     FileSinkOptions::new("logs/app.log").with_rolling_interval(RollingInterval::Daily),
/// )
/// .unwrap();
///
/// let factory = LoggerFactory::builder().sink(sink).build();
/// factory.logger("My.App").info("Hosting started");
/// factory.shutdown();
/// ```
pub struct FileSink {
    name: String,
    path: PathBuf,
    formatter: EntryFormatter,
    queue: DeliveryQueue<String>,
    worker: Mutex<Option<JoinHandle<()>>>,
    metrics: Arc<SinkMetrics>,
}

impl FileSink {
    /// Validate the options and start the consumer thread
    ///
    /// No file is opened until the first line arrives.
    pub fn new(options: FileSinkOptions) -> Result<Self> {
        options.validate()?;

        let name = format!("file:{}", options.path.display());
        let metrics = Arc::new(SinkMetrics::new());
        let (queue, receiver) = DeliveryQueue::new(
            name.clone(),
            options.queue_capacity,
            options.overflow_policy,
            Arc::clone(&metrics),
        );

        let writer = FileWriter::new(&options, Arc::clone(&metrics));
        let handle = thread::Builder::new()
            .name("litty-file-writer".to_string())
            .spawn(move || writer.run(receiver))
            .map_err(|e| {
                LoggerError::io_operation("start file writer", "Failed to spawn consumer thread", e)
            })?;

        Ok(Self {
            name,
            path: options.path,
            formatter: EntryFormatter::new(
                options.output_format,
                options.format.with_colors(false),
            ),
            queue,
            worker: Mutex::new(Some(handle)),
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

    /// Sink with default options writing to `path`
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(FileSinkOptions::new(path))
    }

    /// Configured base path; with an interval the active file carries a suffix
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines queued but not yet written
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self, _level: LogLevel, _category: &str) -> bool {
        !self.queue.is_closed()
    }

    fn formatter(&self) -> &EntryFormatter {
        &self.formatter
    }

    fn submit(&self, _level: LogLevel, line: String) {
        self.queue.push(line);
    }

    /// Drain every queued line to disk, then close the file
    ///
    /// Unlike network sinks there is no timeout: local disk is expected to
    /// make progress, and a graceful shutdown loses nothing.
    fn shutdown(&self) -> bool {
        self.queue.close();

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        if handle.join().is_err() {
            eprintln!("[LOGGER ERROR] File writer thread panicked during shutdown");
            return false;
        }
        true
    }

    fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogEntry, TimestampFormat};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 22, hour, minute, 0)
            .single()
            .expect("valid datetime")
    }

    fn writer(options: &FileSinkOptions) -> FileWriter {
        FileWriter::new(options, Arc::new(SinkMetrics::new()))
    }

    #[test]
    fn test_first_write_never_rotates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "x".repeat(500)).unwrap();

        let options = FileSinkOptions::new(&path).with_max_file_size(100);
        let mut writer = writer(&options);
        writer.write_line("after restart", at(9, 0));
        writer.close();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("after restart\n"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_second_write_rotates_oversized_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "x".repeat(500)).unwrap();

        let options = FileSinkOptions::new(&path).with_max_file_size(100);
        let mut writer = writer(&options);
        writer.write_line("one", at(9, 0));
        writer.write_line("two", at(9, 0));
        let metrics = Arc::clone(&writer.metrics);
        writer.close();

        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");
        let rotated = fs::read_to_string(dir.path().join("app-20260222-090000-1.log")).unwrap();
        assert!(rotated.ends_with("one\n"));
        assert_eq!(metrics.rotations(), 1);
    }

    #[test]
    fn test_hourly_bucket_change_opens_new_file() {
        let dir = TempDir::new().unwrap();
        let options = FileSinkOptions::new(dir.path().join("app.log"))
            .with_rolling_interval(RollingInterval::Hourly);
        let mut writer = writer(&options);

        writer.write_line("nine", at(9, 59));
        writer.write_line("ten", at(10, 0));
        let metrics = Arc::clone(&writer.metrics);
        writer.close();

        assert_eq!(
            fs::read_to_string(dir.path().join("app-20260222-09.log")).unwrap(),
            "nine\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("app-20260222-10.log")).unwrap(),
            "ten\n"
        );
        assert_eq!(metrics.rotations(), 1);
    }

    #[test]
    fn test_size_rotation_inside_bucket_renames_active_file() {
        let dir = TempDir::new().unwrap();
        let options = FileSinkOptions::new(dir.path().join("app.log"))
            .with_rolling_interval(RollingInterval::Daily)
            .with_max_file_size(10)
            .with_compression(CompressionMode::Gzip);
        let mut writer = writer(&options);

        writer.write_line("0123456789", at(9, 0));
        writer.write_line("next", at(9, 1));
        writer.close();

        // the active daily file was renamed before compression, never compressed in place
        let active = dir.path().join("app-20260222.log");
        assert_eq!(fs::read_to_string(&active).unwrap(), "next\n");
        assert!(!dir.path().join("app-20260222.log.gz").exists());
        assert!(dir.path().join("app-20260222-090100-1.log.gz").exists());
    }

    #[test]
    fn test_gzip_after_bucket_change() {
        let dir = TempDir::new().unwrap();
        let options = FileSinkOptions::new(dir.path().join("app.log"))
            .with_rolling_interval(RollingInterval::Hourly)
            .with_compression(CompressionMode::Gzip);
        let mut writer = writer(&options);

        writer.write_line("nine", at(9, 30));
        writer.write_line("ten", at(10, 30));
        let metrics = Arc::clone(&writer.metrics);
        writer.close();

        assert!(dir.path().join("app-20260222-09.log.gz").exists());
        assert!(!dir.path().join("app-20260222-09.log").exists());
        assert!(dir.path().join("app-20260222-10.log").exists());
        assert_eq!(metrics.compressions(), 1);
    }

    #[test]
    fn test_write_failure_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        let options = FileSinkOptions::new(&path);
        let mut writer = writer(&options);

        writer.write_line("one", at(9, 0));
        // simulate a broken handle
        writer.writer = None;
        writer.write_line("two", at(9, 0));
        writer.close();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_invalid_options_are_configuration_errors() {
        let err = FileSink::new(FileSinkOptions::new("")).err().unwrap();
        assert!(err.is_configuration());

        let dir = TempDir::new().unwrap();
        let err = FileSink::new(FileSinkOptions::new(dir.path().join("a.log")).with_queue_capacity(0))
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_invalid_timestamp_format_fails_at_registration() {
        let dir = TempDir::new().unwrap();
        let format = FormatOptions::new().with_timestamp_format(TimestampFormat::Custom("%Q".into()));
        let err = FileSink::new(FileSinkOptions::new(dir.path().join("a.log")).with_format(format))
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert!(!dir.path().join("a.log").exists());
    }

    #[test]
    fn test_overflow_callback_reaches_the_queue() {
        let dir = TempDir::new().unwrap();
        let alerts = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let seen = Arc::clone(&alerts);
        let sink = FileSink::new(
            FileSinkOptions::new(dir.path().join("app.log"))
                .with_queue_capacity(1)
                .with_overflow_policy(OverflowPolicy::DropNewest),
        )
        .unwrap()
        .with_overflow_callback(Arc::new(move |_dropped: u64| {
            seen.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }));

        // the consumer may take one line off the queue while these are pushed
        for i in 0..1_000 {
            sink.submit(LogLevel::Info, format!("line {i}"));
        }
        assert!(sink.shutdown());
        assert!(sink.metrics().dropped_overflow() > 0);
        assert!(alerts.load(std::sync::atomic::Ordering::Relaxed) >= 1);
    }

    #[test]
    fn test_sink_creates_parent_directories_lazily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("app.log");
        let sink = FileSink::new(FileSinkOptions::new(&path)).unwrap();
        assert!(!path.exists());

        let entry = LogEntry::new(LogLevel::Info, "App", "hello");
        let line = sink.render(&entry).unwrap();
        sink.submit(LogLevel::Info, line);
        assert!(sink.shutdown());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[🔥 info] "));
        assert!(!content.contains('\u{1b}'));
        assert!(!content.starts_with('\u{feff}'));
    }

    #[test]
    fn test_submit_after_shutdown_is_counted() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::new(FileSinkOptions::new(dir.path().join("app.log"))).unwrap();
        assert!(sink.shutdown());
        assert!(!sink.is_enabled(LogLevel::Critical, "App"));

        sink.submit(LogLevel::Info, "late".to_string());
        assert_eq!(sink.metrics().dropped_closed(), 1);
        assert!(sink.shutdown());
    }
}
