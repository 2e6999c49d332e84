//! Sink metrics for observability
//!
//! Every condition the delivery engine reports on stderr also bumps a
//! counter here, so overflow, write failures and dropped batches can be
//! watched without scraping the side channel.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one sink
///
/// # Example
///
/// ```
/// use litty_logs::SinkMetrics;
///
/// let metrics = SinkMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_enqueued();
/// metrics.record_dropped_overflow();
///
/// assert_eq!(metrics.enqueued(), 2);
/// assert_eq!(metrics.dropped_overflow(), 1);
/// ```
#[derive(Debug)]
pub struct SinkMetrics {
    /// Items accepted into the delivery queue
    enqueued: AtomicU64,

    /// Items evicted or rejected because the queue was full
    dropped_overflow: AtomicU64,

    /// Items offered after the sink was shut down
    dropped_closed: AtomicU64,

    /// Lines written to disk, or messages delivered in a successful batch
    written: AtomicU64,

    /// Lines lost to a failed write
    write_failures: AtomicU64,

    batches_sent: AtomicU64,
    batches_failed: AtomicU64,
    rotations: AtomicU64,
    compressions: AtomicU64,
    compression_failures: AtomicU64,
}

impl SinkMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dropped_overflow: AtomicU64::new(0),
            dropped_closed: AtomicU64::new(0),
            written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            batches_sent: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            compressions: AtomicU64::new(0),
            compression_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_overflow(&self) -> u64 {
        self.dropped_overflow.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_closed(&self) -> u64 {
        self.dropped_closed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_sent(&self) -> u64 {
        self.batches_sent.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn batches_failed(&self) -> u64 {
        self.batches_failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn compressions(&self) -> u64 {
        self.compressions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn compression_failures(&self) -> u64 {
        self.compression_failures.load(Ordering::Relaxed)
    }

    /// Record an accepted item, returning the previous count
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an overflow drop, returning the previous count
    #[inline]
    pub fn record_dropped_overflow(&self) -> u64 {
        self.dropped_overflow.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped_closed(&self) -> u64 {
        self.dropped_closed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self, count: u64) -> u64 {
        self.written.fetch_add(count, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_batch_sent(&self) -> u64 {
        self.batches_sent.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_batch_failed(&self) -> u64 {
        self.batches_failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_compression(&self) -> u64 {
        self.compressions.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_compression_failure(&self) -> u64 {
        self.compression_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Total items lost before reaching the sink, for any reason
    pub fn total_dropped(&self) -> u64 {
        self.dropped_overflow() + self.dropped_closed() + self.write_failures()
    }

    /// Get drop rate as a percentage (0.0 - 100.0)
    ///
    /// Overflow drops relative to everything offered to the queue.
    /// Returns 0.0 if nothing has been offered.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped_overflow() as f64;
        let total = self.enqueued() as f64;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }
}

impl Default for SinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SinkMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            dropped_overflow: AtomicU64::new(self.dropped_overflow()),
            dropped_closed: AtomicU64::new(self.dropped_closed()),
            written: AtomicU64::new(self.written()),
            write_failures: AtomicU64::new(self.write_failures()),
            batches_sent: AtomicU64::new(self.batches_sent()),
            batches_failed: AtomicU64::new(self.batches_failed()),
            rotations: AtomicU64::new(self.rotations()),
            compressions: AtomicU64::new(self.compressions()),
            compression_failures: AtomicU64::new(self.compression_failures()),
        }
    }
}
