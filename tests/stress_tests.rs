//! Stress tests for bounded queues and overflow handling
//!
//! These tests verify:
//! - Producers never block when a sink cannot keep up
//! - Drop-oldest keeps the newest entries, drop-newest the oldest
//! - Overflow callbacks fire at the documented rate
//! - Thread safety under concurrent high-volume logging

use litty_logs::core::{DeliveryQueue, SinkMetrics};
use litty_logs::prelude::*;
use litty_logs::sinks::WebhookTransport;
use std::fs;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;

/// Transport that takes a long time per request
struct SlowTransport {
    delay: Duration,
    posted: AtomicUsize,
}

impl WebhookTransport for SlowTransport {
    fn post_json(&self, _url: &Url, _body: String) -> litty_logs::Result<()> {
        std::thread::sleep(self.delay);
        self.posted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[test]
fn test_drop_oldest_keeps_newest_under_flood() {
    let metrics = Arc::new(SinkMetrics::new());
    let (queue, receiver) =
        DeliveryQueue::new("flood", 100, OverflowPolicy::DropOldest, Arc::clone(&metrics));

    for i in 0..10_000u32 {
        assert!(queue.push(i));
    }
    queue.close();

    let kept: Vec<u32> = receiver.iter().collect();
    assert_eq!(kept.len(), 100);
    assert_eq!(kept, (9_900..10_000).collect::<Vec<_>>());
    assert_eq!(metrics.dropped_overflow(), 9_900);
    assert_eq!(metrics.enqueued(), 10_000);
}

#[test]
fn test_drop_newest_keeps_oldest_under_flood() {
    let metrics = Arc::new(SinkMetrics::new());
    let (queue, receiver) =
        DeliveryQueue::new("flood", 100, OverflowPolicy::DropNewest, Arc::clone(&metrics));

    for i in 0..10_000u32 {
        queue.push(i);
    }
    queue.close();

    let kept: Vec<u32> = receiver.iter().collect();
    assert_eq!(kept, (0..100).collect::<Vec<_>>());
    assert_eq!(metrics.dropped_overflow(), 9_900);
    assert_eq!(metrics.enqueued(), 100);
}

#[test]
fn test_overflow_callback_rate() {
    let metrics = Arc::new(SinkMetrics::new());
    let alerts = Arc::new(AtomicU64::new(0));
    let alerts_clone = Arc::clone(&alerts);

    let (queue, _receiver) =
        DeliveryQueue::new("callback", 1, OverflowPolicy::DropNewest, Arc::clone(&metrics));
    let queue = queue.with_overflow_callback(Arc::new(move |_dropped: u64| {
        alerts_clone.fetch_add(1, Ordering::Relaxed);
    }));

    queue.push(0u32);
    for i in 0..3_000u32 {
        queue.push(i);
    }

    // first drop, then drops 1000, 2000 and 3000
    assert_eq!(metrics.dropped_overflow(), 3_000);
    assert_eq!(alerts.load(Ordering::Relaxed), 4);
}

#[test]
fn test_slow_webhook_never_blocks_callers() {
    let transport = Arc::new(SlowTransport {
        delay: Duration::from_millis(50),
        posted: AtomicUsize::new(0),
    });
    let sink = WebhookSink::with_transport(
        WebhookOptions::new("https://teams.example.com/workflows/abc")
            .with_queue_capacity(500)
            .with_batch_size(10)
            .with_batch_interval(Duration::from_millis(20))
            .with_shutdown_timeout(Duration::from_millis(200)),
        transport.clone(),
    )
    .expect("Failed to create webhook sink");

    let factory = LoggerFactory::builder().sink(sink).build();
    let logger = factory.logger("Flood");

    let start = Instant::now();
    for i in 0..20_000 {
        logger.error(format!("flood {}", i));
    }
    let elapsed = start.elapsed();
    assert!(
        elapsed < Duration::from_secs(10),
        "logging calls took {:?}; they must not wait on the network",
        elapsed
    );

    let metrics = factory.sinks().next().unwrap().metrics().clone();
    assert_eq!(metrics.enqueued(), 20_000);
    assert!(metrics.dropped_overflow() > 0);

    // the endpoint is far behind, so the bounded shutdown gives up
    let shutdown_start = Instant::now();
    assert!(!factory.shutdown());
    assert!(shutdown_start.elapsed() < Duration::from_secs(2));
    assert!(transport.posted.load(Ordering::Relaxed) >= 1);
}

#[test]
fn test_concurrent_file_logging_under_pressure() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("pressure.log");

    let factory = LoggerFactory::builder()
        .try_sink(|| {
            FileSink::new(
                FileSinkOptions::new(&log_file)
                    .with_queue_capacity(64)
                    .with_flush_policy(FlushPolicy::WhenIdle),
            )
        })
        .expect("Failed to create file sink")
        .build();

    let threads = 8;
    let per_thread = 2_000;
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let logger = factory.logger(format!("Worker{}", t));
            std::thread::spawn(move || {
                for i in 0..per_thread {
                    logger.warning(format!("thread {} message {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }
    assert!(factory.shutdown());

    let metrics = factory.sinks().next().unwrap().metrics().clone();
    let lines = fs::read_to_string(&log_file).unwrap().lines().count() as u64;

    // every line is either on disk or accounted for as dropped
    assert_eq!(lines, metrics.written());
    assert_eq!(
        metrics.written() + metrics.dropped_overflow(),
        (threads * per_thread) as u64
    );
    assert_eq!(metrics.write_failures(), 0);
}
