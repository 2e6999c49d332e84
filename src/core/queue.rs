//! Bounded delivery queue with non-blocking overflow handling
//!
//! Many producers, one consumer. The producer half keeps a spare receiver
//! so that, under [`OverflowPolicy::DropOldest`], it can evict the head of
//! the queue itself instead of waiting for the consumer. A push is a
//! constant number of `try_send`/`try_recv` calls and never blocks.

use super::{
    metrics::SinkMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Default number of slots in a sink queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// How many evict-then-retry rounds a push attempts before giving up
const MAX_EVICTION_ATTEMPTS: usize = 4;

/// Producer half of a sink's queue
///
/// The matching consumer half is the plain `Receiver` returned by
/// [`DeliveryQueue::new`]; it observes disconnection once the queue is
/// closed and every buffered item has been received.
pub struct DeliveryQueue<T> {
    name: String,
    sender: RwLock<Option<Sender<T>>>,
    evictor: Receiver<T>,
    policy: OverflowPolicy,
    metrics: Arc<SinkMetrics>,
    on_overflow: Option<OverflowCallback>,
}

impl<T> DeliveryQueue<T> {
    /// Create a queue and its consumer receiver
    ///
    /// A capacity of zero is raised to one.
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        policy: OverflowPolicy,
        metrics: Arc<SinkMetrics>,
    ) -> (Self, Receiver<T>) {
        let (sender, receiver) = bounded(capacity.max(1));
        let queue = Self {
            name: name.into(),
            sender: RwLock::new(Some(sender)),
            evictor: receiver.clone(),
            policy,
            metrics,
            on_overflow: None,
        };
        (queue, receiver)
    }

    /// Set a callback for overflow notifications
    #[must_use = "builder methods return a new value"]
    pub fn with_overflow_callback(mut self, callback: OverflowCallback) -> Self {
        self.set_overflow_callback(callback);
        self
    }

    pub fn set_overflow_callback(&mut self, callback: OverflowCallback) {
        self.on_overflow = Some(callback);
    }

    /// Offer an item; returns whether it was accepted
    ///
    /// Under `DropOldest` the new item is accepted and the oldest queued
    /// item is evicted instead. Items offered after [`close`](Self::close)
    /// are counted and discarded.
    pub fn push(&self, item: T) -> bool {
        let guard = self.sender.read();
        let Some(sender) = guard.as_ref() else {
            self.metrics.record_dropped_closed();
            return false;
        };

        let mut item = match sender.try_send(item) {
            Ok(()) => {
                self.metrics.record_enqueued();
                return true;
            }
            Err(TrySendError::Full(item)) => item,
            Err(TrySendError::Disconnected(_)) => {
                self.metrics.record_dropped_closed();
                return false;
            }
        };

        if self.policy == OverflowPolicy::DropNewest {
            self.alert_overflow();
            return false;
        }

        for _ in 0..MAX_EVICTION_ATTEMPTS {
            match self.evictor.try_recv() {
                Ok(_evicted) => self.alert_overflow(),
                // consumer emptied a slot in the meantime
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => break,
            }

            item = match sender.try_send(item) {
                Ok(()) => {
                    self.metrics.record_enqueued();
                    return true;
                }
                Err(TrySendError::Full(item)) => item,
                Err(TrySendError::Disconnected(_)) => break,
            };
        }

        // other producers kept refilling the freed slots
        self.alert_overflow();
        false
    }

    /// Stop accepting items
    ///
    /// Items already queued remain available to the consumer.
    pub fn close(&self) {
        drop(self.sender.write().take());
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Items currently buffered
    pub fn len(&self) -> usize {
        self.evictor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evictor.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.evictor.capacity().unwrap_or(0)
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Count one overflow drop and alert on the first and every 1000th
    fn alert_overflow(&self) {
        let dropped_count = self.metrics.record_dropped_overflow();

        let should_alert = dropped_count == 0 || (dropped_count + 1).is_multiple_of(1000);

        if should_alert {
            let victim = match self.policy {
                OverflowPolicy::DropOldest => "oldest entries evicted",
                OverflowPolicy::DropNewest => "newest entries rejected",
            };
            eprintln!(
                "[LOGGER WARNING] {} queue full, {} logs dropped ({}). \
                 Consider increasing the queue capacity.",
                self.name,
                dropped_count + 1,
                victim
            );

            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    fn queue(capacity: usize, policy: OverflowPolicy) -> (DeliveryQueue<u32>, Receiver<u32>, Arc<SinkMetrics>) {
        let metrics = Arc::new(SinkMetrics::new());
        let (queue, receiver) = DeliveryQueue::new("test", capacity, policy, Arc::clone(&metrics));
        (queue, receiver, metrics)
    }

    #[test]
    fn test_fifo_under_capacity() {
        let (queue, receiver, metrics) = queue(4, OverflowPolicy::DropOldest);
        for i in 0..3 {
            assert!(queue.push(i));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(receiver.try_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(metrics.enqueued(), 3);
    }

    #[test]
    fn test_drop_oldest_keeps_newest() {
        let (queue, receiver, metrics) = queue(3, OverflowPolicy::DropOldest);
        for i in 0..5 {
            assert!(queue.push(i));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(receiver.try_iter().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(metrics.dropped_overflow(), 2);
    }

    #[test]
    fn test_drop_newest_keeps_oldest() {
        let (queue, receiver, metrics) = queue(3, OverflowPolicy::DropNewest);
        for i in 0..5 {
            queue.push(i);
        }
        assert_eq!(receiver.try_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(metrics.dropped_overflow(), 2);
    }

    #[test]
    fn test_close_drains_then_disconnects() {
        let (queue, receiver, metrics) = queue(8, OverflowPolicy::DropOldest);
        queue.push(1);
        queue.push(2);
        queue.close();

        assert!(queue.is_closed());
        assert!(!queue.push(3));
        assert_eq!(metrics.dropped_closed(), 1);

        assert_eq!(receiver.recv(), Ok(1));
        assert_eq!(receiver.recv(), Ok(2));
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let (queue, _receiver, _) = queue(0, OverflowPolicy::DropOldest);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.push(7));
    }

    #[test]
    fn test_overflow_callback_first_and_every_thousandth() {
        let calls = Arc::new(AtomicU64::new(0));
        let calls_clone = Arc::clone(&calls);
        let metrics = Arc::new(SinkMetrics::new());
        let (queue, _receiver) =
            DeliveryQueue::<u32>::new("test", 1, OverflowPolicy::DropNewest, metrics);
        let queue = queue.with_overflow_callback(Arc::new(move |_| {
            calls_clone.fetch_add(1, Ordering::Relaxed);
        }));

        queue.push(0);
        for i in 0..2000 {
            queue.push(i);
        }
        // drop #1, #1000, #2000
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_concurrent_producers_never_exceed_capacity() {
        let (queue, receiver, metrics) = queue(100, OverflowPolicy::DropOldest);
        let queue = Arc::new(queue);

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..1000 {
                        queue.push(t * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(queue.len() <= 100);
        let received = receiver.try_iter().count() as u64;
        assert_eq!(received + metrics.dropped_overflow(), 4000);
    }
}
