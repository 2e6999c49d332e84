//! Overflow policies for the delivery queue
//!
//! When a sink's queue is full, the policy decides which entry is lost.
//! Producers never wait in either case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Policy for handling queue overflow
///
/// # Example
///
/// ```
/// use litty_logs::OverflowPolicy;
///
/// // Default behavior: evict the oldest queued entry
/// let policy = OverflowPolicy::default();
/// assert_eq!(policy, OverflowPolicy::DropOldest);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Evict the oldest unconsumed entry to admit the new one
    ///
    /// Keeps the most recent picture of what the application is doing.
    #[default]
    DropOldest,

    /// Reject the new entry and keep what is already queued
    DropNewest,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called on the first overflow drop and every 1000th one after that.
/// The parameter is the total count of dropped entries so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
