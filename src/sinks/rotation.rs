//! File rotation state and naming
//!
//! Rotation is triggered by size, by the wall clock crossing into a new
//! daily/hourly bucket, or both. All paths are derived from the configured
//! base path:
//!
//! | interval | active file                | rotated-out file                      |
//! |----------|----------------------------|---------------------------------------|
//! | none     | `app.log`                  | `app-20260222-120000-1.log`           |
//! | daily    | `app-20260222.log`         | previous day's file, or a renamed one |
//! | hourly   | `app-20260222-12.log`      | previous hour's file, or a renamed one|

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Time-based rotation bucket
///
/// # Examples
///
/// ```
/// use litty_logs::sinks::RollingInterval;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2026, 2, 22, 13, 5, 0).unwrap();
/// assert_eq!(RollingInterval::Hourly.bucket(&now, true).as_deref(), Some("20260222-13"));
/// assert_eq!(RollingInterval::None.bucket(&now, true), None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollingInterval {
    /// Size-only rotation (or none at all when no size limit is set)
    #[default]
    None,
    Daily,
    Hourly,
}

impl RollingInterval {
    fn pattern(&self) -> Option<&'static str> {
        match self {
            RollingInterval::None => None,
            RollingInterval::Daily => Some("%Y%m%d"),
            RollingInterval::Hourly => Some("%Y%m%d-%H"),
        }
    }

    /// Bucket key for an instant; two instants share a file iff their keys match
    pub fn bucket(&self, now: &DateTime<Utc>, use_utc: bool) -> Option<String> {
        self.pattern().map(|pattern| format_instant(now, use_utc, pattern))
    }
}

fn format_instant(now: &DateTime<Utc>, use_utc: bool, pattern: &str) -> String {
    if use_utc {
        now.format(pattern).to_string()
    } else {
        now.with_timezone(&Local).format(pattern).to_string()
    }
}

/// `app.log` + `-suffix` → `app-suffix.log`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}-{}", stem, suffix),
    };
    path.with_file_name(file_name)
}

/// Path of the compressed copy of a rotated file: `name.log` → `name.log.gz`
pub fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".gz");
    path.with_file_name(name)
}

/// Rotation bookkeeping owned by the file writer's consumer thread
#[derive(Debug)]
pub struct RotationState {
    base_path: PathBuf,
    interval: RollingInterval,
    max_file_size_bytes: u64,
    use_utc: bool,
    active_path: PathBuf,
    current_size: u64,
    bucket: Option<String>,
    /// Disambiguates several size rotations within the same second
    counter: u64,
}

impl RotationState {
    pub fn new(
        base_path: impl Into<PathBuf>,
        interval: RollingInterval,
        max_file_size_bytes: u64,
        use_utc: bool,
    ) -> Self {
        let base_path = base_path.into();
        Self {
            active_path: base_path.clone(),
            base_path,
            interval,
            max_file_size_bytes,
            use_utc,
            current_size: 0,
            bucket: None,
            counter: 0,
        }
    }

    /// Path new entries are written to for the bucket containing `now`
    pub fn resolve_path(&self, now: &DateTime<Utc>) -> PathBuf {
        match self.interval.bucket(now, self.use_utc) {
            Some(bucket) => with_suffix(&self.base_path, &bucket),
            None => self.base_path.clone(),
        }
    }

    /// Record that a file was (re)opened at `now` with `existing_size` bytes
    pub fn opened(&mut self, path: PathBuf, existing_size: u64, now: &DateTime<Utc>) {
        self.active_path = path;
        self.current_size = existing_size;
        self.bucket = self.interval.bucket(now, self.use_utc);
    }

    /// Account for one written line plus its newline
    pub fn record_write(&mut self, line_len: usize) {
        self.current_size += line_len as u64 + 1;
    }

    /// Size limit reached, or the clock moved into a new bucket
    pub fn should_rotate(&self, now: &DateTime<Utc>) -> bool {
        let size_exceeded =
            self.max_file_size_bytes > 0 && self.current_size >= self.max_file_size_bytes;
        let bucket_changed = self.interval != RollingInterval::None
            && self.interval.bucket(now, self.use_utc) != self.bucket;
        size_exceeded || bucket_changed
    }

    /// Whether the file being closed has to be renamed out of the way
    ///
    /// True when the next file would land on the same path, which is always
    /// the case without an interval and happens with one when the size limit
    /// trips inside a bucket.
    pub fn needs_rename(&self, now: &DateTime<Utc>) -> bool {
        self.resolve_path(now) == self.active_path
    }

    /// Fresh `{stem}-{yyyyMMdd-HHmmss}-{n}{ext}` name, derived from the base path
    ///
    /// Skips counters whose name is already taken on disk, so a restarted
    /// process never overwrites an earlier rotation from the same second.
    pub fn next_rotated_path(&mut self, now: &DateTime<Utc>) -> PathBuf {
        let stamp = format_instant(now, self.use_utc, "%Y%m%d-%H%M%S");
        loop {
            self.counter += 1;
            let candidate = with_suffix(&self.base_path, &format!("{}-{}", stamp, self.counter));
            if !candidate.exists() && !gz_path(&candidate).exists() {
                return candidate;
            }
        }
    }

    /// Forget the bytes written so far, postponing the next size rotation
    pub fn reset_size(&mut self) {
        self.current_size = 0;
    }

    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    pub fn interval(&self) -> RollingInterval {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 22, hour, minute, 0)
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn test_resolve_path_per_interval() {
        let none = RotationState::new("logs/app.log", RollingInterval::None, 0, true);
        let daily = RotationState::new("logs/app.log", RollingInterval::Daily, 0, true);
        let hourly = RotationState::new("logs/app.log", RollingInterval::Hourly, 0, true);

        assert_eq!(none.resolve_path(&at(9, 0)), PathBuf::from("logs/app.log"));
        assert_eq!(
            daily.resolve_path(&at(9, 0)),
            PathBuf::from("logs/app-20260222.log")
        );
        assert_eq!(
            hourly.resolve_path(&at(9, 0)),
            PathBuf::from("logs/app-20260222-09.log")
        );
    }

    #[test]
    fn test_path_without_extension() {
        let daily = RotationState::new("logs/app", RollingInterval::Daily, 0, true);
        assert_eq!(daily.resolve_path(&at(0, 0)), PathBuf::from("logs/app-20260222"));
    }

    #[test]
    fn test_size_trigger() {
        let mut state = RotationState::new("app.log", RollingInterval::None, 100, true);
        state.opened(PathBuf::from("app.log"), 0, &at(9, 0));
        assert!(!state.should_rotate(&at(9, 0)));

        state.record_write(98);
        assert_eq!(state.current_size(), 99);
        assert!(!state.should_rotate(&at(9, 0)));

        state.record_write(0);
        assert!(state.should_rotate(&at(9, 0)));
    }

    #[test]
    fn test_zero_size_means_unlimited() {
        let mut state = RotationState::new("app.log", RollingInterval::None, 0, true);
        state.opened(PathBuf::from("app.log"), 10_000_000, &at(9, 0));
        assert!(!state.should_rotate(&at(23, 0)));
    }

    #[test]
    fn test_bucket_trigger() {
        let mut state = RotationState::new("app.log", RollingInterval::Hourly, 0, true);
        let now = at(9, 15);
        let path = state.resolve_path(&now);
        state.opened(path, 0, &now);

        assert!(!state.should_rotate(&at(9, 59)));
        assert!(state.should_rotate(&at(10, 0)));
        // moving to the next bucket gives a distinct path
        assert!(!state.needs_rename(&at(10, 0)));
        // a size rotation inside the bucket does not
        assert!(state.needs_rename(&at(9, 30)));
    }

    #[test]
    fn test_rotated_names_are_unique() {
        let mut state = RotationState::new("logs/app.log", RollingInterval::None, 1, true);
        state.opened(PathBuf::from("logs/app.log"), 0, &at(9, 0));

        let first = state.next_rotated_path(&at(9, 0));
        let second = state.next_rotated_path(&at(9, 0));
        assert_eq!(first, PathBuf::from("logs/app-20260222-090000-1.log"));
        assert_eq!(second, PathBuf::from("logs/app-20260222-090000-2.log"));
    }

    #[test]
    fn test_gz_path() {
        assert_eq!(
            gz_path(Path::new("logs/app-20260222.log")),
            PathBuf::from("logs/app-20260222.log.gz")
        );
    }
}
