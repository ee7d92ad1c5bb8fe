//! Per-service check history with bounded time retention
//!
//! [`ServiceHistory`] keeps an insertion-ordered log of results per service
//! name. The log is unbounded in count but bounded in time: on every write,
//! entries older than the retention window are evicted. One coarse lock
//! guards the whole map; no lock is ever held across an await point, so the
//! store is safe to share between the dispatcher's worker tasks and any
//! read-only front end.

use schema::ServiceResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Default number of entries returned by [`ServiceHistory::get_history`]
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Cap on how many recent entries feed the uptime computation
pub const UPTIME_SAMPLE_LIMIT: usize = 100;

/// Default retention window for recorded results
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Thread-safe, per-service log of past check results
#[derive(Debug)]
pub struct ServiceHistory {
    retention: Duration,
    inner: Mutex<HashMap<String, Vec<ServiceResult>>>,
}

impl Default for ServiceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl ServiceHistory {
    /// Create a history store with the given retention window
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Record a result, then evict entries older than the retention window
    ///
    /// Results for the same service name are appended in call order. The
    /// eviction pass only touches the sequence being written to.
    pub fn add_result(&self, result: ServiceResult) {
        let cutoff = ServiceResult::current_timestamp() - self.retention.as_secs_f64();
        let name = result.name.clone();

        let mut inner = self.lock();
        let entries = inner.entry(name.clone()).or_default();
        entries.push(result);

        let before = entries.len();
        entries.retain(|entry| entry.timestamp > cutoff);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {} expired history entries for {}", evicted, name);
        }
    }

    /// Most recent `limit` entries for a service, oldest first
    ///
    /// Unknown names yield an empty vector, never an error.
    pub fn get_history(&self, name: &str, limit: usize) -> Vec<ServiceResult> {
        let inner = self.lock();
        match inner.get(name) {
            Some(entries) => {
                let skip = entries.len().saturating_sub(limit);
                entries[skip..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// Percentage of healthy results among recent entries within `hours`
    ///
    /// Considers at most the most recent [`UPTIME_SAMPLE_LIMIT`] entries,
    /// filtered to those newer than `hours` hours ago. Returns `0.0` when no
    /// entry qualifies. Pure read; never mutates the store.
    pub fn get_uptime_percentage(&self, name: &str, hours: u64) -> f64 {
        let cutoff = ServiceResult::current_timestamp() - (hours as f64) * 3600.0;

        let inner = self.lock();
        let Some(entries) = inner.get(name) else {
            return 0.0;
        };

        let skip = entries.len().saturating_sub(UPTIME_SAMPLE_LIMIT);
        let qualifying: Vec<_> = entries[skip..]
            .iter()
            .filter(|entry| entry.timestamp > cutoff)
            .collect();
        if qualifying.is_empty() {
            return 0.0;
        }

        let healthy = qualifying.iter().filter(|entry| entry.is_healthy()).count();
        (healthy as f64 / qualifying.len() as f64) * 100.0
    }

    /// Names of all services with recorded history
    pub fn service_names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<ServiceResult>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
