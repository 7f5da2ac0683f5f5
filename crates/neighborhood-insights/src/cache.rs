//! Keyed request cache with a staleness window and in-flight deduplication.
//!
//! Each key owns an async slot lock. The first caller for a cold or stale key
//! runs the fetch while holding the slot; concurrent callers for the same key
//! queue on that lock and observe the freshly stored value instead of issuing
//! their own request. Failed fetches leave the slot untouched.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    endpoint: &'static str,
    params: String,
}

impl QueryKey {
    pub fn new(endpoint: &'static str, raw_params: &str) -> Self {
        Self {
            endpoint,
            params: normalize_params(raw_params),
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn params(&self) -> &str {
        &self.params
    }
}

pub(crate) fn normalize_params(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

#[derive(Debug)]
struct CachedEntry<V> {
    value: V,
    fetched_at: Instant,
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<CachedEntry<V>>>>;

#[derive(Debug)]
pub struct QueryCache<V> {
    stale_time: Duration,
    gc_time: Duration,
    slots: Mutex<HashMap<QueryKey, Slot<V>>>,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            stale_time,
            gc_time,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key` when it is younger than the
    /// staleness window, otherwise awaits `fetch` and stores its success.
    pub async fn query<F, Fut, E>(&self, key: QueryKey, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.purge_expired();
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.stale_time {
                return Ok(cached.value.clone());
            }
        }

        let value = fetch().await?;
        *entry = Some(CachedEntry {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    /// Drops entries that have been stale for longer than the gc window.
    /// Slots with a fetch in flight are left alone.
    pub fn purge_expired(&self) {
        let retention = self.stale_time + self.gc_time;
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| match slot.try_lock() {
            Ok(entry) => match entry.as_ref() {
                Some(cached) => cached.fetched_at.elapsed() < retention,
                None => Arc::strong_count(slot) > 1,
            },
            Err(_) => true,
        });
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn slot(&self, key: QueryKey) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key).or_default().clone()
    }
}
