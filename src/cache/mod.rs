//! Ephemeral deferred-result cache
//!
//! Holds payloads (typically handles to still-running computations) under an
//! opaque key for a fixed lifespan. Expired entries are removed by a periodic
//! background sweep whose interval equals the current lifespan; reads never
//! extend an entry's expiry and never wait for a payload to resolve.
//!
//! # Example
//!
//! ```
//! use page_lens::cache::DeferredCache;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = DeferredCache::new(Duration::from_secs(60));
//! cache.set("job-1", 42u32);
//! assert_eq!(cache.get("job-1").map(|e| e.payload), Some(42));
//! cache.dispose();
//! # }
//! ```

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default time an entry stays retrievable
pub const DEFAULT_LIFESPAN: Duration = Duration::from_secs(30 * 60);

/// A cached payload with its creation and expiry timestamps
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value, possibly an unresolved computation
    pub payload: T,

    /// When the entry was stored
    pub created_at: DateTime<Utc>,

    /// `created_at + lifespan` at the time of storing; never extended
    pub expires_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(payload: T, lifespan: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            payload,
            created_at,
            expires_at: expiry(created_at, lifespan),
        }
    }

    /// Checks whether the entry is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Concurrent TTL cache with sweep-based eviction
///
/// Keys are independent; `set` overwrites (last write wins). Dropping the
/// cache or calling [`DeferredCache::dispose`] stops the background sweep.
pub struct DeferredCache<T> {
    entries: Arc<DashMap<String, CacheEntry<T>>>,
    lifespan: RwLock<Duration>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<T> DeferredCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a cache and starts its eviction sweep
    ///
    /// The sweep runs on the current Tokio runtime. Outside a runtime the
    /// cache still works, but nothing is evicted until
    /// [`DeferredCache::set_lifespan`] is called from within one.
    pub fn new(lifespan: Duration) -> Self {
        let cache = Self {
            entries: Arc::new(DashMap::new()),
            lifespan: RwLock::new(lifespan),
            sweeper: Mutex::new(None),
        };
        cache.restart_sweeper(lifespan);
        cache
    }

    /// Stores `payload` under `key`, replacing any existing entry
    pub fn set(&self, key: impl Into<String>, payload: T) {
        let entry = CacheEntry::new(payload, self.lifespan());
        self.entries.insert(key.into(), entry);
    }

    /// Returns the entry stored under `key`, or `None` if absent or evicted
    pub fn get(&self, key: &str) -> Option<CacheEntry<T>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Changes the lifespan for future entries and restarts the sweep at the
    /// new interval
    pub fn set_lifespan(&self, lifespan: Duration) {
        *self.lifespan.write().unwrap_or_else(PoisonError::into_inner) = lifespan;
        self.restart_sweeper(lifespan);
    }

    /// The lifespan applied to newly stored entries
    pub fn lifespan(&self) -> Duration {
        *self.lifespan.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stops the eviction sweep and discards all entries
    pub fn dispose(&self) {
        if let Some(handle) = self.take_sweeper() {
            handle.abort();
        }
        self.entries.clear();
        tracing::debug!("Deferred-result cache disposed");
    }

    /// Removes every entry that has expired; returns how many were removed
    pub fn evict_expired(&self) -> usize {
        evict_expired(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn restart_sweeper(&self, lifespan: Duration) {
        if let Some(previous) = self.take_sweeper() {
            previous.abort();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No Tokio runtime available, cache eviction sweep not started");
            return;
        };

        let entries = Arc::clone(&self.entries);
        let period = lifespan.max(Duration::from_millis(1));
        let handle = runtime.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                let removed = evict_expired(&entries);
                if removed > 0 {
                    tracing::debug!(removed, remaining = entries.len(), "Evicted expired cache entries");
                }
            }
        });

        *self.sweeper.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn take_sweeper(&self) -> Option<JoinHandle<()>> {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<T> Drop for DeferredCache<T> {
    fn drop(&mut self) {
        let sweeper = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = sweeper.take() {
            handle.abort();
        }
    }
}

fn evict_expired<T>(entries: &DashMap<String, CacheEntry<T>>) -> usize {
    let now = Utc::now();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired_at(now));
    before.saturating_sub(entries.len())
}

fn expiry(created_at: DateTime<Utc>, lifespan: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(lifespan)
        .ok()
        .and_then(|ttl| created_at.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
