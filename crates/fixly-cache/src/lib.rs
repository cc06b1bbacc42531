// SPDX-FileCopyrightText: 2026 Fixly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded stale-while-revalidate cache.
//!
//! Serves list/detail responses from memory while keeping them fresh without
//! unbounded growth:
//!
//! - entries carry their insertion instant; reads older than a max age are
//!   misses (the entry stays until capacity pressure or invalidation evicts it)
//! - the store never exceeds its capacity; oldest entries are evicted first
//! - [`SwrCache::fetch_with_cache`] returns a fresh-enough entry immediately
//!   and revalidates in the background, or awaits the fetcher inline on a miss
//!
//! ## Capacity & age
//!
//! - default capacity 100 entries, default max age 5 minutes
//! - `set` applies at completion time under the lock, so when an inline fetch
//!   and a background revalidation race for one key, the last completion wins

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use fixly_core::FixlyError;

/// Default maximum number of cached entries.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default maximum entry age before a read is treated as a miss.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

struct CacheEntry<T> {
    data: T,
    stored_at: Instant,
    /// Monotonic insertion counter. Breaks eviction ties between entries
    /// stored at the same instant, keeping "retained = most-recently-set"
    /// exact.
    seq: u64,
}

struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    next_seq: u64,
}

/// Options for [`SwrCache::fetch_with_options`].
pub struct FetchOptions<T> {
    /// Override the cache-wide default max age for this read.
    pub max_age: Option<Duration>,
    /// Invoked with the fresh value after a successful background
    /// revalidation (not on the inline-fetch path, where the caller already
    /// holds the fresh value).
    pub on_update: Option<Arc<dyn Fn(&T) + Send + Sync>>,
}

impl<T> Default for FetchOptions<T> {
    fn default() -> Self {
        Self {
            max_age: None,
            on_update: None,
        }
    }
}

/// Bounded key→value cache with age-based misses and background revalidation.
///
/// Cheap to clone; clones share the same store.
pub struct SwrCache<T> {
    inner: Arc<Mutex<Inner<T>>>,
    max_entries: usize,
    default_max_age: Duration,
}

impl<T> Clone for SwrCache<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            max_entries: self.max_entries,
            default_max_age: self.default_max_age,
        }
    }
}

impl<T> Default for SwrCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MAX_AGE)
    }
}

impl<T> SwrCache<T> {
    pub fn new(max_entries: usize, default_max_age: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            })),
            max_entries: max_entries.max(1),
            default_max_age,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // The lock is only held across synchronous sections; a poisoned lock
        // still holds structurally valid data.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert or overwrite `key`, evicting the oldest entries while over
    /// capacity.
    pub fn set(&self, key: &str, data: T) {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                data,
                stored_at: Instant::now(),
                seq,
            },
        );
        while inner.entries.len() > self.max_entries {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| (e.stored_at, e.seq))
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    inner.entries.remove(&k);
                }
                None => break,
            }
        }
    }

    /// Remove a single key.
    pub fn invalidate(&self, key: &str) {
        self.lock().entries.remove(key);
    }

    /// Remove every key starting with `prefix`. Used when a write is known
    /// to stale a family of cached reads (e.g. `"jobs:"` after posting a job).
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.lock().entries.retain(|k, _| !k.starts_with(prefix));
    }
}

impl<T: Clone + Send + 'static> SwrCache<T> {
    /// Read `key` if present and no older than the cache-wide default max age.
    pub fn get(&self, key: &str) -> Option<T> {
        self.get_within(key, self.default_max_age)
    }

    /// Read `key` if present and no older than `max_age`.
    ///
    /// Expired entries are misses but are NOT removed here; removal happens
    /// only via capacity pressure or explicit invalidation.
    pub fn get_within(&self, key: &str, max_age: Duration) -> Option<T> {
        let inner = self.lock();
        let entry = inner.entries.get(key)?;
        if entry.stored_at.elapsed() > max_age {
            return None;
        }
        Some(entry.data.clone())
    }

    /// [`Self::fetch_with_options`] with default options.
    pub async fn fetch_with_cache<F, Fut>(&self, key: &str, fetcher: F) -> Result<T, FixlyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FixlyError>> + Send + 'static,
    {
        self.fetch_with_options(key, fetcher, FetchOptions::default())
            .await
    }

    /// Read-through fetch with background revalidation.
    ///
    /// A fresh-enough entry is returned immediately and exactly one
    /// revalidation is spawned: its error is swallowed (logged at debug), its
    /// success overwrites the entry and is reported through
    /// `options.on_update`. With no usable entry the fetcher is awaited
    /// inline and its result stored before returning.
    ///
    /// The inline path never returns data older than the network response it
    /// awaited; the background path may serve one round trip of staleness
    /// but converges on the next successful revalidation.
    pub async fn fetch_with_options<F, Fut>(
        &self,
        key: &str,
        fetcher: F,
        options: FetchOptions<T>,
    ) -> Result<T, FixlyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FixlyError>> + Send + 'static,
    {
        let max_age = options.max_age.unwrap_or(self.default_max_age);

        if let Some(hit) = self.get_within(key, max_age) {
            let cache = self.clone();
            let key = key.to_string();
            let on_update = options.on_update;
            let fut = fetcher();
            tokio::spawn(async move {
                match fut.await {
                    Ok(fresh) => {
                        cache.set(&key, fresh.clone());
                        if let Some(notify) = on_update {
                            notify(&fresh);
                        }
                    }
                    Err(err) => {
                        debug!(key = %key, error = %err, "background revalidation failed");
                    }
                }
            });
            return Ok(hit);
        }

        let fresh = fetcher().await?;
        self.set(key, fresh.clone());
        Ok(fresh)
    }
}
