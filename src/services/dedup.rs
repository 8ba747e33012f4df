//! Purchase deduplication store.
//!
//! A key present in the store means that (user, token) pair has already
//! produced a successful, non-duplicate validation. Entries expire after
//! the configured TTL; eviction is opportunistic (the handler sweeps after
//! each successful insert), not scheduled.

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default age past which entries become eligible for eviction.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub product_id: String,
    pub user_id: String,
    inserted_at: Instant,
}

impl CacheEntry {
    pub fn new(product_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            user_id: user_id.into(),
            inserted_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// Injected store interface so the in-memory map can be swapped for a
/// networked store without touching the handler.
#[async_trait]
pub trait DedupStore: Send + Sync {
    async fn has(&self, key: &str) -> Result<bool>;

    /// Unconditional insert, overwriting any existing entry.
    async fn set(&self, key: &str, entry: CacheEntry) -> Result<()>;

    /// Insert only if the key is absent. Returns true iff the entry was
    /// newly inserted. The check and the insert happen atomically, so two
    /// racing requests for the same key resolve to exactly one insert.
    async fn check_and_insert(&self, key: &str, entry: CacheEntry) -> Result<bool>;

    /// Remove all entries older than the TTL. Returns the eviction count.
    async fn sweep(&self) -> Result<usize>;
}

/// Process-local store. Unbounded apart from TTL eviction; sustained
/// traffic with unique keys grows the map until entries age out.
pub struct InMemoryDedupStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl InMemoryDedupStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| ApiError::Store("dedup cache mutex poisoned".to_string()))
    }
}

impl Default for InMemoryDedupStore {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_TTL)
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    async fn set(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    async fn check_and_insert(&self, key: &str, entry: CacheEntry) -> Result<bool> {
        let mut entries = self.lock()?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), entry);
        Ok(true)
    }

    async fn sweep(&self) -> Result<usize> {
        let ttl = self.ttl;
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl));
        let evicted = before - entries.len();

        if evicted > 0 {
            debug!("Evicted {} expired dedup entries, {} remain", evicted, entries.len());
        }

        Ok(evicted)
    }
}
