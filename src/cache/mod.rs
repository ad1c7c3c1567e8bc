//! Shared cache capability.
//!
//! # Design Decisions
//! - Handlers receive the cache through `AppState`, never a global
//! - Explicit lifecycle: created at startup, closed during shutdown
//! - Expired entries are dropped lazily on read

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache is closed")]
    Closed,
}

/// Key/value cache available to route handlers.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value`; `None` uses the store's default TTL.
    fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Release resources. Every later call fails with [`CacheError::Closed`].
    fn close(&self);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process cache backed by a concurrent map.
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    default_ttl: Duration,
    closed: AtomicBool,
}

impl MemoryCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            closed: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CacheError::Closed);
        }
        Ok(())
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.ensure_open()?;
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, e| e.expires_at <= now);
        Ok(None)
    }

    fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.ensure_open()?;
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.ensure_open()?;
        Ok(self.entries.remove(key).is_some())
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            let dropped = self.entries.len();
            self.entries.clear();
            tracing::info!(entries = dropped, "Cache closed");
        }
    }
}
