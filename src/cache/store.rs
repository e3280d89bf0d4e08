//! Typed cache over a backend
//!
//! Values go through `serde_json::Value` so both backends hold the same shape.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

use super::{CacheBackend, CacheEntry, CacheLookup, Clock, Namespace};

/// TTL cache for one namespace
pub struct Cache {
    backend: Box<dyn CacheBackend>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Cache {
    pub fn new(backend: impl CacheBackend + 'static, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: Box::new(backend),
            ttl,
            clock,
        }
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry {
            last_update: self.clock.now_millis(),
            data: serde_json::to_value(value)?,
        };
        self.backend.store(key, entry)?;
        tracing::trace!(namespace = %self.backend.namespace(), key, "cache set");
        Ok(())
    }

    /// Look up `key`
    ///
    /// An expired entry is removed and reported as missing. An entry whose
    /// data no longer decodes as `T` is also missing.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let namespace = self.backend.namespace();

        let Some(entry) = self.backend.load(key) else {
            tracing::debug!(namespace = %namespace, key, "cache miss");
            return CacheLookup::Missing;
        };

        if !self.is_fresh(&entry) {
            tracing::debug!(namespace = %namespace, key, "cache entry expired");
            if let Err(e) = self.backend.remove(key) {
                tracing::warn!(namespace = %namespace, key, error = %e, "failed to drop expired entry");
            }
            return CacheLookup::Missing;
        }

        match serde_json::from_value(entry.data) {
            Ok(value) => {
                tracing::debug!(namespace = %namespace, key, "cache hit");
                CacheLookup::Found(value)
            }
            Err(e) => {
                tracing::warn!(namespace = %namespace, key, error = %e, "cached data has unexpected shape, treating as miss");
                CacheLookup::Missing
            }
        }
    }

    /// Remove `key` if present
    pub fn delete(&self, key: &str) -> Result<()> {
        self.backend.remove(key)?;
        tracing::debug!(namespace = %self.backend.namespace(), key, "cache invalidated");
        Ok(())
    }

    /// Remove every entry in this namespace
    pub fn clear(&self) -> Result<()> {
        self.backend.clear()?;
        tracing::debug!(namespace = %self.backend.namespace(), "cache cleared");
        Ok(())
    }

    /// Every stored entry, including stale ones that have not been read since expiring
    pub fn entries(&self) -> BTreeMap<String, CacheEntry> {
        self.backend.entries()
    }

    /// `now - last_update <= ttl`
    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        let elapsed = self.clock.now_millis().saturating_sub(entry.last_update);
        u128::from(elapsed) <= self.ttl.as_millis()
    }

    pub fn namespace(&self) -> &Namespace {
        self.backend.namespace()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("namespace", self.backend.namespace())
            .field("ttl", &self.ttl)
            .finish()
    }
}
