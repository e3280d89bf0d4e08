//! Cache registry
//!
//! Owns the shared volatile table and the clock, and opens namespaced caches
//! from [`CacheConfig`]. Table managers receive their cache from a registry
//! instead of reaching for process-wide state.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheConfig, CacheMode};
use crate::error::{GridError, Result};

use super::{Cache, Clock, DurableBackend, Namespace, SystemClock, VolatileTable};

/// Factory for namespaced caches
///
/// Clones share the same volatile table and clock.
#[derive(Clone)]
pub struct CacheRegistry {
    volatile: VolatileTable,
    clock: Arc<dyn Clock>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            volatile: VolatileTable::new(),
            clock: Arc::new(clock),
        }
    }

    /// Open the cache described by `config`
    ///
    /// A config without a namespace gets a freshly generated one, so two
    /// managers opened from the same config never share entries.
    pub fn open(&self, config: &CacheConfig) -> Result<Cache> {
        let namespace = config.namespace.clone().unwrap_or_else(Namespace::generate);
        match &config.mode {
            CacheMode::Volatile => Ok(self.volatile(namespace, config.ttl)),
            CacheMode::Durable { dir } => self.durable(dir, namespace, config.ttl),
        }
    }

    /// Cache over the shared volatile table
    pub fn volatile(&self, namespace: Namespace, ttl: Duration) -> Cache {
        tracing::debug!(namespace = %namespace, ttl_secs = ttl.as_secs(), "opened volatile cache");
        Cache::new(self.volatile.backend(namespace), ttl, Arc::clone(&self.clock))
    }

    /// Cache persisted under `dir`
    pub fn durable(&self, dir: &Path, namespace: Namespace, ttl: Duration) -> Result<Cache> {
        let backend = DurableBackend::open(dir, namespace)?;
        Ok(Cache::new(backend, ttl, Arc::clone(&self.clock)))
    }

    pub fn volatile_table(&self) -> &VolatileTable {
        &self.volatile
    }

    /// Remove a durable cache directory and every namespace in it
    pub fn purge_durable(dir: &Path) -> Result<()> {
        match fs::remove_dir_all(dir) {
            Ok(()) => {
                tracing::info!(dir = %dir.display(), "purged durable cache directory");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(GridError::CacheWrite {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}
