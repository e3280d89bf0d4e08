//! Cache Module
//!
//! Namespaced key-value cache with per-entry TTL, in front of the Value Store.
//!
//! ## Responsibilities
//! - Store reads (headers, row bodies) under a namespace-scoped key
//! - Expire entries lazily on read (`now - last_update > ttl` is a miss)
//! - Drop entries when the table they describe is written to
//!
//! ## Backends
//! ```text
//!            ┌────────────────────────────┐
//!            │           Cache            │
//!            │   (ttl, clock, typed API)  │
//!            └─────────────┬──────────────┘
//!                          │ dyn CacheBackend
//!          ┌───────────────┴───────────────┐
//!          ▼                               ▼
//!   ┌─────────────┐                 ┌─────────────┐
//!   │  Volatile   │                 │   Durable   │
//!   │ (ns,key)->e │                 │ {ns}.json   │
//!   └─────────────┘                 └─────────────┘
//! ```
//!
//! Read failures of the durable backend are misses. Write failures are
//! returned to the caller.

mod clock;
mod durable;
mod namespace;
mod registry;
mod store;
mod volatile;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use clock::{Clock, ManualClock, SystemClock};
pub use durable::DurableBackend;
pub use namespace::Namespace;
pub use registry::CacheRegistry;
pub use store::Cache;
pub use volatile::{VolatileBackend, VolatileTable};

/// Default time-to-live for cache entries
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// A stored value with the time it was written
///
/// Serialized as `{ "lastUpdate": <epoch ms>, "data": <value> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T = serde_json::Value> {
    /// Unix millis of the write
    pub last_update: u64,

    pub data: T,
}

/// Result of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Found(T),
    Missing,
}

impl<T> CacheLookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, CacheLookup::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CacheLookup::Found(value) => Some(value),
            CacheLookup::Missing => None,
        }
    }
}

impl<T> From<Option<T>> for CacheLookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => CacheLookup::Found(value),
            None => CacheLookup::Missing,
        }
    }
}

/// Storage for one namespace's entries
///
/// Implementations do not evaluate TTLs; that is the job of [`Cache`].
pub trait CacheBackend: Send + Sync {
    /// The namespace this backend is scoped to
    fn namespace(&self) -> &Namespace;

    /// Load one entry. Any read failure is reported as `None`.
    fn load(&self, key: &str) -> Option<CacheEntry>;

    /// Insert or overwrite one entry
    fn store(&self, key: &str, entry: CacheEntry) -> Result<()>;

    /// Remove one entry; absent keys are not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// Remove every entry of the namespace
    fn clear(&self) -> Result<()>;

    /// Every entry of the namespace, fresh or stale. Read failures yield an empty map.
    fn entries(&self) -> BTreeMap<String, CacheEntry>;
}
