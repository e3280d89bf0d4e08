//! Volatile backend
//!
//! One process-lifetime table shared by every namespace that opens it,
//! keyed by `(namespace, key)`. The table is an explicit value handed out
//! by a [`CacheRegistry`](super::CacheRegistry), never a global.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;

use super::{CacheBackend, CacheEntry, Namespace};

type Entries = HashMap<String, CacheEntry>;

/// Shared in-memory storage for all volatile namespaces
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct VolatileTable {
    inner: Arc<RwLock<HashMap<Namespace, Entries>>>,
}

impl VolatileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend scoped to `namespace` over this table
    pub fn backend(&self, namespace: Namespace) -> VolatileBackend {
        VolatileBackend {
            table: self.clone(),
            namespace,
        }
    }

    /// Namespaces that currently hold at least one entry
    pub fn namespaces(&self) -> Vec<Namespace> {
        let inner = self.inner.read();
        let mut namespaces: Vec<Namespace> = inner
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(ns, _)| ns.clone())
            .collect();
        namespaces.sort();
        namespaces
    }

    /// Entry count for one namespace
    pub fn len(&self, namespace: &Namespace) -> usize {
        self.inner.read().get(namespace).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().values().all(HashMap::is_empty)
    }
}

/// [`CacheBackend`] over one namespace of a [`VolatileTable`]
#[derive(Debug, Clone)]
pub struct VolatileBackend {
    table: VolatileTable,
    namespace: Namespace,
}

impl CacheBackend for VolatileBackend {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn load(&self, key: &str) -> Option<CacheEntry> {
        self.table
            .inner
            .read()
            .get(&self.namespace)
            .and_then(|entries| entries.get(key))
            .cloned()
    }

    fn store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.table
            .inner
            .write()
            .entry(self.namespace.clone())
            .or_default()
            .insert(key.to_string(), entry);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if let Some(entries) = self.table.inner.write().get_mut(&self.namespace) {
            entries.remove(key);
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.table.inner.write().remove(&self.namespace);
        Ok(())
    }

    fn entries(&self) -> BTreeMap<String, CacheEntry> {
        self.table
            .inner
            .read()
            .get(&self.namespace)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
