//! Durable backend
//!
//! One JSON file per namespace:
//! ```text
//! {dir}/
//!   └── {namespace}.json    { "<key>": { "lastUpdate": <ms>, "data": <any> }, ... }
//! ```
//! Every operation reads the whole file, mutates it in memory and writes it
//! back whole. The in-process lock serializes that cycle; separate processes
//! sharing one file are not coordinated.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{GridError, Result};

use super::{CacheBackend, CacheEntry, Namespace};

type Blob = BTreeMap<String, CacheEntry>;

/// [`CacheBackend`] persisting one namespace to `{dir}/{namespace}.json`
#[derive(Debug)]
pub struct DurableBackend {
    namespace: Namespace,

    /// Backing file
    path: PathBuf,

    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl DurableBackend {
    const EXTENSION: &'static str = "json";

    /// Open the backend, creating `dir` if needed
    ///
    /// An existing file for the namespace is kept and read lazily.
    pub fn open(dir: &Path, namespace: Namespace) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| GridError::CacheWrite {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = Self::file_path(dir, &namespace);
        tracing::debug!(namespace = %namespace, path = %path.display(), "opened durable cache");

        Ok(Self {
            namespace,
            path,
            lock: Mutex::new(()),
        })
    }

    /// Path of the file backing `namespace` inside `dir`
    pub fn file_path(dir: &Path, namespace: &Namespace) -> PathBuf {
        dir.join(format!("{}.{}", namespace, Self::EXTENSION))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Namespaces with a backing file in `dir`
    pub fn namespaces_in(dir: &Path) -> Result<Vec<Namespace>> {
        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(GridError::Config(format!(
                    "cannot list cache directory {}: {source}",
                    dir.display()
                )))
            }
        };

        let mut namespaces = Vec::new();
        for entry in read_dir.flatten() {
            let file_path = entry.path();
            if file_path.extension().and_then(|e| e.to_str()) != Some(Self::EXTENSION) {
                continue;
            }
            if let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) {
                if let Ok(namespace) = Namespace::new(stem) {
                    namespaces.push(namespace);
                }
            }
        }
        namespaces.sort();
        Ok(namespaces)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Read the whole blob. Missing or corrupt files read as empty.
    fn read_blob(&self) -> Blob {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Blob::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache read failed, treating as miss");
                return Blob::new();
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Blob::new();
        }

        match serde_json::from_slice(&bytes) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt cache file, treating as miss");
                Blob::new()
            }
        }
    }

    fn write_blob(&self, blob: &Blob) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(blob)?;
        fs::write(&self.path, bytes).map_err(|source| GridError::CacheWrite {
            path: self.path.clone(),
            source,
        })
    }
}

impl CacheBackend for DurableBackend {
    fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn load(&self, key: &str) -> Option<CacheEntry> {
        let _guard = self.lock.lock();
        self.read_blob().remove(key)
    }

    fn store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        let _guard = self.lock.lock();
        let mut blob = self.read_blob();
        blob.insert(key.to_string(), entry);
        self.write_blob(&blob)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut blob = self.read_blob();
        if blob.remove(key).is_none() {
            return Ok(());
        }
        self.write_blob(&blob)
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(GridError::CacheWrite {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn entries(&self) -> BTreeMap<String, CacheEntry> {
        let _guard = self.lock.lock();
        self.read_blob()
    }
}
