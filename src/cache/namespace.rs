//! Cache namespaces
//!
//! A namespace isolates one table manager's cached data from every other.
//! It doubles as the durable backend's file stem, so the character set is
//! restricted.

use std::fmt;
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{GridError, Result};

/// Instances generated so far by this process
static GENERATED: AtomicU64 = AtomicU64::new(0);

/// Longest accepted namespace
const MAX_NAMESPACE_LEN: usize = 128;

/// Validated cache namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_NAMESPACE_LEN {
            return Err(GridError::Config(format!(
                "namespace must be 1..={MAX_NAMESPACE_LEN} characters, got {}",
                name.len()
            )));
        }
        if name.starts_with('.') {
            return Err(GridError::Config(format!(
                "namespace may not start with '.': {name:?}"
            )));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        {
            return Err(GridError::Config(format!(
                "namespace may only contain [A-Za-z0-9_.-]: {name:?}"
            )));
        }
        Ok(Self(name))
    }

    /// A namespace unique to this process and call
    ///
    /// Combines the process id, the current time and a per-process counter.
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let seq = GENERATED.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}-{}", process::id(), nanos, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Namespace {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
