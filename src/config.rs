//! Configuration for gridtable
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{Namespace, DEFAULT_TTL};
use crate::coord::{Column, TablePosition};

/// Main configuration for a table manager
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Sheet Context
    // -------------------------------------------------------------------------
    /// Document identifier passed to every Value Store call
    pub spreadsheet_id: String,

    /// Name of the sheet holding the table
    pub sheet_name: String,

    /// Header cell of the table used when an operation names no position
    pub table_position: TablePosition,

    // -------------------------------------------------------------------------
    // Region Discovery
    // -------------------------------------------------------------------------
    pub probe: ProbeConfig,

    // -------------------------------------------------------------------------
    // Cache
    // -------------------------------------------------------------------------
    /// `None` disables caching entirely
    pub cache: Option<CacheConfig>,
}

/// Column probe windows used to find the right edge of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Last column of the short probe window
    pub short_end: Column,

    /// Last column of the wide probe window; also the widest table supported
    pub wide_end: Column,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            short_end: Column::literal("Z"),
            wide_end: Column::literal("IV"),
        }
    }
}

/// Where cached entries live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMode {
    /// Process memory; lost on restart
    Volatile,

    /// One JSON file per namespace under `dir`
    Durable { dir: PathBuf },
}

/// Cache settings for one table manager
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub mode: CacheMode,

    /// Entry lifetime
    pub ttl: Duration,

    /// Explicit namespace; generated per instance when `None`
    pub namespace: Option<Namespace>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::Volatile,
            ttl: DEFAULT_TTL,
            namespace: None,
        }
    }
}

impl CacheConfig {
    pub fn volatile() -> Self {
        Self::default()
    }

    pub fn durable(dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: CacheMode::Durable { dir: dir.into() },
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: String::new(),
            table_position: TablePosition::default(),
            probe: ProbeConfig::default(),
            cache: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the document identifier
    pub fn spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.config.spreadsheet_id = id.into();
        self
    }

    /// Set the sheet name
    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    /// Set the default table position
    pub fn table_position(mut self, position: TablePosition) -> Self {
        self.config.table_position = position;
        self
    }

    /// Set the column probe windows
    pub fn probe(mut self, probe: ProbeConfig) -> Self {
        self.config.probe = probe;
        self
    }

    /// Enable caching
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = Some(cache);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
