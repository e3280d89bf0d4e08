//! # gridtable
//!
//! Header-keyed tables over rectangular regions of a remote spreadsheet:
//! - Region discovery by probing the header row and the start column
//! - Records as field-name to cell-value maps, mapped through the header
//! - Namespaced TTL cache in front of the store (in-memory or JSON file)
//! - Bottom-up positional writes so row deletions never shift a target
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TableManager                            │
//! │          get_headers / get_rows / insert / update / delete   │
//! └──────────┬──────────────────┬──────────────────┬────────────┘
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!     ┌─────────────┐   ┌───────────────┐   ┌─────────────┐
//!     │    Cache    │   │RegionResolver │   │  RowMapper  │
//!     │ (TTL, ns)   │   │   (probes)    │   │ (header map)│
//!     └──────┬──────┘   └───────┬───────┘   └─────────────┘
//!            │                  │
//!     ┌──────┴──────┐           ▼
//!     ▼             ▼   ┌───────────────┐
//! ┌────────┐  ┌────────┐│  ValueStore   │
//! │Volatile│  │Durable ││  (remote)     │
//! │ (RAM)  │  │ (JSON) │└───────────────┘
//! └────────┘  └────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod coord;
pub mod cache;
pub mod mapper;
pub mod store;
pub mod region;
pub mod table;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{GridError, Result};
pub use config::{CacheConfig, CacheMode, Config, ProbeConfig};
pub use cache::{Cache, CacheRegistry};
pub use coord::{CellRange, Column, TablePosition};
pub use mapper::{CellValue, FieldEquals, Record, RowFilter};
pub use store::{MemoryStore, ValueStore};
pub use table::TableManager;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of gridtable
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
