//! Table Module
//!
//! The CRUD surface over one table of one sheet.
//!
//! ## Flow
//! ```text
//!  read:   key ──► Cache ──hit──► records
//!                    │ miss
//!                    ▼
//!            RegionResolver ──► ValueStore.get ──► RowMapper ──► Cache.set
//!
//!  write:  RowMapper ──► ValueStore.append/update/delete ──► Cache.delete(values key)
//! ```
//!
//! Positional writes (update, delete) address rows by absolute row number
//! and are always issued from the highest row to the lowest, so a deletion
//! never shifts a row that is still to be written.

mod fanout;
mod keys;
mod manager;

pub use manager::TableManager;
