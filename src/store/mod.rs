//! Store Module
//!
//! The Value Store contract: the remote, range-addressed spreadsheet
//! backend that tables are read from and written to.
//!
//! ## Calls
//! - `get(range)`                  -> cell matrix (trailing empties trimmed)
//! - `append(range, rows)`         -> status; rows land after the table at `range`
//! - `update(range, rows)`         -> status
//! - `batch_update_values([..])`   -> status; one call, many ranges
//! - `batch_update([deleteRange])` -> status; index-addressed row deletion
//! - `sheet_metadata()`            -> `[{name, id}]` in document order
//!
//! Transport and authentication are the implementor's concern.
//! [`MemoryStore`] is a complete local implementation.

mod memory;

use std::fmt;
use std::sync::Arc;

use crate::coord::CellRange;
use crate::error::{GridError, Result};
use crate::mapper::Row;

pub use memory::{MemoryStore, StoreRequest};

/// How written values are interpreted by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Stored as given
    Raw,

    /// Parsed as if typed into the sheet UI
    UserEntered,
}

/// Whether append inserts new rows or overwrites whatever follows the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertDataOption {
    InsertRows,
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOptions {
    pub value_input: ValueInputOption,
    pub insert_data: InsertDataOption,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            value_input: ValueInputOption::UserEntered,
            insert_data: InsertDataOption::InsertRows,
        }
    }
}

/// Rows destined for one range of a batched value update
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRange {
    pub range: CellRange,
    pub rows: Vec<Row>,
}

/// Delete the cells in a 0-based, end-exclusive rectangle and shift the
/// cells below it up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRange {
    pub sheet_id: i64,
    pub start_row_index: u32,
    pub end_row_index: u32,
    pub start_column_index: u32,
    pub end_column_index: u32,
}

/// One sheet of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetProperties {
    pub name: String,
    pub id: i64,
}

/// HTTP-style status returned by mutating calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStatus(pub u16);

impl StoreStatus {
    pub const OK: StoreStatus = StoreStatus(200);

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// `Ok(self)` for 2xx, otherwise a `Remote` error naming `operation`
    pub fn ensure(self, operation: &'static str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GridError::Remote {
                operation,
                status: self.0,
            })
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The remote spreadsheet backend
pub trait ValueStore: Send + Sync {
    /// Cell values of `range`, one vector per row
    ///
    /// Trailing empty cells of a row and trailing empty rows are omitted.
    /// An empty range yields an empty matrix.
    fn get(&self, spreadsheet_id: &str, range: &CellRange) -> Result<Vec<Vec<String>>>;

    fn append(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        rows: &[Row],
        options: AppendOptions,
    ) -> Result<StoreStatus>;

    fn update(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        rows: &[Row],
        value_input: ValueInputOption,
    ) -> Result<StoreStatus>;

    fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: &[ValueRange],
        value_input: ValueInputOption,
    ) -> Result<StoreStatus>;

    fn batch_update(&self, spreadsheet_id: &str, requests: &[DeleteRange]) -> Result<StoreStatus>;

    fn sheet_metadata(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>>;
}

impl<T: ValueStore + ?Sized> ValueStore for Arc<T> {
    fn get(&self, spreadsheet_id: &str, range: &CellRange) -> Result<Vec<Vec<String>>> {
        (**self).get(spreadsheet_id, range)
    }

    fn append(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        rows: &[Row],
        options: AppendOptions,
    ) -> Result<StoreStatus> {
        (**self).append(spreadsheet_id, range, rows, options)
    }

    fn update(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        rows: &[Row],
        value_input: ValueInputOption,
    ) -> Result<StoreStatus> {
        (**self).update(spreadsheet_id, range, rows, value_input)
    }

    fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: &[ValueRange],
        value_input: ValueInputOption,
    ) -> Result<StoreStatus> {
        (**self).batch_update_values(spreadsheet_id, data, value_input)
    }

    fn batch_update(&self, spreadsheet_id: &str, requests: &[DeleteRange]) -> Result<StoreStatus> {
        (**self).batch_update(spreadsheet_id, requests)
    }

    fn sheet_metadata(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>> {
        (**self).sheet_metadata(spreadsheet_id)
    }
}
