//! In-memory Value Store
//!
//! Keeps every document as a grid of strings and answers the Value Store
//! calls the way the remote backend does: trimmed reads, table-aware
//! appends that insert rows, and deletions that shift the cells below.
//! Every call is recorded so callers can inspect what was asked of the
//! store.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::coord::{CellRange, CellRef};
use crate::error::{GridError, Result};
use crate::mapper::Row;

use super::{
    AppendOptions, DeleteRange, InsertDataOption, SheetProperties, StoreStatus, ValueInputOption,
    ValueRange, ValueStore,
};

/// A call received by a [`MemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    Get { range: String },
    Append { range: String, rows: usize },
    Update { range: String },
    BatchUpdateValues { ranges: Vec<String> },
    DeleteRange(DeleteRange),
    SheetMetadata,
}

impl StoreRequest {
    /// Reads: `Get` and `SheetMetadata`
    pub fn is_read(&self) -> bool {
        matches!(self, StoreRequest::Get { .. } | StoreRequest::SheetMetadata)
    }
}

struct MemorySheet {
    name: String,
    id: i64,
    /// Row-major, 0-based; rows may be ragged
    cells: Vec<Vec<String>>,
}

impl MemorySheet {
    fn cell(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn set(&mut self, row: usize, col: usize, value: String) {
        if value.is_empty() && self.cell(row, col).is_empty() {
            return;
        }
        if self.cells.len() <= row {
            self.cells.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.cells[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value;
    }

    /// Any non-empty cell at or right of `col`
    fn row_has_data(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .is_some_and(|r| r.iter().skip(col).any(|c| !c.is_empty()))
    }

    fn write(&mut self, row: usize, col: usize, rows: &[Row]) {
        for (i, values) in rows.iter().enumerate() {
            for (j, value) in values.iter().enumerate() {
                self.set(row + i, col + j, value.to_string());
            }
        }
    }

    fn read(&self, start: &CellRef, end: &CellRef) -> Vec<Vec<String>> {
        let (r0, r1) = ((start.row as usize).saturating_sub(1), (end.row as usize).saturating_sub(1));
        let (c0, c1) = (start.column.index() as usize, end.column.index() as usize);

        let mut rows: Vec<Vec<String>> = (r0..=r1)
            .map(|r| {
                let mut row: Vec<String> = (c0..=c1).map(|c| self.cell(r, c).to_string()).collect();
                while row.last().is_some_and(String::is_empty) {
                    row.pop();
                }
                row
            })
            .collect();

        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        rows
    }

    /// Delete a 0-based, end-exclusive rectangle, shifting cells below it up
    /// within the same columns
    fn delete(&mut self, request: &DeleteRange) {
        let start_row = request.start_row_index as usize;
        let count = request.end_row_index.saturating_sub(request.start_row_index) as usize;
        if count == 0 {
            return;
        }
        let height = self.cells.len();
        for col in request.start_column_index as usize..request.end_column_index as usize {
            for row in start_row..height {
                let value = self.cell(row + count, col).to_string();
                self.set(row, col, value);
            }
        }
    }
}

#[derive(Default)]
struct State {
    documents: HashMap<String, Vec<MemorySheet>>,
    requests: Vec<StoreRequest>,
    /// Pending failures: (operation, status)
    injected: Vec<(&'static str, u16)>,
}

impl State {
    fn sheet_mut(&mut self, spreadsheet_id: &str, name: &str, operation: &'static str) -> Result<&mut MemorySheet> {
        let sheets = self
            .documents
            .get_mut(spreadsheet_id)
            .ok_or(GridError::Remote { operation, status: 404 })?;
        sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or(GridError::Remote { operation, status: 400 })
    }

    fn take_injected(&mut self, operation: &'static str) -> Result<()> {
        match self.injected.iter().position(|(op, _)| *op == operation) {
            Some(i) => {
                let (_, status) = self.injected.remove(i);
                StoreStatus(status).ensure(operation).map(|_| ())
            }
            None => Ok(()),
        }
    }
}

/// [`ValueStore`] held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty sheet to a document, creating the document if needed
    pub fn add_sheet(&self, spreadsheet_id: &str, name: &str, id: i64) {
        self.state
            .lock()
            .documents
            .entry(spreadsheet_id.to_string())
            .or_default()
            .push(MemorySheet {
                name: name.to_string(),
                id,
                cells: Vec::new(),
            });
    }

    /// Write `rows` with their top-left cell at `top_left` (e.g. `"A1"`)
    ///
    /// Not recorded as a request.
    pub fn write_cells(&self, spreadsheet_id: &str, sheet: &str, top_left: &str, rows: &[&[&str]]) -> Result<()> {
        let cell = CellRef::parse(top_left)?;
        let rows: Vec<Row> = rows
            .iter()
            .map(|r| r.iter().map(|s| (*s).into()).collect())
            .collect();

        let mut state = self.state.lock();
        let sheet = state.sheet_mut(spreadsheet_id, sheet, "write_cells")?;
        sheet.write((cell.row as usize).saturating_sub(1), cell.column.index() as usize, &rows);
        Ok(())
    }

    /// Every populated row of a sheet, trimmed like `get`
    pub fn sheet_values(&self, spreadsheet_id: &str, sheet: &str) -> Result<Vec<Vec<String>>> {
        let mut state = self.state.lock();
        let sheet = state.sheet_mut(spreadsheet_id, sheet, "sheet_values")?;
        let mut rows: Vec<Vec<String>> = sheet
            .cells
            .iter()
            .map(|row| {
                let mut row = row.clone();
                while row.last().is_some_and(String::is_empty) {
                    row.pop();
                }
                row
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }

    /// Make the next `operation` call (`"get"`, `"append"`, `"update"`,
    /// `"batch_update_values"`, `"batch_update"`, `"sheet_metadata"`) return
    /// `status` instead of running
    pub fn fail_next(&self, operation: &'static str, status: u16) {
        self.state.lock().injected.push((operation, status));
    }

    /// Calls received so far, oldest first
    pub fn requests(&self) -> Vec<StoreRequest> {
        self.state.lock().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().requests.clear();
    }

    /// Calls received so far that only read
    pub fn read_count(&self) -> usize {
        self.state.lock().requests.iter().filter(|r| r.is_read()).count()
    }
}

impl ValueStore for MemoryStore {
    fn get(&self, spreadsheet_id: &str, range: &CellRange) -> Result<Vec<Vec<String>>> {
        let mut state = self.state.lock();
        state.requests.push(StoreRequest::Get {
            range: range.to_string(),
        });
        state.take_injected("get")?;

        let sheet = state.sheet_mut(spreadsheet_id, &range.sheet, "get")?;
        let values = sheet.read(&range.start, range.end_cell());
        tracing::trace!(range = %range, rows = values.len(), "memory store get");
        Ok(values)
    }

    fn append(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        rows: &[Row],
        options: AppendOptions,
    ) -> Result<StoreStatus> {
        let mut state = self.state.lock();
        state.requests.push(StoreRequest::Append {
            range: range.to_string(),
            rows: rows.len(),
        });
        state.take_injected("append")?;

        let sheet = state.sheet_mut(spreadsheet_id, &range.sheet, "append")?;
        let col = range.start.column.index() as usize;
        let mut row = (range.start.row as usize).saturating_sub(1);
        while sheet.row_has_data(row, col) {
            row += 1;
        }

        if options.insert_data == InsertDataOption::InsertRows && row < sheet.cells.len() {
            for _ in 0..rows.len() {
                sheet.cells.insert(row, Vec::new());
            }
        }
        sheet.write(row, col, rows);
        tracing::trace!(range = %range, at_row = row + 1, rows = rows.len(), "memory store append");
        Ok(StoreStatus::OK)
    }

    fn update(
        &self,
        spreadsheet_id: &str,
        range: &CellRange,
        rows: &[Row],
        _value_input: ValueInputOption,
    ) -> Result<StoreStatus> {
        let mut state = self.state.lock();
        state.requests.push(StoreRequest::Update {
            range: range.to_string(),
        });
        state.take_injected("update")?;

        let sheet = state.sheet_mut(spreadsheet_id, &range.sheet, "update")?;
        sheet.write((range.start.row as usize).saturating_sub(1), range.start.column.index() as usize, rows);
        Ok(StoreStatus::OK)
    }

    fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: &[ValueRange],
        _value_input: ValueInputOption,
    ) -> Result<StoreStatus> {
        let mut state = self.state.lock();
        state.requests.push(StoreRequest::BatchUpdateValues {
            ranges: data.iter().map(|d| d.range.to_string()).collect(),
        });
        state.take_injected("batch_update_values")?;

        for value_range in data {
            let range = &value_range.range;
            let sheet = state.sheet_mut(spreadsheet_id, &range.sheet, "batch_update_values")?;
            sheet.write(
                (range.start.row as usize).saturating_sub(1),
                range.start.column.index() as usize,
                &value_range.rows,
            );
        }
        Ok(StoreStatus::OK)
    }

    fn batch_update(&self, spreadsheet_id: &str, requests: &[DeleteRange]) -> Result<StoreStatus> {
        let mut state = self.state.lock();
        state
            .requests
            .extend(requests.iter().copied().map(StoreRequest::DeleteRange));
        state.take_injected("batch_update")?;

        let sheets = state
            .documents
            .get_mut(spreadsheet_id)
            .ok_or(GridError::Remote {
                operation: "batch_update",
                status: 404,
            })?;
        for request in requests {
            let sheet = sheets
                .iter_mut()
                .find(|s| s.id == request.sheet_id)
                .ok_or(GridError::Remote {
                    operation: "batch_update",
                    status: 400,
                })?;
            sheet.delete(request);
        }
        Ok(StoreStatus::OK)
    }

    fn sheet_metadata(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>> {
        let mut state = self.state.lock();
        state.requests.push(StoreRequest::SheetMetadata);
        state.take_injected("sheet_metadata")?;

        let sheets = state.documents.get(spreadsheet_id).ok_or(GridError::Remote {
            operation: "sheet_metadata",
            status: 404,
        })?;
        Ok(sheets
            .iter()
            .map(|s| SheetProperties {
                name: s.name.clone(),
                id: s.id,
            })
            .collect())
    }
}
