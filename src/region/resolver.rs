//! Region resolver
//!
//! Boundary discovery for one sheet of one document.

use crate::config::ProbeConfig;
use crate::coord::{CellRange, CellRef, Column, TablePosition};
use crate::error::{GridError, Result};
use crate::mapper::Header;
use crate::store::{SheetProperties, ValueStore};

/// The rectangle a table occupies: header row plus body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    /// Header cell
    pub start: TablePosition,

    /// One column past the last header cell
    pub end_letter: Column,

    /// Last populated row; equals `start.number` for a header-only table
    /// and `start.number - 1` when there is no header
    pub end_row_number: u32,
}

impl TableRegion {
    /// Header row, `start` through `end_letter`
    pub fn header_range(&self, sheet: &str) -> CellRange {
        CellRange::row(sheet, CellRef::from(&self.start), self.end_letter.clone())
    }

    /// Body rows below the header, or `None` if the table has no body
    pub fn body_range(&self, sheet: &str) -> Option<CellRange> {
        let first = self.start.number.checked_add(1)?;
        if self.end_row_number < first {
            return None;
        }
        Some(CellRange::new(
            sheet,
            CellRef::new(self.start.letter.clone(), first),
            CellRef::new(self.end_letter.clone(), self.end_row_number),
        ))
    }

    /// Number of body rows
    pub fn body_len(&self) -> u32 {
        self.end_row_number.saturating_sub(self.start.number)
    }
}

/// Finds table boundaries by reading from the store
pub struct RegionResolver<'a, S: ?Sized> {
    store: &'a S,
    spreadsheet_id: &'a str,
    sheet_name: &'a str,
    probe: &'a ProbeConfig,
}

impl<'a, S: ValueStore + ?Sized> RegionResolver<'a, S> {
    pub fn new(store: &'a S, spreadsheet_id: &'a str, sheet_name: &'a str, probe: &'a ProbeConfig) -> Self {
        Self {
            store,
            spreadsheet_id,
            sheet_name,
            probe,
        }
    }

    /// The column just past the last occupied cell of the header row
    ///
    /// Probes `start..short_end` first. Only when every cell of that window
    /// is occupied does it probe `start..wide_end`. A full wide window is
    /// `RegionLimitExceeded`.
    pub fn resolve_last_column(&self, start: &TablePosition) -> Result<Column> {
        let short_width = start.letter.span_to(&self.probe.short_end);
        if short_width > 0 {
            let occupied = self.occupied_cells(start, &self.probe.short_end)?;
            tracing::debug!(start = %start, window = %self.probe.short_end, occupied, "short column probe");
            if occupied < short_width {
                return Ok(start.letter.add(occupied));
            }
        }

        let wide_width = start.letter.span_to(&self.probe.wide_end);
        let occupied = if wide_width > 0 {
            self.occupied_cells(start, &self.probe.wide_end)?
        } else {
            0
        };
        tracing::debug!(start = %start, window = %self.probe.wide_end, occupied, "wide column probe");

        if wide_width == 0 || occupied >= wide_width {
            return Err(GridError::RegionLimitExceeded {
                start: start.to_string(),
                limit: self.probe.wide_end.to_string(),
            });
        }
        Ok(start.letter.add(occupied))
    }

    /// Count of consecutive occupied cells down the start column, header included
    pub fn resolve_last_row(&self, start: &TablePosition) -> Result<u32> {
        let mut count = 0u32;
        let mut row = start.number;
        loop {
            let range = CellRange::cell(self.sheet_name, CellRef::new(start.letter.clone(), row));
            let values = self.store.get(self.spreadsheet_id, &range)?;
            let occupied = values
                .first()
                .and_then(|r| r.first())
                .is_some_and(|cell| !cell.is_empty());
            if !occupied {
                break;
            }
            count += 1;
            row = match row.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }
        tracing::debug!(start = %start, rows = count, "row probe");
        Ok(count)
    }

    /// Header row of the table at `start`; empty when there is none
    pub fn resolve_headers(&self, start: &TablePosition) -> Result<Header> {
        let end = self.resolve_last_column(start)?;
        let range = CellRange::row(self.sheet_name, CellRef::from(start), end);
        let values = self.store.get(self.spreadsheet_id, &range)?;
        Ok(values.into_iter().next().unwrap_or_default())
    }

    /// Full extent of the table at `start`
    pub fn resolve_region(&self, start: &TablePosition) -> Result<TableRegion> {
        let end_letter = self.resolve_last_column(start)?;
        let rows = self.resolve_last_row(start)?;
        Ok(TableRegion {
            start: start.clone(),
            end_letter,
            end_row_number: start.number.saturating_add(rows).saturating_sub(1),
        })
    }

    /// Position and properties of the sheet named `name`
    pub fn resolve_sheet(&self, name: &str) -> Result<Option<(usize, SheetProperties)>> {
        let sheets = self.store.sheet_metadata(self.spreadsheet_id)?;
        Ok(sheets.into_iter().enumerate().find(|(_, sheet)| sheet.name == name))
    }

    /// Position of the sheet named `name` among all sheets
    ///
    /// Returns `0` both for the first sheet and for a name with no match.
    /// Use [`resolve_sheet`](Self::resolve_sheet) to tell the two apart.
    pub fn resolve_sheet_index(&self, name: &str) -> Result<usize> {
        match self.resolve_sheet(name)? {
            Some((index, _)) => Ok(index),
            None => {
                tracing::warn!(sheet = name, "sheet not found, defaulting to index 0");
                Ok(0)
            }
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Non-empty cells in the header row from `start` through `end`
    fn occupied_cells(&self, start: &TablePosition, end: &Column) -> Result<u32> {
        let range = CellRange::row(self.sheet_name, CellRef::from(start), end.clone());
        let values = self.store.get(self.spreadsheet_id, &range)?;
        let count = values
            .first()
            .map_or(0, |row| row.iter().filter(|cell| !cell.is_empty()).count());
        Ok(count as u32)
    }
}
