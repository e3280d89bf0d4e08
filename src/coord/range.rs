//! A1 range strings
//!
//! `"<sheet>!<letter><row>:<letter><row>"`, or a single cell `"<sheet>!A1"`.

use std::fmt;
use std::str::FromStr;

use crate::error::{GridError, Result};

use super::{Column, TablePosition};

/// One cell in A1 form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub column: Column,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: Column, row: u32) -> Self {
        Self { column, row }
    }

    /// Parse `"AB12"`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| GridError::AddressParse(format!("missing row in cell {s:?}")))?;
        let (letters, digits) = s.split_at(split);

        let column = Column::parse(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| GridError::AddressParse(format!("invalid row in cell {s:?}")))?;
        if row == 0 {
            return Err(GridError::AddressParse(format!("row 0 in cell {s:?}")));
        }
        Ok(Self { column, row })
    }
}

impl From<&TablePosition> for CellRef {
    fn from(position: &TablePosition) -> Self {
        Self::new(position.letter.clone(), position.number)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// A sheet-qualified rectangular range, inclusive on both ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub sheet: String,
    pub start: CellRef,
    /// `None` for a single-cell range
    pub end: Option<CellRef>,
}

impl CellRange {
    pub fn new(sheet: impl Into<String>, start: CellRef, end: CellRef) -> Self {
        Self {
            sheet: sheet.into(),
            start,
            end: Some(end),
        }
    }

    pub fn cell(sheet: impl Into<String>, cell: CellRef) -> Self {
        Self {
            sheet: sheet.into(),
            start: cell,
            end: None,
        }
    }

    /// Single row from `start` through `end_column`
    pub fn row(sheet: impl Into<String>, start: CellRef, end_column: Column) -> Self {
        let end = CellRef::new(end_column, start.row);
        Self::new(sheet, start, end)
    }

    /// Last cell of the range (the start cell for single-cell ranges)
    pub fn end_cell(&self) -> &CellRef {
        self.end.as_ref().unwrap_or(&self.start)
    }

    pub fn parse(s: &str) -> Result<Self> {
        let (sheet, cells) = s
            .rsplit_once('!')
            .ok_or_else(|| GridError::AddressParse(format!("missing sheet in range {s:?}")))?;
        if sheet.is_empty() {
            return Err(GridError::AddressParse(format!("empty sheet name in {s:?}")));
        }

        match cells.split_once(':') {
            Some((start, end)) => Ok(Self::new(sheet, CellRef::parse(start)?, CellRef::parse(end)?)),
            None => Ok(Self::cell(sheet, CellRef::parse(cells)?)),
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.end {
            Some(end) => write!(f, "{}!{}:{}", self.sheet, self.start, end),
            None => write!(f, "{}!{}", self.sheet, self.start),
        }
    }
}

impl FromStr for CellRange {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
