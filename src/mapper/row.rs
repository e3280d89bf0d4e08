//! Row <-> record conversion

use super::{CellValue, Record};

/// Column names of a table, in column order
pub type Header = Vec<String>;

/// Cell values of one row, index-aligned to a header
pub type Row = Vec<CellValue>;

/// Converts rows for one header
#[derive(Debug, Clone, Copy)]
pub struct RowMapper<'a> {
    header: &'a [String],
}

impl<'a> RowMapper<'a> {
    pub fn new(header: &'a [String]) -> Self {
        Self { header }
    }

    pub fn header(&self) -> &'a [String] {
        self.header
    }

    /// One cell per header name; missing fields become empty cells
    pub fn serialize(&self, record: &Record) -> Row {
        self.header
            .iter()
            .map(|name| record.get(name).cloned().unwrap_or_default())
            .collect()
    }

    /// Map `row[i]` to `header[i]`
    ///
    /// Cells past the end of a short row are absent from the record.
    /// Returns `None` when the row holds no non-empty cell.
    pub fn deserialize(&self, row: &[String]) -> Option<Record> {
        let record: Record = self
            .header
            .iter()
            .zip(row)
            .map(|(name, cell)| (name.clone(), cell.clone()))
            .collect();

        if record.is_blank() {
            None
        } else {
            Some(record)
        }
    }

    /// Map a table body, keeping one record per row so positions stay
    /// aligned with row numbers
    ///
    /// A body that is a single empty row is an empty table.
    pub fn deserialize_rows(&self, rows: &[Vec<String>]) -> Vec<Record> {
        let records: Vec<Option<Record>> = rows.iter().map(|row| self.deserialize(row)).collect();

        if let [None] = records.as_slice() {
            return Vec::new();
        }

        records.into_iter().map(Option::unwrap_or_default).collect()
    }
}

/// Shallow copy with every all-digit text field turned into an integer
///
/// Applied to rows about to be written by an update, never to reads.
pub fn coerce_numeric_strings(record: &Record) -> Record {
    record
        .iter()
        .map(|(field, value)| {
            let coerced = match value {
                CellValue::Text(s) => s
                    .parse::<i64>()
                    .map(CellValue::Integer)
                    .unwrap_or_else(|_| value.clone()),
                CellValue::Integer(_) => value.clone(),
            };
            (field.clone(), coerced)
        })
        .collect()
}
