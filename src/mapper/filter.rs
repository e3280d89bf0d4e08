//! Row selection

use super::{CellValue, Record};

/// Predicate over records
///
/// Implemented for any `Fn(&Record) -> bool`.
pub trait RowFilter {
    fn matches(&self, record: &Record) -> bool;
}

impl<F> RowFilter for F
where
    F: Fn(&Record) -> bool,
{
    fn matches(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Matches records whose `field` renders to the same text as `value`
///
/// `Integer(7)` and `Text("7")` compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEquals {
    pub field: String,
    pub value: CellValue,
}

impl FieldEquals {
    pub fn new(field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl RowFilter for FieldEquals {
    fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .is_some_and(|v| v.to_string() == self.value.to_string())
    }
}

/// Matches every record
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAll;

impl RowFilter for MatchAll {
    fn matches(&self, _record: &Record) -> bool {
        true
    }
}
