//! Cache keys
//!
//! Keys are scoped by document, sheet and table position; the namespace
//! scopes the rest. `doc-1/Sales!A3:headers`, `doc-1/Sales!A3:values`.

use crate::coord::TablePosition;

pub(crate) const HEADERS: &str = "headers";
pub(crate) const VALUES: &str = "values";

pub(crate) fn key(spreadsheet_id: &str, sheet: &str, position: &TablePosition, kind: &str) -> String {
    format!("{}/{}!{}:{}", spreadsheet_id, sheet, position.a1(), kind)
}

pub(crate) fn headers(spreadsheet_id: &str, sheet: &str, position: &TablePosition) -> String {
    key(spreadsheet_id, sheet, position, HEADERS)
}

pub(crate) fn values(spreadsheet_id: &str, sheet: &str, position: &TablePosition) -> String {
    key(spreadsheet_id, sheet, position, VALUES)
}
