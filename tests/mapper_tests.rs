//! Tests for row/record mapping
//!
//! These tests verify:
//! - Serialization follows header order and fills missing fields
//! - Deserialization of short rows, blank rows and table bodies
//! - Numeric coercion of merged update rows
//! - Record filters

use gridtable::mapper::{coerce_numeric_strings, CellValue, FieldEquals, MatchAll, Record, RowFilter, RowMapper};

// =============================================================================
// Helper Functions
// =============================================================================

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Serialize Tests
// =============================================================================

#[test]
fn test_serialize_follows_header_order() {
    let header = header(&["id", "name", "status"]);
    let mapper = RowMapper::new(&header);

    let record = Record::new().with("status", "open").with("id", "7").with("name", "Ana");
    let cells: Vec<String> = mapper.serialize(&record).iter().map(|c| c.to_string()).collect();
    assert_eq!(cells, vec!["7", "Ana", "open"]);
}

#[test]
fn test_serialize_missing_field_is_empty() {
    let header = header(&["id", "name"]);
    let mapper = RowMapper::new(&header);

    let out = mapper.serialize(&Record::new().with("name", "x"));
    assert_eq!(out, vec![CellValue::default(), CellValue::from("x")]);
}

#[test]
fn test_serialize_ignores_unknown_fields() {
    let header = header(&["id"]);
    let mapper = RowMapper::new(&header);

    let out = mapper.serialize(&Record::new().with("id", 3i64).with("extra", "dropped"));
    assert_eq!(out, vec![CellValue::Integer(3)]);
}

// =============================================================================
// Deserialize Tests
// =============================================================================

#[test]
fn test_deserialize_full_row() {
    let header = header(&["id", "name"]);
    let mapper = RowMapper::new(&header);

    let record = mapper.deserialize(&row(&["1", "x"])).unwrap();
    assert_eq!(record, Record::new().with("id", "1").with("name", "x"));
}

#[test]
fn test_deserialize_short_row_omits_trailing_fields() {
    let header = header(&["id", "name", "status"]);
    let mapper = RowMapper::new(&header);

    let record = mapper.deserialize(&row(&["1"])).unwrap();
    assert_eq!(record.len(), 1);
    assert!(!record.contains("name"));
}

#[test]
fn test_deserialize_blank_row_is_none() {
    let header = header(&["id", "name"]);
    let mapper = RowMapper::new(&header);

    assert!(mapper.deserialize(&row(&[])).is_none());
    assert!(mapper.deserialize(&row(&["", ""])).is_none());
}

#[test]
fn test_deserialize_rows_single_blank_is_empty_table() {
    let header = header(&["id"]);
    let mapper = RowMapper::new(&header);

    assert!(mapper.deserialize_rows(&[row(&[])]).is_empty());
    assert!(mapper.deserialize_rows(&[]).is_empty());
}

#[test]
fn test_deserialize_rows_keeps_positions() {
    let header = header(&["id", "name"]);
    let mapper = RowMapper::new(&header);

    let records = mapper.deserialize_rows(&[row(&["1", "a"]), row(&[]), row(&["3", "c"])]);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].get("id").unwrap(), "1");
    assert!(records[1].is_empty());
    assert_eq!(records[2].get("id").unwrap(), "3");
}

#[test]
fn test_reads_are_always_text() {
    let header = header(&["n"]);
    let mapper = RowMapper::new(&header);

    let record = mapper.deserialize(&row(&["42"])).unwrap();
    assert_eq!(record.get("n"), Some(&CellValue::Text("42".to_string())));
}

// =============================================================================
// Merge and Coercion Tests
// =============================================================================

#[test]
fn test_merge_patch_wins() {
    let existing = Record::new().with("id", "1").with("status", "open");
    let patch = Record::new().with("status", "closed").with("note", "n");

    let merged = existing.merged(&patch);
    assert_eq!(merged.get("id").unwrap(), "1");
    assert_eq!(merged.get("status").unwrap(), "closed");
    assert_eq!(merged.get("note").unwrap(), "n");
}

#[test]
fn test_coerce_numeric_strings() {
    let record = Record::new()
        .with("id", "12")
        .with("neg", "-3")
        .with("phone", "+15551234")
        .with("name", "x12")
        .with("blank", "")
        .with("float", "1.5")
        .with("int", 9i64);

    let coerced = coerce_numeric_strings(&record);
    assert_eq!(coerced.get("id"), Some(&CellValue::Integer(12)));
    assert_eq!(coerced.get("neg"), Some(&CellValue::Integer(-3)));
    // Leading plus parses like any integer
    assert_eq!(coerced.get("phone"), Some(&CellValue::Integer(15551234)));
    assert_eq!(coerced.get("name").unwrap(), "x12");
    assert_eq!(coerced.get("blank").unwrap(), "");
    assert_eq!(coerced.get("float").unwrap(), "1.5");
    assert_eq!(coerced.get("int"), Some(&CellValue::Integer(9)));

    assert_eq!(record.get("id").unwrap(), "12", "input left untouched");
}

#[test]
fn test_record_json_shape() {
    let record = Record::new().with("id", 1i64).with("name", "x");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json, serde_json::json!({"id": 1, "name": "x"}));

    let back: Record = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
}

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_field_equals_compares_text_forms() {
    let filter = FieldEquals::new("id", 7i64);
    assert!(filter.matches(&Record::new().with("id", "7")));
    assert!(filter.matches(&Record::new().with("id", 7i64)));
    assert!(!filter.matches(&Record::new().with("id", "8")));
    assert!(!filter.matches(&Record::new()));
}

#[test]
fn test_closure_filter() {
    let filter = |r: &Record| r.get("status").is_some_and(|v| v == "open");
    assert!(filter.matches(&Record::new().with("status", "open")));
    assert!(!filter.matches(&Record::new().with("status", "done")));
}

#[test]
fn test_match_all() {
    assert!(MatchAll.matches(&Record::new()));
}
