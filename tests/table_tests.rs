//! Tests for TableManager
//!
//! These tests verify:
//! - Insert, read and delete round through the store and the cache
//! - Deletions run bottom-up so every request hits its intended row
//! - Updates touch only matching rows, in one batched write
//! - Cache hits avoid remote reads, and writes drop the cached rows
//! - Invalid positions fail before any remote call
//! - Remote failures reach the caller

use std::time::Duration;

use gridtable::cache::{ManualClock, Namespace};
use gridtable::coord::CellRange;
use gridtable::mapper::{CellValue, MatchAll, Row};
use gridtable::store::{
    AppendOptions, DeleteRange, MemoryStore, SheetProperties, StoreRequest, StoreStatus,
    ValueInputOption, ValueRange, ValueStore,
};
use gridtable::{
    CacheConfig, CacheRegistry, Config, FieldEquals, GridError, Record, Result, TableManager,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const DOC: &str = "doc-1";
const SHEET: &str = "Sheet1";
const SHEET_ID: i64 = 100;

fn config() -> Config {
    Config::builder()
        .spreadsheet_id(DOC)
        .sheet_name(SHEET)
        .cache(CacheConfig::volatile().with_namespace(Namespace::new("tests").unwrap()))
        .build()
}

fn seeded_store(rows: &[&[&str]]) -> MemoryStore {
    let store = MemoryStore::new();
    store.add_sheet(DOC, SHEET, SHEET_ID);
    store.write_cells(DOC, SHEET, "A1", rows).unwrap();
    store
}

fn setup(rows: &[&[&str]]) -> (TableManager<MemoryStore>, ManualClock) {
    let clock = ManualClock::new(1_000_000);
    let registry = CacheRegistry::with_clock(clock.clone());
    let manager = TableManager::open(seeded_store(rows), &config(), &registry).unwrap();
    (manager, clock)
}

fn ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.get("id").map(|v| v.to_string()).unwrap_or_default())
        .collect()
}

fn cached_keys(manager: &TableManager<MemoryStore>) -> Vec<String> {
    manager.cache().unwrap().entries().into_keys().collect()
}

/// Ten-row table: header on row 1, ids `r2`..`r10` on the row they occupy
fn numbered_table() -> Vec<Vec<String>> {
    let mut rows = vec![vec!["id".to_string(), "name".to_string()]];
    for n in 2..=10 {
        rows.push(vec![format!("r{}", n), format!("n{}", n)]);
    }
    rows
}

fn setup_numbered() -> (TableManager<MemoryStore>, ManualClock) {
    let table = numbered_table();
    let rows: Vec<Vec<&str>> = table.iter().map(|r| r.iter().map(String::as_str).collect()).collect();
    let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
    setup(&rows)
}

/// Store whose metadata never lists any sheet
struct NoSheets(MemoryStore);

impl ValueStore for NoSheets {
    fn get(&self, spreadsheet_id: &str, range: &CellRange) -> Result<Vec<Vec<String>>> {
        self.0.get(spreadsheet_id, range)
    }

    fn append(&self, spreadsheet_id: &str, range: &CellRange, rows: &[Row], options: AppendOptions) -> Result<StoreStatus> {
        self.0.append(spreadsheet_id, range, rows, options)
    }

    fn update(&self, spreadsheet_id: &str, range: &CellRange, rows: &[Row], value_input: ValueInputOption) -> Result<StoreStatus> {
        self.0.update(spreadsheet_id, range, rows, value_input)
    }

    fn batch_update_values(&self, spreadsheet_id: &str, data: &[ValueRange], value_input: ValueInputOption) -> Result<StoreStatus> {
        self.0.batch_update_values(spreadsheet_id, data, value_input)
    }

    fn batch_update(&self, spreadsheet_id: &str, requests: &[DeleteRange]) -> Result<StoreStatus> {
        self.0.batch_update(spreadsheet_id, requests)
    }

    fn sheet_metadata(&self, _spreadsheet_id: &str) -> Result<Vec<SheetProperties>> {
        Ok(Vec::new())
    }
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[test]
fn test_insert_get_delete_round_trip() {
    let (manager, _clock) = setup(&[&["id", "name"]]);

    let inserted = manager
        .insert_rows(None, &[Record::new().with("id", "1").with("name", "x")])
        .unwrap();
    assert_eq!(inserted, 1);

    let rows = manager.get_rows(None, None).unwrap();
    assert_eq!(rows, vec![Record::new().with("id", "1").with("name", "x")]);

    let deleted = manager.delete_rows(None, &FieldEquals::new("id", "1")).unwrap();
    assert_eq!(deleted, 1);

    assert!(manager.get_rows(None, None).unwrap().is_empty());
}

#[test]
fn test_get_headers() {
    let (manager, _clock) = setup(&[&["id", "name", "status"], &["1", "a", "open"]]);
    assert_eq!(manager.get_headers(None).unwrap(), vec!["id", "name", "status"]);
}

#[test]
fn test_get_rows_with_filter() {
    let (manager, _clock) = setup(&[
        &["id", "status"],
        &["1", "open"],
        &["2", "done"],
        &["3", "open"],
    ]);

    let open = manager
        .get_rows(None, Some(&FieldEquals::new("status", "open")))
        .unwrap();
    assert_eq!(ids(&open), vec!["1", "3"]);

    // The cached copy stays unfiltered
    assert_eq!(manager.get_rows(None, None).unwrap().len(), 3);
}

#[test]
fn test_empty_table_reads_as_empty() {
    let (manager, _clock) = setup(&[&["id", "name"]]);
    assert!(manager.get_rows(None, None).unwrap().is_empty());
}

#[test]
fn test_short_rows_omit_fields() {
    let (manager, _clock) = setup(&[&["id", "name", "note"], &["1", "a"], &["2", "b", "n"]]);

    let rows = manager.get_rows(None, None).unwrap();
    assert!(!rows[0].contains("note"));
    assert_eq!(rows[1].get("note").unwrap(), "n");
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_runs_highest_row_first() {
    let (manager, _clock) = setup_numbered();
    manager.store().clear_requests();

    let filter = |r: &Record| matches!(r.get("id").and_then(CellValue::as_text), Some("r3" | "r7" | "r9"));
    assert_eq!(manager.delete_rows(None, &filter).unwrap(), 3);

    let deletes: Vec<DeleteRange> = manager
        .store()
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            StoreRequest::DeleteRange(d) => Some(d),
            _ => None,
        })
        .collect();
    let rows: Vec<u32> = deletes.iter().map(|d| d.end_row_index).collect();
    assert_eq!(rows, vec![9, 7, 3]);

    for d in &deletes {
        assert_eq!(d.sheet_id, SHEET_ID);
        assert_eq!(d.start_row_index + 1, d.end_row_index);
        assert_eq!(d.start_column_index, 0);
        assert_eq!(d.end_column_index, 3);
    }
}

#[test]
fn test_delete_result_matches_fresh_read() {
    let (manager, _clock) = setup_numbered();

    let filter = |r: &Record| matches!(r.get("id").and_then(CellValue::as_text), Some("r3" | "r7" | "r9"));
    manager.delete_rows(None, &filter).unwrap();

    let expected = vec!["r2", "r4", "r5", "r6", "r8", "r10"];
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), expected);

    let sheet = manager.store().sheet_values(DOC, SHEET).unwrap();
    let column_a: Vec<&str> = sheet.iter().skip(1).map(|r| r[0].as_str()).collect();
    assert_eq!(column_a, expected);

    // Names moved with their ids
    assert_eq!(sheet[2], vec!["r4", "n4"]);
}

#[test]
fn test_delete_no_match_issues_no_requests() {
    let (manager, _clock) = setup(&[&["id"], &["1"]]);
    manager.get_rows(None, None).unwrap();
    manager.store().clear_requests();

    assert_eq!(manager.delete_rows(None, &FieldEquals::new("id", "nope")).unwrap(), 0);
    assert!(manager.store().requests().is_empty());
}

#[test]
fn test_delete_unknown_sheet_is_error() {
    let store = NoSheets(seeded_store(&[&["id"], &["1"]]));
    let manager = TableManager::new(store, &config());

    let err = manager.delete_rows(None, &MatchAll).unwrap_err();
    assert!(matches!(err, GridError::SheetNotFound(ref name) if name == SHEET), "{}", err);

    let deletes = manager
        .store()
        .0
        .requests()
        .into_iter()
        .filter(|r| matches!(r, StoreRequest::DeleteRange(_)))
        .count();
    assert_eq!(deletes, 0);
}

#[test]
fn test_failed_delete_still_drops_cached_rows() {
    let (manager, _clock) = setup(&[&["id"], &["1"], &["2"]]);
    manager.get_rows(None, None).unwrap();
    assert!(cached_keys(&manager).contains(&"doc-1/Sheet1!A1:values".to_string()));

    manager.store().fail_next("batch_update", 500);
    let err = manager.delete_rows(None, &MatchAll).unwrap_err();
    assert!(matches!(err, GridError::Remote { operation: "batch_update", status: 500 }));

    assert!(!cached_keys(&manager).contains(&"doc-1/Sheet1!A1:values".to_string()));
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_touches_only_matching_rows() {
    let (manager, _clock) = setup(&[
        &["id", "name", "status"],
        &["1", "a", "open"],
        &["2", "b", "done"],
        &["3", "c", "open"],
    ]);
    let before = manager.store().sheet_values(DOC, SHEET).unwrap();

    let patch = Record::new().with("status", "closed");
    let updated = manager
        .update_rows(None, &FieldEquals::new("status", "open"), &patch)
        .unwrap();
    assert_eq!(updated, 2);

    let after = manager.store().sheet_values(DOC, SHEET).unwrap();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2], "non-matching row unchanged");
    assert_eq!(after[1], vec!["1", "a", "closed"]);
    assert_eq!(after[3], vec!["3", "c", "closed"]);
}

#[test]
fn test_update_is_one_batch_highest_row_first() {
    let (manager, _clock) = setup(&[
        &["id", "status"],
        &["1", "open"],
        &["2", "done"],
        &["3", "open"],
    ]);
    manager.store().clear_requests();

    manager
        .update_rows(None, &FieldEquals::new("status", "open"), &Record::new().with("status", "x"))
        .unwrap();

    let batches: Vec<Vec<String>> = manager
        .store()
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            StoreRequest::BatchUpdateValues { ranges } => Some(ranges),
            _ => None,
        })
        .collect();
    assert_eq!(batches, vec![vec!["Sheet1!A4:C4".to_string(), "Sheet1!A2:C2".to_string()]]);
}

#[test]
fn test_update_reads_back_merged_values() {
    let (manager, _clock) = setup(&[&["id", "qty"], &["1", "5"], &["2", "7"]]);

    manager
        .update_rows(None, &FieldEquals::new("id", 2i64), &Record::new().with("qty", "8"))
        .unwrap();

    let rows = manager.get_rows(None, None).unwrap();
    assert_eq!(rows[1], Record::new().with("id", "2").with("qty", "8"));
    assert_eq!(rows[0], Record::new().with("id", "1").with("qty", "5"));
}

#[test]
fn test_update_no_match_writes_nothing() {
    let (manager, _clock) = setup(&[&["id"], &["1"]]);
    manager.store().clear_requests();

    let updated = manager
        .update_rows(None, &FieldEquals::new("id", "9"), &Record::new().with("id", "10"))
        .unwrap();
    assert_eq!(updated, 0);
    assert!(manager.store().requests().iter().all(StoreRequest::is_read));
}

// =============================================================================
// Insert Tests
// =============================================================================

#[test]
fn test_insert_appends_at_table_position() {
    let (manager, _clock) = setup(&[&["id", "name"], &["1", "a"]]);
    manager.get_headers(None).unwrap();
    manager.store().clear_requests();

    let records = vec![
        Record::new().with("id", "2").with("name", "b"),
        Record::new().with("name", "c"),
    ];
    assert_eq!(manager.insert_rows(None, &records).unwrap(), 2);

    assert_eq!(
        manager.store().requests(),
        vec![StoreRequest::Append {
            range: "Sheet1!A1".to_string(),
            rows: 2,
        }]
    );
    assert_eq!(
        manager.store().sheet_values(DOC, SHEET).unwrap(),
        vec![vec!["id", "name"], vec!["1", "a"], vec!["2", "b"], vec!["", "c"]]
    );
}

#[test]
fn test_insert_nothing_is_noop() {
    let (manager, _clock) = setup(&[&["id"]]);
    assert_eq!(manager.insert_rows(None, &[]).unwrap(), 0);
    assert!(manager.store().requests().is_empty());
}

#[test]
fn test_insert_without_header_is_error() {
    let (manager, _clock) = setup(&[]);

    let err = manager
        .insert_rows(None, &[Record::new().with("id", "1")])
        .unwrap_err();
    assert!(matches!(err, GridError::MissingHeader(_)), "{}", err);
    assert!(manager.store().requests().iter().all(StoreRequest::is_read));
}

// =============================================================================
// Cache Tests
// =============================================================================

#[test]
fn test_cache_hit_makes_no_remote_reads() {
    let (manager, _clock) = setup(&[&["id", "name"], &["1", "a"], &["2", "b"]]);

    let first = manager.get_rows(None, None).unwrap();
    let reads = manager.store().read_count();
    assert!(reads > 0);

    let second = manager.get_rows(None, None).unwrap();
    manager.get_headers(None).unwrap();
    assert_eq!(second, first);
    assert_eq!(manager.store().read_count(), reads);
}

#[test]
fn test_cache_keys_name_sheet_and_position() {
    let (manager, _clock) = setup(&[&["id"], &["1"]]);
    manager.get_rows(None, None).unwrap();

    assert_eq!(cached_keys(&manager), vec!["doc-1/Sheet1!A1:headers", "doc-1/Sheet1!A1:values"]);
}

#[test]
fn test_write_invalidates_rows_but_not_headers() {
    let (manager, _clock) = setup(&[&["id", "name"], &["1", "a"]]);
    assert_eq!(manager.get_rows(None, None).unwrap().len(), 1);

    manager
        .insert_rows(None, &[Record::new().with("id", "2").with("name", "b")])
        .unwrap();
    assert_eq!(cached_keys(&manager), vec!["doc-1/Sheet1!A1:headers"]);

    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["1", "2"]);
}

#[test]
fn test_expired_rows_are_refetched() {
    let (manager, clock) = setup(&[&["id"], &["1"]]);
    manager.get_rows(None, None).unwrap();

    // Written behind the manager's back
    manager.store().write_cells(DOC, SHEET, "A3", &[&["2"]]).unwrap();
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["1"]);

    clock.advance(Duration::from_secs(61));
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["1", "2"]);
}

#[test]
fn test_no_cache_reads_every_time() {
    let manager = TableManager::new(seeded_store(&[&["id"], &["1"]]), &config());
    assert!(manager.cache().is_none());

    manager.get_rows(None, None).unwrap();
    let reads = manager.store().read_count();
    manager.get_rows(None, None).unwrap();
    assert_eq!(manager.store().read_count(), reads * 2);
}

#[test]
fn test_clear_cache() {
    let (manager, _clock) = setup(&[&["id"], &["1"]]);
    manager.get_rows(None, None).unwrap();

    manager.clear_cache().unwrap();
    assert!(cached_keys(&manager).is_empty());
}

#[test]
fn test_durable_cache_survives_new_manager() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .spreadsheet_id(DOC)
        .sheet_name(SHEET)
        .cache(CacheConfig::durable(temp.path()).with_namespace(Namespace::new("orders").unwrap()))
        .build();

    let first = TableManager::open(seeded_store(&[&["id"], &["1"]]), &config, &CacheRegistry::new()).unwrap();
    first.get_rows(None, None).unwrap();
    assert!(temp.path().join("orders.json").exists());

    // Same namespace, empty store: everything comes from the file
    let second = TableManager::open(seeded_store(&[]), &config, &CacheRegistry::new()).unwrap();
    assert_eq!(ids(&second.get_rows(None, None).unwrap()), vec!["1"]);
    assert_eq!(second.store().read_count(), 0);
}

#[test]
fn test_switching_documents_does_not_reuse_rows() {
    let (mut manager, _clock) = setup(&[&["id"], &["a"], &["b"], &["x"]]);
    manager.store().add_sheet("doc-2", SHEET, 200);
    manager
        .store()
        .write_cells("doc-2", SHEET, "A1", &[&["id"], &["x"], &["keep1"], &["keep2"]])
        .unwrap();
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["a", "b", "x"]);

    manager.set_spreadsheet_id("doc-2");
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["x", "keep1", "keep2"]);

    let deleted = manager.delete_rows(None, &FieldEquals::new("id", "x")).unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(
        manager.store().sheet_values("doc-2", SHEET).unwrap(),
        vec![vec!["id"], vec!["keep1"], vec!["keep2"]]
    );
    assert_eq!(
        manager.store().sheet_values(DOC, SHEET).unwrap(),
        vec![vec!["id"], vec!["a"], vec!["b"], vec!["x"]]
    );
}

// =============================================================================
// Position Tests
// =============================================================================

#[test]
fn test_invalid_position_fails_before_remote_calls() {
    let (manager, _clock) = setup(&[&["id"], &["1"]]);

    for position in ["B4", "B:0", ":", "1:A"] {
        assert!(matches!(
            manager.get_rows(Some(position), None),
            Err(GridError::AddressParse(_))
        ));
        assert!(matches!(
            manager.delete_rows(Some(position), &MatchAll),
            Err(GridError::AddressParse(_))
        ));
        assert!(matches!(
            manager.insert_rows(Some(position), &[Record::new().with("id", "2")]),
            Err(GridError::AddressParse(_))
        ));
    }
    assert!(manager.store().requests().is_empty());
}

#[test]
fn test_two_tables_on_one_sheet() {
    let (manager, _clock) = setup(&[&["id"], &["1"], &["2"]]);
    manager
        .store()
        .write_cells(DOC, SHEET, "C5", &[&["code", "qty"], &["x", "5"]])
        .unwrap();

    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["1", "2"]);
    let other = manager.get_rows(Some("C:5"), None).unwrap();
    assert_eq!(other, vec![Record::new().with("code", "x").with("qty", "5")]);

    manager
        .insert_rows(Some("C:5"), &[Record::new().with("code", "y").with("qty", "1")])
        .unwrap();
    let keys = cached_keys(&manager);
    assert!(keys.contains(&"doc-1/Sheet1!A1:values".to_string()));
    assert!(!keys.contains(&"doc-1/Sheet1!C5:values".to_string()));

    assert_eq!(manager.get_rows(Some("C:5"), None).unwrap().len(), 2);
}

#[test]
fn test_set_table_position() {
    let (mut manager, _clock) = setup(&[]);
    manager.store().write_cells(DOC, SHEET, "B2", &[&["id"], &["7"]]).unwrap();

    assert!(manager.set_table_position("B2").is_err());
    assert_eq!(manager.table_position().to_string(), "A:1");

    manager.set_table_position("B:2").unwrap();
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["7"]);
}

#[test]
fn test_set_sheet_info() {
    let (mut manager, _clock) = setup(&[]);
    manager.store().add_sheet("doc-2", "Other", 5);
    manager.store().write_cells("doc-2", "Other", "A1", &[&["id"], &["9"]]).unwrap();

    manager.set_sheet_info("Other", "doc-2");
    assert_eq!(manager.sheet_name(), "Other");
    assert_eq!(manager.spreadsheet_id(), "doc-2");
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["9"]);
}

#[test]
fn test_position_on_last_row() {
    let (manager, _clock) = setup(&[&["id"], &["1"]]);

    assert!(manager.get_rows(Some("A:4294967295"), None).unwrap().is_empty());
    assert_eq!(manager.delete_rows(Some("A:4294967295"), &MatchAll).unwrap(), 0);
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["1"]);
}

// =============================================================================
// Error Propagation Tests
// =============================================================================

#[test]
fn test_remote_read_failure_propagates() {
    let (manager, _clock) = setup(&[&["id"], &["1"]]);
    manager.store().fail_next("get", 503);

    assert!(matches!(
        manager.get_rows(None, None),
        Err(GridError::Remote { status: 503, .. })
    ));
    assert_eq!(ids(&manager.get_rows(None, None).unwrap()), vec!["1"]);
}

#[test]
fn test_remote_append_failure_propagates() {
    let (manager, _clock) = setup(&[&["id"]]);
    manager.store().fail_next("append", 500);

    let err = manager.insert_rows(None, &[Record::new().with("id", "1")]).unwrap_err();
    assert!(matches!(err, GridError::Remote { operation: "append", status: 500 }));
    assert_eq!(manager.store().sheet_values(DOC, SHEET).unwrap(), vec![vec!["id"]]);
}

#[test]
fn test_remote_update_failure_propagates() {
    let (manager, _clock) = setup(&[&["id", "s"], &["1", "a"]]);
    manager.store().fail_next("batch_update_values", 429);

    let err = manager
        .update_rows(None, &MatchAll, &Record::new().with("s", "b"))
        .unwrap_err();
    assert!(matches!(err, GridError::Remote { status: 429, .. }));
    assert_eq!(manager.store().sheet_values(DOC, SHEET).unwrap()[1], vec!["1", "a"]);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_reads_agree() {
    let (manager, _clock) = setup_numbered();

    let results: Vec<Vec<Record>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| manager.get_rows(None, None).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for rows in &results {
        assert_eq!(rows.len(), 9);
        assert_eq!(rows, &results[0]);
    }
}
