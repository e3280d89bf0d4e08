//! Table manager
//!
//! Cache-through reads and cache-invalidating writes over one sheet.

use crate::cache::{Cache, CacheLookup, CacheRegistry};
use crate::config::{Config, ProbeConfig};
use crate::coord::{CellRange, CellRef, TablePosition};
use crate::error::{GridError, Result};
use crate::mapper::{coerce_numeric_strings, Header, Record, RowFilter, RowMapper};
use crate::region::{RegionResolver, TableRegion};
use crate::store::{AppendOptions, DeleteRange, ValueInputOption, ValueRange, ValueStore};

use super::{fanout, keys};

/// CRUD over a header-keyed table in a Value Store
///
/// ## Caching
/// With a cache attached, headers and row bodies are cached per sheet and
/// table position. Every successful write drops the cached rows of the
/// table it touched; headers are never invalidated by row writes.
///
/// ## Concurrency
/// All operations take `&self`. Independent reads inside one operation are
/// fanned out on scoped threads. Concurrent callers missing the same key
/// both fetch and both write the cache; the last write wins.
pub struct TableManager<S: ValueStore> {
    store: S,

    spreadsheet_id: String,

    sheet_name: String,

    /// Used when an operation names no position
    table_position: TablePosition,

    probe: ProbeConfig,

    /// `None` when caching is disabled
    cache: Option<Cache>,
}

impl<S: ValueStore> TableManager<S> {
    /// Manager without a cache
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            table_position: config.table_position.clone(),
            probe: config.probe.clone(),
            cache: None,
        }
    }

    /// Manager with the cache described by `config.cache`, opened from `registry`
    pub fn open(store: S, config: &Config, registry: &CacheRegistry) -> Result<Self> {
        let manager = Self::new(store, config);
        match &config.cache {
            Some(cache_config) => Ok(manager.with_cache(registry.open(cache_config)?)),
            None => Ok(manager),
        }
    }

    /// Attach a cache, replacing any previous one
    pub fn with_cache(mut self, cache: Cache) -> Self {
        tracing::debug!(namespace = %cache.namespace(), sheet = %self.sheet_name, "cache attached");
        self.cache = Some(cache);
        self
    }

    // =========================================================================
    // Sheet Context
    // =========================================================================

    pub fn set_spreadsheet_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.spreadsheet_id = id.into();
        self
    }

    pub fn set_sheet_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.sheet_name = name.into();
        self
    }

    pub fn set_sheet_info(&mut self, name: impl Into<String>, id: impl Into<String>) -> &mut Self {
        self.sheet_name = name.into();
        self.spreadsheet_id = id.into();
        self
    }

    /// Set the default table position from `"LETTER:NUMBER"`
    pub fn set_table_position(&mut self, position: &str) -> Result<&mut Self> {
        self.table_position = TablePosition::parse(position)?;
        Ok(self)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn table_position(&self) -> &TablePosition {
        &self.table_position
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> Option<&Cache> {
        self.cache.as_ref()
    }

    /// Resolver bound to the current sheet
    pub fn resolver(&self) -> RegionResolver<'_, S> {
        RegionResolver::new(&self.store, &self.spreadsheet_id, &self.sheet_name, &self.probe)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Header row of the table at `position` (the default position if `None`)
    pub fn get_headers(&self, position: Option<&str>) -> Result<Header> {
        let position = self.position(position)?;
        self.headers_at(&position)
    }

    /// Every record of the table, optionally narrowed by `filter`
    ///
    /// The cache always holds the unfiltered rows.
    pub fn get_rows(&self, position: Option<&str>, filter: Option<&dyn RowFilter>) -> Result<Vec<Record>> {
        let position = self.position(position)?;
        let records = self.rows_at(&position)?;
        Ok(match filter {
            Some(filter) => records.into_iter().filter(|r| filter.matches(r)).collect(),
            None => records,
        })
    }

    /// Current extent of the table; never cached
    pub fn region(&self, position: Option<&str>) -> Result<TableRegion> {
        let position = self.position(position)?;
        self.resolver().resolve_region(&position)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Append `records` after the table body
    ///
    /// Returns the number of rows appended.
    pub fn insert_rows(&self, position: Option<&str>, records: &[Record]) -> Result<usize> {
        let position = self.position(position)?;
        if records.is_empty() {
            return Ok(0);
        }

        let headers = self.headers_at(&position)?;
        if headers.is_empty() {
            return Err(GridError::MissingHeader(self.qualified(&position)));
        }

        let mapper = RowMapper::new(&headers);
        let rows: Vec<_> = records.iter().map(|r| mapper.serialize(r)).collect();
        let range = CellRange::cell(self.sheet_name.as_str(), CellRef::from(&position));

        tracing::debug!(range = %range, rows = rows.len(), "appending rows");
        self.store
            .append(&self.spreadsheet_id, &range, &rows, AppendOptions::default())?
            .ensure("append")?;

        self.invalidate_rows(&position)?;
        Ok(rows.len())
    }

    /// Overwrite every record matching `filter` with itself merged with `patch`
    ///
    /// Fields of `patch` win. Merged values have numeric strings coerced to
    /// integers. All rows go out in one batched write, highest row first.
    /// Returns the number of rows written.
    pub fn update_rows(&self, position: Option<&str>, filter: &dyn RowFilter, patch: &Record) -> Result<usize> {
        let position = self.position(position)?;
        let (records, end_letter) = fanout::join(
            || self.rows_at(&position),
            || self.resolver().resolve_last_column(&position),
        )?;

        let targets = matching_rows_descending(&position, &records, filter);
        if targets.is_empty() {
            tracing::debug!(table = %self.qualified(&position), "update matched no rows");
            return Ok(0);
        }

        let headers = self.headers_at(&position)?;
        let mapper = RowMapper::new(&headers);
        let data: Vec<ValueRange> = targets
            .iter()
            .map(|(row, record)| ValueRange {
                range: CellRange::row(
                    self.sheet_name.as_str(),
                    CellRef::new(position.letter.clone(), *row),
                    end_letter.clone(),
                ),
                rows: vec![mapper.serialize(&coerce_numeric_strings(&record.merged(patch)))],
            })
            .collect();

        tracing::debug!(table = %self.qualified(&position), rows = data.len(), "updating rows");
        self.store
            .batch_update_values(&self.spreadsheet_id, &data, ValueInputOption::Raw)?
            .ensure("batch_update_values")?;

        self.invalidate_rows(&position)?;
        Ok(data.len())
    }

    /// Delete every record matching `filter`, one request per row, highest
    /// row first
    ///
    /// Each request spans the start column through one column past the last
    /// header. A failure part-way leaves earlier deletions applied; the
    /// cached rows are dropped either way. Returns the number of rows deleted.
    pub fn delete_rows(&self, position: Option<&str>, filter: &dyn RowFilter) -> Result<usize> {
        let position = self.position(position)?;
        let records = self.rows_at(&position)?;

        let rows: Vec<u32> = matching_rows_descending(&position, &records, filter)
            .into_iter()
            .map(|(row, _)| row)
            .collect();
        if rows.is_empty() {
            tracing::debug!(table = %self.qualified(&position), "delete matched no rows");
            return Ok(0);
        }

        let (sheet, headers) = fanout::join(
            || self.resolver().resolve_sheet(&self.sheet_name),
            || self.headers_at(&position),
        )?;
        let (_, sheet) = sheet.ok_or_else(|| GridError::SheetNotFound(self.sheet_name.clone()))?;

        let start_column_index = position.letter.index();
        let end_column_index = position.letter.add(headers.len() as u32 + 1).index();

        let mut deleted = 0;
        let mut outcome = Ok(());
        for row in &rows {
            let request = DeleteRange {
                sheet_id: sheet.id,
                start_row_index: row - 1,
                end_row_index: *row,
                start_column_index,
                end_column_index,
            };
            tracing::trace!(sheet_id = sheet.id, row, "deleting row");
            let result = self
                .store
                .batch_update(&self.spreadsheet_id, &[request])
                .and_then(|status| status.ensure("batch_update"));
            if let Err(e) = result {
                outcome = Err(e);
                break;
            }
            deleted += 1;
        }

        tracing::debug!(table = %self.qualified(&position), deleted, requested = rows.len(), "deleted rows");

        match outcome {
            Ok(()) => {
                self.invalidate_rows(&position)?;
                Ok(deleted)
            }
            Err(e) => {
                if let Err(cache_err) = self.invalidate_rows(&position) {
                    tracing::warn!(error = %cache_err, "failed to invalidate rows after partial delete");
                }
                Err(e)
            }
        }
    }

    // =========================================================================
    // Cache Control
    // =========================================================================

    /// Drop the cached rows of the table at `position`
    pub fn invalidate(&self, position: Option<&str>) -> Result<()> {
        let position = self.position(position)?;
        self.invalidate_rows(&position)
    }

    /// Drop everything this manager has cached
    pub fn clear_cache(&self) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.clear(),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Parse `position`, falling back to the default
    fn position(&self, position: Option<&str>) -> Result<TablePosition> {
        match position {
            Some(position) => TablePosition::parse(position),
            None => Ok(self.table_position.clone()),
        }
    }

    /// `Sheet!A3`, for logs and errors
    fn qualified(&self, position: &TablePosition) -> String {
        format!("{}!{}", self.sheet_name, position.a1())
    }

    fn headers_at(&self, position: &TablePosition) -> Result<Header> {
        let key = keys::headers(&self.spreadsheet_id, &self.sheet_name, position);
        if let Some(cache) = &self.cache {
            if let CacheLookup::Found(headers) = cache.get::<Header>(&key) {
                return Ok(headers);
            }
        }

        let headers = self.resolver().resolve_headers(position)?;
        if let Some(cache) = &self.cache {
            cache.set(&key, &headers)?;
        }
        Ok(headers)
    }

    fn rows_at(&self, position: &TablePosition) -> Result<Vec<Record>> {
        let key = keys::values(&self.spreadsheet_id, &self.sheet_name, position);
        if let Some(cache) = &self.cache {
            if let CacheLookup::Found(records) = cache.get::<Vec<Record>>(&key) {
                return Ok(records);
            }
        }

        let (headers, region) = fanout::join(
            || self.headers_at(position),
            || self.resolver().resolve_region(position),
        )?;

        let records = match region.body_range(&self.sheet_name) {
            Some(range) => {
                let body = self.store.get(&self.spreadsheet_id, &range)?;
                RowMapper::new(&headers).deserialize_rows(&body)
            }
            None => Vec::new(),
        };
        tracing::debug!(table = %self.qualified(position), rows = records.len(), "fetched rows");

        if let Some(cache) = &self.cache {
            cache.set(&key, &records)?;
        }
        Ok(records)
    }

    fn invalidate_rows(&self, position: &TablePosition) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.delete(&keys::values(&self.spreadsheet_id, &self.sheet_name, position)),
            None => Ok(()),
        }
    }
}

/// Absolute row numbers of the records matching `filter`, highest first
///
/// Record `i` lives on row `start + 1 + i`. Positional mutations against
/// rows that shift must run from the highest index to the lowest.
fn matching_rows_descending<'r>(
    position: &TablePosition,
    records: &'r [Record],
    filter: &dyn RowFilter,
) -> Vec<(u32, &'r Record)> {
    let mut rows: Vec<(u32, &Record)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| filter.matches(record))
        .filter_map(|(i, record)| {
            let offset = u32::try_from(i).ok()?.checked_add(1)?;
            Some((position.number.checked_add(offset)?, record))
        })
        .collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0));
    rows
}
