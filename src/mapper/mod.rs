//! Mapper Module
//!
//! Converts between positional rows and keyed records, using the table's
//! header row as the schema.
//!
//! ## Shape
//! ```text
//! header:  [ "id",  "name", "status" ]
//! row:     [ "7",   "Ana"            ]      <- trailing cells may be absent
//! record:  { id: "7", name: "Ana" }         <- absent cells are absent keys
//! ```
//! A row whose every cell is empty maps to no record at all.

mod filter;
mod record;
mod row;
mod value;

pub use filter::{FieldEquals, MatchAll, RowFilter};
pub use record::Record;
pub use row::{coerce_numeric_strings, Header, Row, RowMapper};
pub use value::CellValue;
