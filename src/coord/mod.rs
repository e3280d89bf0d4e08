//! Coordinate Module
//!
//! Spreadsheet-style addressing: column letters, table positions and A1
//! range strings.
//!
//! ## Two Column Encodings
//! ```text
//! letter   index (0-based)   number (bijective base-26)
//!   A            0                  1
//!   Z           25                 26
//!   AA          26                 27
//!   AZ          51                 52
//!   ZZ         701                702
//! ```
//! `index` addresses columns in row/column index requests (delete ranges).
//! `number` is the value implied by increment and addition. They differ by
//! exactly one and are never mixed.

mod letters;
mod position;
mod range;

pub use letters::{add_letters, increment_letter, letter_to_index, letter_to_number, Column, MAX_COLUMN_LETTERS};
pub use position::TablePosition;
pub use range::{CellRange, CellRef};
