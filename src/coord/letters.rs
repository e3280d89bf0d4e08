//! Column letters
//!
//! Bijective base-26 arithmetic over uppercase column letters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Longest accepted column letter (`ZZZZZZ` = 321 272 406 columns)
pub const MAX_COLUMN_LETTERS: usize = 6;

/// A validated, uppercase column letter (`A`, `Z`, `AA`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Column(String);

impl Column {
    /// Parse a column letter, normalizing to uppercase
    pub fn parse(letter: &str) -> Result<Self> {
        let letter = letter.trim();
        if letter.is_empty() {
            return Err(GridError::AddressParse("empty column letter".to_string()));
        }
        if letter.len() > MAX_COLUMN_LETTERS {
            return Err(GridError::AddressParse(format!(
                "column letter too long: {letter:?} (max {MAX_COLUMN_LETTERS})"
            )));
        }
        if !letter.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(GridError::AddressParse(format!(
                "column letter must be A-Z: {letter:?}"
            )));
        }
        Ok(Self(letter.to_ascii_uppercase()))
    }

    /// Column from its bijective number (`1` = `A`, `27` = `AA`)
    pub fn from_number(mut number: u32) -> Option<Self> {
        if number == 0 {
            return None;
        }
        let mut bytes = Vec::new();
        while number > 0 {
            let digit = (number - 1) % 26;
            bytes.push(b'A' + digit as u8);
            number = (number - 1) / 26;
        }
        bytes.reverse();
        Some(Self(bytes.into_iter().map(char::from).collect()))
    }

    /// Column from its 0-based index (`0` = `A`)
    pub fn from_index(index: u32) -> Option<Self> {
        Self::from_number(index.checked_add(1)?)
    }

    /// The first column
    pub fn first() -> Self {
        Self::literal("A")
    }

    /// A column known to be valid uppercase A-Z
    pub(crate) fn literal(letter: &'static str) -> Self {
        debug_assert!(letter.bytes().all(|b| b.is_ascii_uppercase()));
        Self(letter.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bijective base-26 value: no zero digit, `A` = 1, `AA` = 27
    pub fn number(&self) -> u32 {
        self.0.bytes().fold(0u32, |acc, b| {
            acc.saturating_mul(26).saturating_add(u32::from(b - b'A' + 1))
        })
    }

    /// 0-based column index: `A` = 0, `AA` = 26
    pub fn index(&self) -> u32 {
        self.number() - 1
    }

    /// The next column letter
    ///
    /// Trailing `Z`s become `A` and carry into the first non-`Z` letter.
    /// When every letter was `Z` the result grows by one: `ZZ` -> `AAA`.
    pub fn next(&self) -> Self {
        let mut bytes = self.0.as_bytes().to_vec();
        for i in (0..bytes.len()).rev() {
            if bytes[i] == b'Z' {
                bytes[i] = b'A';
            } else {
                bytes[i] += 1;
                return Self(bytes.into_iter().map(char::from).collect());
            }
        }
        bytes.insert(0, b'A');
        Self(bytes.into_iter().map(char::from).collect())
    }

    /// The previous column letter, or `None` for `A`
    pub fn prev(&self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }

    /// Apply `next` `count` times
    ///
    /// Linear in `count`; tables are narrow.
    pub fn add(&self, count: u32) -> Self {
        let mut column = self.clone();
        for _ in 0..count {
            column = column.next();
        }
        column
    }

    /// Number of columns from `self` through `end`, inclusive (0 if `end` is before `self`)
    pub fn span_to(&self, end: &Column) -> u32 {
        (end.number() + 1).saturating_sub(self.number())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Column {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Column {
    type Error = GridError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        column.0
    }
}

// =============================================================================
// String Helpers
// =============================================================================

/// Next column letter for a raw string: `A` -> `B`, `Z` -> `AA`, `AZ` -> `BA`
pub fn increment_letter(letter: &str) -> Result<String> {
    Ok(Column::parse(letter)?.next().into())
}

/// `letter` advanced by `count` columns
pub fn add_letters(letter: &str, count: u32) -> Result<String> {
    Ok(Column::parse(letter)?.add(count).into())
}

/// 0-based column index of a raw letter, as used by index-addressed requests
pub fn letter_to_index(letter: &str) -> Result<u32> {
    Ok(Column::parse(letter)?.index())
}

/// Bijective base-26 value of a raw letter (`A` = 1, `AA` = 27)
pub fn letter_to_number(letter: &str) -> Result<u32> {
    Ok(Column::parse(letter)?.number())
}
