//! Table positions
//!
//! The `LETTER:NUMBER` form used to name the top-left cell of a table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

use super::Column;

/// Top-left cell of a table: its header cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TablePosition {
    pub letter: Column,
    /// 1-based row number, always >= 1
    pub number: u32,
}

impl TablePosition {
    pub fn new(letter: Column, number: u32) -> Result<Self> {
        if number == 0 {
            return Err(GridError::AddressParse(
                "row number must be at least 1".to_string(),
            ));
        }
        Ok(Self { letter, number })
    }

    /// Parse `"B:4"`
    pub fn parse(s: &str) -> Result<Self> {
        let (letter, number) = s
            .split_once(':')
            .ok_or_else(|| GridError::AddressParse(format!("expected LETTER:NUMBER, got {s:?}")))?;

        let letter = Column::parse(letter)?;
        let number: u32 = number
            .trim()
            .parse()
            .map_err(|_| GridError::AddressParse(format!("invalid row number in {s:?}")))?;

        Self::new(letter, number)
    }

    /// `"B4"`
    pub fn a1(&self) -> String {
        format!("{}{}", self.letter, self.number)
    }
}

impl Default for TablePosition {
    fn default() -> Self {
        Self {
            letter: Column::first(),
            number: 1,
        }
    }
}

impl fmt::Display for TablePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.letter, self.number)
    }
}

impl FromStr for TablePosition {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
