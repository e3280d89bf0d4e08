//! Keyed records

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};

use super::CellValue;

/// One table row keyed by header name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Option<CellValue> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<CellValue> {
        self.fields.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// No field holds a non-empty value
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(CellValue::is_empty)
    }

    /// Copy of `self` with every field of `patch` applied over it
    pub fn merged(&self, patch: &Record) -> Record {
        let mut merged = self.clone();
        for (field, value) in &patch.fields {
            merged.fields.insert(field.clone(), value.clone());
        }
        merged
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, CellValue> {
        self.fields.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, CellValue);
    type IntoIter = btree_map::IntoIter<String, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a CellValue);
    type IntoIter = btree_map::Iter<'a, String, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
