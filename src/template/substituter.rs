// src/template/substituter.rs

use std::collections::BTreeMap;

use crate::errors::{CastleError, Result};

/// Source of replacement text for `%{name}` placeholders.
pub trait Substituter {
    /// Look up the replacement for `key`.
    ///
    /// Absent keys are an error; a key mapped to an empty string is not.
    fn substitute(&self, key: &str) -> Result<String>;
}

/// Substituter backed by an in-memory map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSubstituter {
    values: BTreeMap<String, String>,
}

impl MapSubstituter {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Add or replace a single variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Substituter for MapSubstituter {
    fn substitute(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| CastleError::MissingSubstitutionKey(key.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSubstituter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
