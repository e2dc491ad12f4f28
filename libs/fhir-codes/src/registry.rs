//! Registry of code tables keyed by value-set canonical URL

use crate::error::{Error, Result};
use crate::table::ValueSetTable;
use std::collections::HashMap;

/// Strip a `|version` suffix from a canonical URL.
pub fn canonical_key(url: &str) -> &str {
    url.split('|').next().unwrap_or(url)
}

/// Immutable set of code tables. Built once, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct CodeRegistry {
    tables: HashMap<String, ValueSetTable>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. A value set may be registered once.
    pub fn register(&mut self, table: ValueSetTable) -> Result<()> {
        let key = canonical_key(table.url()).to_string();
        if self.tables.contains_key(&key) {
            return Err(Error::DuplicateValueSet(key));
        }
        self.tables.insert(key, table);
        Ok(())
    }

    pub fn contains(&self, value_set: &str) -> bool {
        self.tables.contains_key(canonical_key(value_set))
    }

    pub fn table(&self, value_set: &str) -> Result<&ValueSetTable> {
        self.tables
            .get(canonical_key(value_set))
            .ok_or_else(|| Error::UnknownValueSet(value_set.to_string()))
    }

    /// Registered tables sorted by URL.
    pub fn tables(&self) -> Vec<&ValueSetTable> {
        let mut tables: Vec<_> = self.tables.values().collect();
        tables.sort_by(|a, b| a.url().cmp(b.url()));
        tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn to_wire_enum_identifier(&self, value_set: &str, code: &str) -> Result<&str> {
        self.table(value_set)?.to_wire_enum_identifier(code)
    }

    pub fn to_wire_code(&self, value_set: &str, identifier: &str) -> Result<&str> {
        self.table(value_set)?.to_wire_code(identifier)
    }

    pub fn to_host_identifier(&self, value_set: &str, code: &str) -> Result<&str> {
        self.table(value_set)?.to_host_identifier(code)
    }

    pub fn from_host_identifier(&self, value_set: &str, identifier: &str) -> Result<&str> {
        self.table(value_set)?.from_host_identifier(identifier)
    }
}
