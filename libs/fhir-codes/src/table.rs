//! Per-value-set code tables
//!
//! A table is the authority for one value set: every member code has exactly
//! one wire enum identifier and one host enum identifier, and all three
//! columns are unique. Lookups in every direction are exact map hits.

use crate::error::{Error, Result};
use crate::normalize::{
    generic_host_identifier, generic_wire_identifier, is_generic_code, is_host_identifier,
    is_wire_identifier,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One member of a value set in its three lexical forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    /// Wire code as it appears in FHIR JSON/XML (`entered-in-error`).
    pub code: String,
    /// Upper-snake wire enum identifier (`ENTERED_IN_ERROR`).
    pub wire: String,
    /// Host enum identifier (`EnteredInError`).
    pub host: String,
}

impl CodeEntry {
    pub fn new(code: impl Into<String>, wire: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            wire: wire.into(),
            host: host.into(),
        }
    }

    /// Row derived by the generic rule, if the code is eligible for it.
    pub fn generic(code: &str) -> Option<Self> {
        is_generic_code(code).then(|| {
            Self::new(
                code,
                generic_wire_identifier(code),
                generic_host_identifier(code),
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValueSetTable {
    url: String,
    name: Option<String>,
    entries: Vec<CodeEntry>,
    by_code: HashMap<String, usize>,
    by_wire: HashMap<String, usize>,
    by_host: HashMap<String, usize>,
}

impl ValueSetTable {
    pub fn builder(url: impl Into<String>) -> ValueSetTableBuilder {
        ValueSetTableBuilder {
            url: url.into(),
            name: None,
            rows: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Rows in declaration order.
    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Code -> wire enum identifier.
    pub fn to_wire_enum_identifier(&self, code: &str) -> Result<&str> {
        self.lookup(&self.by_code, code).map(|e| e.wire.as_str())
    }

    /// Wire enum identifier -> code.
    pub fn to_wire_code(&self, identifier: &str) -> Result<&str> {
        self.lookup(&self.by_wire, identifier)
            .map(|e| e.code.as_str())
    }

    /// Code -> host enum identifier.
    pub fn to_host_identifier(&self, code: &str) -> Result<&str> {
        self.lookup(&self.by_code, code).map(|e| e.host.as_str())
    }

    /// Host enum identifier -> code.
    pub fn from_host_identifier(&self, identifier: &str) -> Result<&str> {
        self.lookup(&self.by_host, identifier)
            .map(|e| e.code.as_str())
    }

    fn lookup(&self, index: &HashMap<String, usize>, key: &str) -> Result<&CodeEntry> {
        index
            .get(key)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| Error::UnknownCode {
                value_set: self.url.clone(),
                code: key.to_string(),
            })
    }
}

#[derive(Debug, Clone)]
enum Row {
    Generic(String),
    Explicit(CodeEntry),
}

impl Row {
    fn code(&self) -> &str {
        match self {
            Row::Generic(code) => code,
            Row::Explicit(entry) => &entry.code,
        }
    }
}

/// Collects rows and checks the bijection on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ValueSetTableBuilder {
    url: String,
    name: Option<String>,
    rows: Vec<Row>,
}

impl ValueSetTableBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// A member converted by the generic rule.
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.rows.push(Row::Generic(code.into()));
        self
    }

    pub fn codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows
            .extend(codes.into_iter().map(|c| Row::Generic(c.into())));
        self
    }

    /// A member with explicit identifiers.
    pub fn entry(
        mut self,
        code: impl Into<String>,
        wire: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        self.rows
            .push(Row::Explicit(CodeEntry::new(code, wire, host)));
        self
    }

    pub fn entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = CodeEntry>,
    {
        self.rows.extend(entries.into_iter().map(Row::Explicit));
        self
    }

    pub(crate) fn has_code(&self, code: &str) -> bool {
        self.rows.iter().any(|row| row.code() == code)
    }

    pub fn build(self) -> Result<ValueSetTable> {
        let mut table = ValueSetTable {
            url: self.url,
            name: self.name,
            entries: Vec::with_capacity(self.rows.len()),
            by_code: HashMap::new(),
            by_wire: HashMap::new(),
            by_host: HashMap::new(),
        };

        for row in self.rows {
            let entry = match row {
                Row::Generic(code) => {
                    CodeEntry::generic(&code).ok_or_else(|| Error::MissingException {
                        value_set: table.url.clone(),
                        code: code.clone(),
                    })?
                }
                Row::Explicit(entry) => entry,
            };
            table.insert(entry)?;
        }

        tracing::trace!(value_set = %table.url, codes = table.entries.len(), "built code table");
        Ok(table)
    }
}

impl ValueSetTable {
    fn insert(&mut self, entry: CodeEntry) -> Result<()> {
        if !is_wire_identifier(&entry.wire) {
            return Err(Error::InvalidIdentifier {
                value_set: self.url.clone(),
                kind: "wire",
                identifier: entry.wire,
            });
        }
        if !is_host_identifier(&entry.host) {
            return Err(Error::InvalidIdentifier {
                value_set: self.url.clone(),
                kind: "host",
                identifier: entry.host,
            });
        }
        if self.by_code.contains_key(&entry.code) {
            return Err(Error::DuplicateCode {
                value_set: self.url.clone(),
                code: entry.code,
            });
        }
        for (kind, index, identifier) in [
            ("wire", &self.by_wire, &entry.wire),
            ("host", &self.by_host, &entry.host),
        ] {
            if let Some(&existing) = index.get(identifier) {
                return Err(Error::Collision {
                    value_set: self.url.clone(),
                    kind,
                    identifier: identifier.clone(),
                    first: self.entries[existing].code.clone(),
                    second: entry.code.clone(),
                });
            }
        }

        let position = self.entries.len();
        self.by_code.insert(entry.code.clone(), position);
        self.by_wire.insert(entry.wire.clone(), position);
        self.by_host.insert(entry.host.clone(), position);
        self.entries.push(entry);
        Ok(())
    }
}
