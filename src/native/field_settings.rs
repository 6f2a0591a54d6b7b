// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-field accumulation of native tables.

use indexmap::IndexMap;

use super::{NativeTable, NativeTableType};
use crate::codec::Property;

/// A table that lost to an earlier registration of the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTable {
    pub kept: NativeTable,
    pub ignored: NativeTable,
}

/// Native tables registered for one field, at most one per table type.
///
/// The first registration of a table type wins. A later one is reported back
/// and otherwise ignored; it never overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRankSettings {
    field: String,
    tables: IndexMap<NativeTableType, NativeTable>,
}

impl FieldRankSettings {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            tables: IndexMap::new(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn table(&self, table_type: NativeTableType) -> Option<&NativeTable> {
        self.tables.get(&table_type)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Register a table. Returns the conflict if this type was already set.
    pub fn add_table(&mut self, table: NativeTable) -> Option<DuplicateTable> {
        if let Some(existing) = self.tables.get(&table.table_type) {
            tracing::warn!(
                field = %self.field,
                kept = %existing,
                ignored = %table,
                "duplicate native table, keeping the first"
            );
            return Some(DuplicateTable {
                kept: existing.clone(),
                ignored: table,
            });
        }
        self.tables.insert(table.table_type, table);
        None
    }

    /// `<feature>.<tableType>.<field> = <table>` for every registered table.
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.tables.values().map(move |t| {
            (
                format!(
                    "{}.{}.{}",
                    t.table_type.feature(),
                    t.table_type.name(),
                    self.field
                ),
                t.name.clone(),
            )
        })
    }
}
