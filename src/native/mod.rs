// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Native rank-type tables.
//!
//! A rank type (`about`, `identity`, `tags`, `empty`) is shorthand for a set
//! of lookup tables the native rank features use. Which of them apply depends
//! on how the field is stored:
//!
//! | table type            | feature                | applies to     |
//! |-----------------------|------------------------|----------------|
//! | firstOccurrenceTable  | `nativeFieldMatch`     | index fields   |
//! | occurrenceCountTable  | `nativeFieldMatch`     | index fields   |
//! | proximityTable        | `nativeProximity`      | index fields   |
//! | reverseProximityTable | `nativeProximity`      | index fields   |
//! | weight                | `nativeAttributeMatch` | attributes     |
//!
//! `default` is the engine's own default (`about`), so it never produces
//! tables.

mod field_settings;

use std::collections::BTreeMap;
use std::fmt;

use crate::model::RankType;

pub use field_settings::{DuplicateTable, FieldRankSettings};

/// Kind of native table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NativeTableType {
    FirstOccurrence,
    OccurrenceCount,
    Weight,
    Proximity,
    ReverseProximity,
}

impl NativeTableType {
    pub const ALL: [NativeTableType; 5] = [
        NativeTableType::FirstOccurrence,
        NativeTableType::OccurrenceCount,
        NativeTableType::Weight,
        NativeTableType::Proximity,
        NativeTableType::ReverseProximity,
    ];

    /// Name used in the property key.
    pub fn name(self) -> &'static str {
        match self {
            NativeTableType::FirstOccurrence => "firstOccurrenceTable",
            NativeTableType::OccurrenceCount => "occurrenceCountTable",
            NativeTableType::Weight => "weight",
            NativeTableType::Proximity => "proximityTable",
            NativeTableType::ReverseProximity => "reverseProximityTable",
        }
    }

    /// Rank feature that reads this table.
    pub fn feature(self) -> &'static str {
        match self {
            NativeTableType::FirstOccurrence | NativeTableType::OccurrenceCount => {
                "nativeFieldMatch"
            }
            NativeTableType::Weight => "nativeAttributeMatch",
            NativeTableType::Proximity | NativeTableType::ReverseProximity => "nativeProximity",
        }
    }

    pub fn is_field_match(self) -> bool {
        matches!(
            self,
            NativeTableType::FirstOccurrence | NativeTableType::OccurrenceCount
        )
    }

    pub fn is_attribute_match(self) -> bool {
        self == NativeTableType::Weight
    }

    pub fn is_proximity(self) -> bool {
        matches!(
            self,
            NativeTableType::Proximity | NativeTableType::ReverseProximity
        )
    }

    /// Tables that only make sense for indexed (non-attribute) fields.
    pub fn is_index_field_table(self) -> bool {
        self.is_field_match() || self.is_proximity()
    }

    /// Tables that only make sense for attribute fields.
    pub fn is_attribute_field_table(self) -> bool {
        self.is_attribute_match()
    }

    /// Whether this table applies to a field with the given storage.
    pub fn applies_to(self, is_attribute: bool) -> bool {
        if is_attribute {
            self.is_attribute_field_table()
        } else {
            self.is_index_field_table()
        }
    }
}

/// A table type with a concrete table, e.g. `expdecay(100,12.50)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeTable {
    pub table_type: NativeTableType,
    pub name: String,
}

impl NativeTable {
    pub fn new(table_type: NativeTableType, name: impl Into<String>) -> Self {
        Self {
            table_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for NativeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.table_type.name(), self.name)
    }
}

/// Tables that make up one rank type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeRankTypeDefinition {
    pub rank_type: RankType,
    pub tables: Vec<NativeTable>,
}

impl NativeRankTypeDefinition {
    pub fn new(rank_type: RankType) -> Self {
        Self {
            rank_type,
            tables: Vec::new(),
        }
    }

    pub fn with(mut self, table_type: NativeTableType, name: &str) -> Self {
        self.tables.push(NativeTable::new(table_type, name));
        self
    }

    /// The tables that apply to a field with the given storage.
    pub fn tables_for(&self, is_attribute: bool) -> impl Iterator<Item = &NativeTable> {
        self.tables
            .iter()
            .filter(move |t| t.table_type.applies_to(is_attribute))
    }
}

/// All known rank types and their tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeRankTypeDefinitionSet {
    name: String,
    definitions: BTreeMap<RankType, NativeRankTypeDefinition>,
}

impl NativeRankTypeDefinitionSet {
    /// An empty set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: BTreeMap::new(),
        }
    }

    /// The standard definitions the engine ships with.
    pub fn builtin() -> Self {
        use NativeTableType::*;

        let mut set = Self::new("default");
        set.add(
            NativeRankTypeDefinition::new(RankType::About)
                .with(FirstOccurrence, "expdecay(8000,12.50)")
                .with(OccurrenceCount, "loggrowth(1500,4000,19)")
                .with(Weight, "linear(1,0)")
                .with(Proximity, "expdecay(500,3)")
                .with(ReverseProximity, "expdecay(400,3)"),
        );
        set.add(
            NativeRankTypeDefinition::new(RankType::Identity)
                .with(FirstOccurrence, "expdecay(100,12.50)")
                .with(OccurrenceCount, "loggrowth(1500,4000,19)")
                .with(Weight, "linear(1,0)")
                .with(Proximity, "expdecay(5000,3)")
                .with(ReverseProximity, "expdecay(3000,3)"),
        );
        set.add(
            NativeRankTypeDefinition::new(RankType::Tags)
                .with(FirstOccurrence, "expdecay(8000,12.50)")
                .with(OccurrenceCount, "loggrowth(1500,4000,19)")
                .with(Weight, "loggrowth(38,50,1)")
                .with(Proximity, "expdecay(5000,3)")
                .with(ReverseProximity, "expdecay(3000,3)"),
        );
        set.add(
            NativeRankTypeDefinition::new(RankType::Empty)
                .with(FirstOccurrence, "linear(0,0)")
                .with(OccurrenceCount, "linear(0,0)")
                .with(Weight, "linear(0,0)")
                .with(Proximity, "linear(0,0)")
                .with(ReverseProximity, "linear(0,0)"),
        );
        set
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(&mut self, definition: NativeRankTypeDefinition) {
        self.definitions.insert(definition.rank_type, definition);
    }

    pub fn definition(&self, rank_type: RankType) -> Option<&NativeRankTypeDefinition> {
        self.definitions.get(&rank_type)
    }

    /// Names of the rank types this set can materialize.
    pub fn supported(&self) -> Vec<String> {
        self.definitions
            .keys()
            .map(|t| t.name().to_string())
            .collect()
    }
}

impl Default for NativeRankTypeDefinitionSet {
    fn default() -> Self {
        Self::builtin()
    }
}
