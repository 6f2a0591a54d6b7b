// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Rank profile lookup across schemas.
//!
//! Profiles are keyed by (schema, name). Global profiles have no schema.
//! Resolution from a schema walks that schema, then its schema ancestors,
//! then the global profiles. The registry is passed explicitly to everything
//! that needs it; there is no process-wide instance.

use std::collections::{BTreeMap, HashSet};

use super::{RankProfile, DEFAULT_PROFILE};

#[derive(Debug, Clone, Default)]
pub struct RankProfileRegistry {
    /// Schema name (`None` for global) → profile name → profile.
    profiles: BTreeMap<Option<String>, BTreeMap<String, RankProfile>>,
    /// Schema → the schema it inherits from.
    schema_parents: BTreeMap<String, String>,
}

impl RankProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a schema. Ensures it has a `default` profile.
    pub fn add_schema(&mut self, name: &str, inherits: Option<&str>) {
        if let Some(parent) = inherits {
            self.schema_parents
                .insert(name.to_string(), parent.to_string());
        }
        self.profiles
            .entry(Some(name.to_string()))
            .or_default()
            .entry(DEFAULT_PROFILE.to_string())
            .or_insert_with(|| RankProfile::new(DEFAULT_PROFILE, Some(name)));
    }

    /// Add (or replace) a profile under its own schema.
    pub fn add(&mut self, profile: RankProfile) {
        if let Some(ref schema) = profile.schema {
            if !self.profiles.contains_key(&Some(schema.clone())) {
                self.add_schema(schema, None);
            }
        }
        self.profiles
            .entry(profile.schema.clone())
            .or_default()
            .insert(profile.name.clone(), profile);
    }

    /// Find `name` as seen from `document`'s schema.
    pub fn resolve(&self, document: Option<&str>, name: &str) -> Option<&RankProfile> {
        let mut seen = HashSet::new();
        let mut schema = document;
        while let Some(current) = schema {
            if !seen.insert(current) {
                break;
            }
            if let Some(found) = self.get(Some(current), name) {
                return Some(found);
            }
            schema = self.schema_parents.get(current).map(String::as_str);
        }
        self.get(None, name)
    }

    /// Exact lookup without inheritance.
    pub fn get(&self, schema: Option<&str>, name: &str) -> Option<&RankProfile> {
        self.profiles
            .get(&schema.map(str::to_string))
            .and_then(|profiles| profiles.get(name))
    }

    /// Profiles owned by `schema` (or the global ones), sorted by name.
    pub fn rank_profiles_of(&self, schema: Option<&str>) -> Vec<&RankProfile> {
        self.profiles
            .get(&schema.map(str::to_string))
            .map(|profiles| profiles.values().collect())
            .unwrap_or_default()
    }

    /// Declared schema names.
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().filter_map(|k| k.as_deref())
    }
}
