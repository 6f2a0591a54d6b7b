// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Inheritance ordering.
//!
//! Profiles are derived in batches. A batch holds every remaining profile
//! whose parents are all derived already (or live in another schema, which
//! is derived on its own). The caller derives a batch, reports it complete,
//! and only then asks for the next one. `default` always goes first, alone.
//!
//! A round in which nothing is ready means some parent never resolves: a
//! typo, a missing profile or a cycle. That is an error, never a hang.

use std::collections::HashSet;

use crate::error::{DeriveError, StuckProfile};
use crate::model::{RankProfile, RankProfileRegistry, DEFAULT_PROFILE};

pub struct ProfileOrderer<'a> {
    registry: &'a RankProfileRegistry,
    schema: Option<&'a str>,
    remaining: Vec<&'a RankProfile>,
    compiled: HashSet<String>,
}

impl<'a> ProfileOrderer<'a> {
    /// Order the profiles `registry` holds for `schema`.
    pub fn new(registry: &'a RankProfileRegistry, schema: Option<&'a str>) -> Self {
        Self::with_profiles(registry, schema, registry.rank_profiles_of(schema))
    }

    /// Order an explicit set of profiles, resolving parents through `registry`.
    pub fn with_profiles(
        registry: &'a RankProfileRegistry,
        schema: Option<&'a str>,
        profiles: Vec<&'a RankProfile>,
    ) -> Self {
        Self {
            registry,
            schema,
            remaining: profiles,
            compiled: HashSet::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.remaining.is_empty()
    }

    /// The next batch, sorted by name. `Ok(None)` once everything is handed out.
    ///
    /// Profiles handed out are not considered derived until [`complete`] is
    /// called with them.
    ///
    /// [`complete`]: ProfileOrderer::complete
    pub fn next_batch(&mut self) -> Result<Option<Vec<&'a RankProfile>>, DeriveError> {
        if self.remaining.is_empty() {
            return Ok(None);
        }

        if self.schema.is_some() && !self.compiled.contains(DEFAULT_PROFILE) {
            if let Some(pos) = self.remaining.iter().position(|p| p.is_default()) {
                return Ok(Some(vec![self.remaining.remove(pos)]));
            }
        }

        let (mut ready, waiting): (Vec<_>, Vec<_>) =
            self.remaining.iter().copied().partition(|p| self.is_ready(p));
        if ready.is_empty() {
            return Err(DeriveError::UnresolvableInheritance {
                stuck: self.stuck(),
            });
        }
        ready.sort_by(|a, b| a.name.cmp(&b.name));
        self.remaining = waiting;
        Ok(Some(ready))
    }

    /// Mark profiles as derived; their children may become ready.
    pub fn complete<'p>(&mut self, names: impl IntoIterator<Item = &'p str>) {
        self.compiled
            .extend(names.into_iter().map(str::to_string));
    }

    fn is_ready(&self, profile: &RankProfile) -> bool {
        profile
            .inherits
            .iter()
            .all(|parent| self.is_available(profile, parent))
    }

    fn is_available(&self, profile: &RankProfile, parent: &str) -> bool {
        if self.compiled.contains(parent) {
            return true;
        }
        self.registry
            .resolve(profile.schema.as_deref(), parent)
            .is_some_and(|resolved| resolved.schema != profile.schema)
    }

    fn stuck(&self) -> Vec<StuckProfile> {
        let mut stuck: Vec<StuckProfile> = self
            .remaining
            .iter()
            .map(|p| StuckProfile {
                profile: p.name.clone(),
                missing: p
                    .inherits
                    .iter()
                    .filter(|parent| !self.is_available(p, parent))
                    .cloned()
                    .collect(),
            })
            .collect();
        stuck.sort_by(|a, b| a.profile.cmp(&b.profile));
        stuck
    }
}

/// Every batch, completing each one immediately.
pub fn plan(
    registry: &RankProfileRegistry,
    schema: Option<&str>,
) -> Result<Vec<Vec<String>>, DeriveError> {
    let mut orderer = ProfileOrderer::new(registry, schema);
    let mut batches = Vec::new();
    while let Some(batch) = orderer.next_batch()? {
        let names: Vec<String> = batch.iter().map(|p| p.name.clone()).collect();
        orderer.complete(names.iter().map(String::as_str));
        batches.push(names);
    }
    Ok(batches)
}
