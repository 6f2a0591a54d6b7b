// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Derive every rank profile of a schema.
//!
//! The orderer hands out batches, the pool derives each batch, results are
//! merged here on the calling thread in batch order. The first failing
//! profile aborts the whole derivation; a partial list is never returned.

use std::collections::BTreeMap;

use indexmap::IndexMap;

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;

use super::manifest::DeriveOptions;
use super::order::ProfileOrderer;
use super::parallel::WorkerPool;
use super::raw::RawRankProfile;
use crate::derive::{derive_profile, DeriveContext};
use crate::error::{DeriveError, DeriveWarning};
use crate::model::artifacts::FileArtifact;
use crate::model::{
    AttributeFields, LargeRankExpression, OnnxModel, QueryProfileTypes, RankProfileRegistry,
    RankingConstant, Schema,
};
use crate::native::NativeRankTypeDefinitionSet;

/// Derived rank profiles of one schema (or of the global set) and the file
/// artifacts they use.
#[derive(Debug, Clone, Default)]
pub struct RankProfileList {
    schema: Option<String>,
    /// In derivation order.
    profiles: IndexMap<String, RawRankProfile>,
    constants: BTreeMap<String, RankingConstant>,
    expressions: BTreeMap<String, LargeRankExpression>,
    onnx_models: BTreeMap<String, OnnxModel>,
    warnings: Vec<DeriveWarning>,
}

impl RankProfileList {
    /// Derive every profile of `schema`, or the global profiles when `None`.
    pub fn derive(
        schema: Option<&Schema>,
        registry: &RankProfileRegistry,
        query_types: &QueryProfileTypes,
        pool: &WorkerPool,
        options: &DeriveOptions,
    ) -> Result<Self, DeriveError> {
        Self::derive_inner(schema, registry, query_types, pool, options, &|_| {})
    }

    /// Same as [`derive`](Self::derive), ticking `progress` once per profile.
    #[cfg(feature = "parallel")]
    pub fn derive_with_progress(
        schema: Option<&Schema>,
        registry: &RankProfileRegistry,
        query_types: &QueryProfileTypes,
        pool: &WorkerPool,
        options: &DeriveOptions,
        progress: &ProgressBar,
    ) -> Result<Self, DeriveError> {
        Self::derive_inner(schema, registry, query_types, pool, options, &|raw| {
            progress.inc(1);
            progress.set_message(raw.name().to_string());
        })
    }

    fn derive_inner(
        schema: Option<&Schema>,
        registry: &RankProfileRegistry,
        query_types: &QueryProfileTypes,
        pool: &WorkerPool,
        options: &DeriveOptions,
        on_derived: &(dyn Fn(&RawRankProfile) + Sync),
    ) -> Result<Self, DeriveError> {
        let schema_name = schema.map(|s| s.name.as_str());
        let no_attributes = AttributeFields::new();
        let rank_types = NativeRankTypeDefinitionSet::builtin();
        let ctx = DeriveContext {
            attributes: schema.map_or(&no_attributes, |s| &s.attributes),
            registry,
            query_types,
            rank_types: &rank_types,
            max_properties: options.max_properties,
        };

        let mut list = Self {
            schema: schema_name.map(str::to_string),
            ..Self::default()
        };

        let mut orderer = ProfileOrderer::new(registry, schema_name);
        let mut batch_number = 0usize;
        while let Some(batch) = orderer.next_batch()? {
            batch_number += 1;
            tracing::debug!(
                schema = schema_name.unwrap_or("<global>"),
                batch = batch_number,
                size = batch.len(),
                "deriving batch"
            );

            let derived = pool.try_run_batch(&batch, |profile| {
                let raw = derive_profile(profile, &ctx).and_then(|derived| {
                    RawRankProfile::encode(derived, options.compression_quality)
                })?;
                on_derived(&raw);
                Ok::<_, DeriveError>(raw)
            })?;

            for raw in derived {
                list.warnings.extend(raw.warnings().iter().cloned());
                list.profiles.insert(raw.name().to_string(), raw);
            }
            orderer.complete(batch.iter().map(|p| p.name.as_str()));
        }

        match schema {
            Some(schema) => {
                list.constants = collect_artifacts(&schema.constants, &mut list.warnings);
                list.expressions = collect_artifacts(&schema.expressions, &mut list.warnings);
                list.onnx_models = collect_artifacts(&schema.onnx_models, &mut list.warnings);
            }
            None => {
                let declared: Vec<&OnnxModel> = list
                    .profiles
                    .keys()
                    .filter_map(|name| registry.get(None, name))
                    .flat_map(|profile| profile.onnx_models.iter())
                    .collect();
                list.onnx_models = collect_artifacts(declared, &mut list.warnings);
            }
        }

        tracing::info!(
            schema = schema_name.unwrap_or("<global>"),
            profiles = list.profiles.len(),
            batches = batch_number,
            warnings = list.warnings.len(),
            "derived rank profiles"
        );
        Ok(list)
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&RawRankProfile> {
        self.profiles.get(name)
    }

    /// Profiles in derivation order.
    pub fn profiles(&self) -> impl Iterator<Item = &RawRankProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn constants(&self) -> &BTreeMap<String, RankingConstant> {
        &self.constants
    }

    pub fn expressions(&self) -> &BTreeMap<String, LargeRankExpression> {
        &self.expressions
    }

    pub fn onnx_models(&self) -> &BTreeMap<String, OnnxModel> {
        &self.onnx_models
    }

    /// Every soft warning, from derivation and from artifact collection.
    pub fn warnings(&self) -> &[DeriveWarning] {
        &self.warnings
    }
}

/// Index artifacts by name, skipping those without a file reference.
fn collect_artifacts<'a, T, I>(items: I, warnings: &mut Vec<DeriveWarning>) -> BTreeMap<String, T>
where
    T: FileArtifact + Clone + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut out = BTreeMap::new();
    for item in items {
        if item.file_reference().is_empty() {
            tracing::warn!(kind = T::KIND, name = item.name(), "skipping: empty file reference");
            warnings.push(DeriveWarning::EmptyFileReference {
                kind: T::KIND,
                name: item.name().to_string(),
            });
            continue;
        }
        out.insert(item.name().to_string(), item.clone());
    }
    out
}
