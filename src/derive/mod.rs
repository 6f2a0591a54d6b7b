// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-profile derivation: one [`RankProfile`] in, one ordered property list out.
//!
//! The emitted order is fixed and is part of the output contract:
//!
//! 1. explicit rank properties (`.partN`)
//! 2. function scripts
//! 3. first and second phase
//! 4. native tables, then field weights
//! 5. summary features, dump features, `ignoredefaultfeatures`
//! 6. tuning, match phase
//! 7. filter fields, attribute types, query types
//!
//! Derivation is a pure function of its inputs. Nothing here touches shared
//! mutable state, which is what lets the orchestrator run profiles of one
//! batch concurrently and still get byte-identical output.

pub mod functions;
pub mod properties;
pub mod tuning;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;

use crate::codec::Property;
use crate::error::{DeriveError, DeriveWarning};
use crate::expression::ExpressionNode;
use crate::model::{
    AttributeFields, QueryProfileTypes, RankProfile, RankProfileRegistry, RankSettingValue,
    RankType,
};
use crate::native::{FieldRankSettings, NativeRankTypeDefinitionSet};

pub use functions::FunctionInliner;
pub use properties::{strip_part_suffix, PropertyList, DEFAULT_MAX_PROPERTIES};

pub const FIRST_PHASE: &str = "firstphase";
pub const SECOND_PHASE: &str = "secondphase";

const FIRST_PHASE_SCRIPT: &str = "rankingExpression(firstphase).rankingScript";
const SECOND_PHASE_SCRIPT: &str = "rankingExpression(secondphase).rankingScript";

/// Everything a derivation reads besides the profile itself.
#[derive(Debug, Clone, Copy)]
pub struct DeriveContext<'a> {
    pub attributes: &'a AttributeFields,
    pub registry: &'a RankProfileRegistry,
    pub query_types: &'a QueryProfileTypes,
    pub rank_types: &'a NativeRankTypeDefinitionSet,
    pub max_properties: usize,
}

/// The ordered properties of one profile, plus what went softly wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedProfile {
    pub name: String,
    pub properties: Vec<Property>,
    pub warnings: Vec<DeriveWarning>,
}

impl DerivedProfile {
    /// First value for `key`, if emitted.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Derive the ordered property list of one profile.
pub fn derive_profile(
    profile: &RankProfile,
    ctx: &DeriveContext<'_>,
) -> Result<DerivedProfile, DeriveError> {
    let _span = tracing::debug_span!("derive_profile", profile = %profile.name).entered();
    let mut warnings = Vec::new();
    let mut out = PropertyList::new(&profile.name, ctx.max_properties);

    let attribute_types: Vec<(&str, &str)> = ctx.attributes.tensor_types().collect();
    let query_types = query_feature_types(profile, ctx.query_types);

    // Explicit properties come first. Phase overrides are lifted out of the
    // list and replace the declared phase.
    let mut first_phase = profile.first_phase.clone();
    let mut second_phase = profile.second_phase.clone();
    for property in &profile.rank_properties {
        match property.name.as_str() {
            FIRST_PHASE_SCRIPT => {
                first_phase = Some(parse_phase(profile, FIRST_PHASE, &property.value)?);
            }
            SECOND_PHASE_SCRIPT => {
                second_phase = Some(parse_phase(profile, SECOND_PHASE, &property.value)?);
            }
            name => out.push_part(name, property.value.as_str())?,
        }
    }

    let inliner = FunctionInliner::new(profile);
    for (name, script) in inliner.scripts()? {
        out.push(format!("rankingExpression({}).rankingScript", name), script)?;
    }

    let first_phase = first_phase.map(|e| inliner.rewrite(e)).transpose()?;
    let second_phase = second_phase.map(|e| inliner.rewrite(e)).transpose()?;
    emit_phase(&mut out, FIRST_PHASE, first_phase.as_ref())?;
    emit_phase(&mut out, SECOND_PHASE, second_phase.as_ref())?;

    for settings in native_tables(profile, ctx, &mut warnings)?.values() {
        for (key, value) in settings.properties() {
            out.push(key, value)?;
        }
    }
    // First weight per field wins, like native tables.
    let mut weights: IndexMap<&str, i64> = IndexMap::new();
    for setting in &profile.rank_settings {
        if let RankSettingValue::Weight(weight) = setting.value {
            if let Some(&kept) = weights.get(setting.field.as_str()) {
                tracing::warn!(
                    profile = %profile.name,
                    field = %setting.field,
                    kept,
                    ignored = weight,
                    "duplicate field weight, keeping the first"
                );
                warnings.push(DeriveWarning::DuplicateFieldWeight {
                    profile: profile.name.clone(),
                    field: setting.field.clone(),
                    kept,
                    ignored: weight,
                });
                continue;
            }
            weights.insert(setting.field.as_str(), weight);
        }
    }
    for (field, weight) in weights {
        out.push(format!("vespa.fieldweight.{}", field), weight.to_string())?;
    }

    for feature in &profile.summary_features {
        out.push_part("vespa.summary.feature", inliner.rewrite_feature(feature))?;
    }
    for feature in &profile.rank_features {
        out.push_part("vespa.dump.feature", inliner.rewrite_feature(feature))?;
    }
    if profile.ignore_default_rank_features {
        out.push("vespa.dump.ignoredefaultfeatures", "true")?;
    }

    tuning::emit_tuning(&mut out, &profile.tuning)?;
    if let Some(ref match_phase) = profile.match_phase {
        tuning::emit_match_phase(&mut out, match_phase)?;
    }

    for field in filter_fields(profile, ctx.registry) {
        out.push(format!("vespa.isfilterfield.{}.part42", field), "true")?;
    }
    for (name, tensor_type) in attribute_types {
        out.push(format!("vespa.type.attribute.{}", name), tensor_type)?;
    }
    for (name, value_type) in query_types {
        out.push(format!("vespa.type.query.{}", name), value_type)?;
    }

    tracing::debug!(
        properties = out.len(),
        warnings = warnings.len(),
        "derived rank profile"
    );
    Ok(DerivedProfile {
        name: profile.name.clone(),
        properties: out.into_properties(),
        warnings,
    })
}

fn parse_phase(
    profile: &RankProfile,
    phase: &str,
    text: &str,
) -> Result<ExpressionNode, DeriveError> {
    ExpressionNode::parse(text).map_err(|source| DeriveError::InvalidPhaseExpression {
        profile: profile.name.clone(),
        phase: phase.to_string(),
        source,
    })
}

/// A bare reference is handed to the engine as-is; anything computed gets
/// its own script.
fn emit_phase(
    out: &mut PropertyList,
    phase: &str,
    expression: Option<&ExpressionNode>,
) -> Result<(), DeriveError> {
    let Some(expression) = expression else {
        return Ok(());
    };
    let key = format!("vespa.rank.{}", phase);
    match expression.as_reference() {
        Some(reference) => out.push(key, reference.to_string()),
        None => {
            out.push(key, format!("rankingExpression({})", phase))?;
            out.push(
                format!("rankingExpression({}).rankingScript", phase),
                expression.to_string(),
            )
        }
    }
}

/// Query input types: context types overlaid by the profile's own inputs.
fn query_feature_types(
    profile: &RankProfile,
    context: &QueryProfileTypes,
) -> BTreeMap<String, String> {
    let mut types = context.clone();
    types.extend(
        profile
            .inputs
            .iter()
            .map(|(name, value_type)| (name.clone(), value_type.clone())),
    );
    types
}

/// Resolve every explicit non-default rank type into per-field tables.
fn native_tables(
    profile: &RankProfile,
    ctx: &DeriveContext<'_>,
    warnings: &mut Vec<DeriveWarning>,
) -> Result<IndexMap<String, FieldRankSettings>, DeriveError> {
    let mut fields: IndexMap<String, FieldRankSettings> = IndexMap::new();
    for setting in &profile.rank_settings {
        let RankSettingValue::RankType(rank_type) = setting.value else {
            continue;
        };
        if rank_type == RankType::Default {
            continue;
        }
        let definition = ctx.rank_types.definition(rank_type).ok_or_else(|| {
            DeriveError::UnsupportedRankType {
                profile: profile.name.clone(),
                field: setting.field.clone(),
                rank_type: rank_type.name().to_string(),
                supported: ctx.rank_types.supported(),
            }
        })?;

        let is_attribute = ctx.attributes.is_attribute(&setting.field);
        let settings = fields
            .entry(setting.field.clone())
            .or_insert_with(|| FieldRankSettings::new(&setting.field));
        for table in definition.tables_for(is_attribute) {
            if let Some(duplicate) = settings.add_table(table.clone()) {
                warnings.push(DeriveWarning::DuplicateNativeTable {
                    profile: profile.name.clone(),
                    field: setting.field.clone(),
                    kept: duplicate.kept.to_string(),
                    ignored: duplicate.ignored.to_string(),
                });
            }
        }
    }
    fields.retain(|_, settings| !settings.is_empty());
    Ok(fields)
}

/// Filter fields of the profile and of everything it inherits, sorted.
fn filter_fields(profile: &RankProfile, registry: &RankProfileRegistry) -> BTreeSet<String> {
    let mut fields: BTreeSet<String> = profile.filter_fields.iter().cloned().collect();
    let mut visited: HashSet<(Option<String>, String)> = HashSet::new();
    let mut pending: Vec<(Option<&str>, &str)> = profile
        .inherits
        .iter()
        .map(|parent| (profile.schema.as_deref(), parent.as_str()))
        .collect();

    while let Some((schema, name)) = pending.pop() {
        let Some(parent) = registry.resolve(schema, name) else {
            continue;
        };
        if !visited.insert((parent.schema.clone(), parent.name.clone())) {
            continue;
        }
        fields.extend(parent.filter_fields.iter().cloned());
        pending.extend(
            parent
                .inherits
                .iter()
                .map(|grandparent| (parent.schema.as_deref(), grandparent.as_str())),
        );
    }
    fields
}
