// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Resolved schema model: the input to derivation.
//!
//! Everything here is produced once per deployment (parsed from the manifest)
//! and read-only afterwards. Deriving never mutates a [`RankProfile`]; it
//! works on a snapshot.

pub mod artifacts;
pub mod attribute;
pub mod registry;

use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::expression::ExpressionNode;

pub use artifacts::{FileReference, LargeRankExpression, OnnxModel, RankingConstant};
pub use attribute::{Attribute, AttributeFields, CollectionType};
pub use registry::RankProfileRegistry;

/// Name of the profile every schema has.
pub const DEFAULT_PROFILE: &str = "default";

/// Query profile types: `query(name)` feature → declared type.
pub type QueryProfileTypes = BTreeMap<String, String>;

/// Abstract rank type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankType {
    /// Engine default. Never materialized as tables.
    Default,
    Identity,
    About,
    Tags,
    Empty,
}

impl RankType {
    pub fn name(self) -> &'static str {
        match self {
            RankType::Default => "default",
            RankType::Identity => "identity",
            RankType::About => "about",
            RankType::Tags => "tags",
            RankType::Empty => "empty",
        }
    }
}

/// What a per-field rank setting sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankSettingValue {
    RankType(RankType),
    Weight(i64),
}

/// `rank-type` or `weight` for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSetting {
    pub field: String,
    #[serde(flatten)]
    pub value: RankSettingValue,
}

/// Explicit `rank-properties` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankProperty {
    pub name: String,
    pub value: String,
}

/// A named sub-expression. Zero parameters means it is emitted as its own
/// script; with parameters it is expanded at every call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub body: ExpressionNode,
}

/// Scalar tuning knobs. Unset means "leave the engine default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub rerank_count: Option<i64>,
    pub keep_rank_count: Option<i64>,
    pub rank_score_drop_limit: Option<f64>,
    pub num_threads_per_search: Option<i64>,
    pub min_hits_per_thread: Option<i64>,
    pub num_search_partitions: Option<i64>,
    pub termwise_limit: Option<f64>,
}

/// Diversity cutoff strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutoffStrategy {
    #[default]
    Loose,
    Strict,
}

impl CutoffStrategy {
    pub fn name(self) -> &'static str {
        match self {
            CutoffStrategy::Loose => "loose",
            CutoffStrategy::Strict => "strict",
        }
    }
}

/// Result diversity within match-phase degradation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversitySettings {
    pub attribute: String,
    #[serde(default = "default_min_groups")]
    pub min_groups: u64,
    #[serde(default = "default_cutoff_factor")]
    pub cutoff_factor: f64,
    #[serde(default)]
    pub cutoff_strategy: CutoffStrategy,
}

fn default_min_groups() -> u64 {
    1
}

fn default_cutoff_factor() -> f64 {
    10.0
}

/// Match-phase degradation on a single-value attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPhaseSettings {
    pub attribute: String,
    #[serde(default)]
    pub ascending: bool,
    pub max_hits: u64,
    #[serde(default = "default_max_filter_coverage")]
    pub max_filter_coverage: f64,
    #[serde(default = "default_evaluation_point")]
    pub evaluation_point: f64,
    #[serde(default = "default_post_filter_multiplier")]
    pub post_filter_multiplier: f64,
    #[serde(default)]
    pub diversity: Option<DiversitySettings>,
}

fn default_max_filter_coverage() -> f64 {
    0.2
}

fn default_evaluation_point() -> f64 {
    0.2
}

fn default_post_filter_multiplier() -> f64 {
    1.0
}

/// A resolved rank profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankProfile {
    pub name: String,
    /// Owning schema; `None` for global profiles.
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub inherits: Vec<String>,
    #[serde(default)]
    pub first_phase: Option<ExpressionNode>,
    #[serde(default)]
    pub second_phase: Option<ExpressionNode>,
    #[serde(default)]
    pub functions: Vec<FunctionDef>,
    #[serde(default)]
    pub rank_properties: Vec<RankProperty>,
    #[serde(default)]
    pub rank_settings: Vec<RankSetting>,
    #[serde(default)]
    pub summary_features: IndexSet<String>,
    #[serde(default)]
    pub rank_features: IndexSet<String>,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub match_phase: Option<MatchPhaseSettings>,
    #[serde(default)]
    pub ignore_default_rank_features: bool,
    #[serde(default)]
    pub filter_fields: IndexSet<String>,
    /// Declared `query(name)` inputs and their types.
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    #[serde(default)]
    pub onnx_models: Vec<OnnxModel>,
}

impl RankProfile {
    pub fn new(name: impl Into<String>, schema: Option<&str>) -> Self {
        Self {
            name: name.into(),
            schema: schema.map(str::to_string),
            inherits: Vec::new(),
            first_phase: None,
            second_phase: None,
            functions: Vec::new(),
            rank_properties: Vec::new(),
            rank_settings: Vec::new(),
            summary_features: IndexSet::new(),
            rank_features: IndexSet::new(),
            tuning: Tuning::default(),
            match_phase: None,
            ignore_default_rank_features: false,
            filter_fields: IndexSet::new(),
            inputs: BTreeMap::new(),
            onnx_models: Vec::new(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_PROFILE
    }
}

/// A schema as seen by derivation: its attributes and rank artifacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub inherits: Option<String>,
    #[serde(default)]
    pub attributes: AttributeFields,
    #[serde(default)]
    pub constants: Vec<RankingConstant>,
    #[serde(default)]
    pub expressions: Vec<LargeRankExpression>,
    #[serde(default)]
    pub onnx_models: Vec<OnnxModel>,
}
