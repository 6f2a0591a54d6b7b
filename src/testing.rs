//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.

#![doc(hidden)]

use crate::derive::{DeriveContext, DEFAULT_MAX_PROPERTIES};
use crate::expression::ExpressionNode;
use crate::model::{
    Attribute, AttributeFields, FunctionDef, QueryProfileTypes, RankProfile, RankProfileRegistry,
    RankSetting, RankSettingValue, RankType, Schema,
};
use crate::native::NativeRankTypeDefinitionSet;

/// Parse an expression that is known to be valid.
pub fn expr(text: &str) -> ExpressionNode {
    match ExpressionNode::parse(text) {
        Ok(node) => node,
        Err(e) => panic!("test expression does not parse: {}", e),
    }
}

/// A profile with nothing set.
pub fn make_profile(name: &str, schema: Option<&str>) -> RankProfile {
    RankProfile::new(name, schema)
}

/// A profile inheriting from `parents`.
pub fn make_child(name: &str, schema: Option<&str>, parents: &[&str]) -> RankProfile {
    let mut profile = RankProfile::new(name, schema);
    profile.inherits = parents.iter().map(|p| p.to_string()).collect();
    profile
}

/// A profile whose first phase is `first_phase`.
pub fn profile_with_first_phase(name: &str, first_phase: &str) -> RankProfile {
    let mut profile = RankProfile::new(name, None);
    profile.first_phase = Some(expr(first_phase));
    profile
}

pub fn function(name: &str, params: &[&str], body: &str) -> FunctionDef {
    FunctionDef {
        name: name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
        body: expr(body),
    }
}

pub fn rank_type(field: &str, rank_type: RankType) -> RankSetting {
    RankSetting {
        field: field.to_string(),
        value: RankSettingValue::RankType(rank_type),
    }
}

pub fn weight(field: &str, weight: i64) -> RankSetting {
    RankSetting {
        field: field.to_string(),
        value: RankSettingValue::Weight(weight),
    }
}

/// Attributes with the given plain names.
pub fn attributes(names: &[&str]) -> AttributeFields {
    names.iter().map(|n| Attribute::new(*n)).collect()
}

/// A schema with the given attributes and no artifacts.
pub fn make_schema(name: &str, attribute_names: &[&str]) -> Schema {
    Schema {
        name: name.to_string(),
        attributes: attributes(attribute_names),
        ..Schema::default()
    }
}

/// Owns everything a [`DeriveContext`] borrows.
pub struct DeriveFixture {
    pub attributes: AttributeFields,
    pub registry: RankProfileRegistry,
    pub query_types: QueryProfileTypes,
    pub rank_types: NativeRankTypeDefinitionSet,
    pub max_properties: usize,
}

impl DeriveFixture {
    pub fn new() -> Self {
        Self {
            attributes: AttributeFields::new(),
            registry: RankProfileRegistry::new(),
            query_types: QueryProfileTypes::new(),
            rank_types: NativeRankTypeDefinitionSet::builtin(),
            max_properties: DEFAULT_MAX_PROPERTIES,
        }
    }

    pub fn with_attributes(names: &[&str]) -> Self {
        Self {
            attributes: attributes(names),
            ..Self::new()
        }
    }

    pub fn ctx(&self) -> DeriveContext<'_> {
        DeriveContext {
            attributes: &self.attributes,
            registry: &self.registry,
            query_types: &self.query_types,
            rank_types: &self.rank_types,
            max_properties: self.max_properties,
        }
    }
}

impl Default for DeriveFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `n` independent global profiles, each with a computed first phase and a
/// couple of functions.
pub fn independent_profiles(n: usize) -> Vec<RankProfile> {
    (0..n)
        .map(|i| {
            let mut profile = profile_with_first_phase(
                &format!("profile_{:03}", i),
                &format!("boost * attribute(price) + {}", i),
            );
            profile.functions = vec![
                function("boost", &[], &format!("query(w{}) * 2", i)),
                function("scale", &["x"], "x * 10"),
            ];
            profile.second_phase = Some(expr("scale(firstPhase)"));
            profile.summary_features.insert("boost".to_string());
            profile.rank_settings = vec![rank_type("title", RankType::Identity)];
            profile
        })
        .collect()
}
