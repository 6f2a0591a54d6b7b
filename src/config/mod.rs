// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Config export.
//!
//! A [`RankProfileList`] exposes four independent artifacts. Each kind has
//! its own serializable shape; there is no reflection and no open-ended
//! "any config" path. Rank profiles are exported the way the engine reads
//! them: grouped under a `fef` section per profile, with `.partN` suffixes
//! stripped.

use serde::Serialize;

use crate::build::RankProfileList;
use crate::error::CodecError;

/// The closed set of exportable artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    RankProfiles,
    RankingConstants,
    RankingExpressions,
    OnnxModels,
}

impl ConfigKind {
    pub const ALL: [ConfigKind; 4] = [
        ConfigKind::RankProfiles,
        ConfigKind::RankingConstants,
        ConfigKind::RankingExpressions,
        ConfigKind::OnnxModels,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigKind::RankProfiles => "rank-profiles",
            ConfigKind::RankingConstants => "ranking-constants",
            ConfigKind::RankingExpressions => "ranking-expressions",
            ConfigKind::OnnxModels => "onnx-models",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FefProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FefSection {
    pub property: Vec<FefProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankProfileEntry {
    pub name: String,
    pub fef: FefSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankProfilesConfig {
    pub rankprofile: Vec<RankProfileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantEntry {
    pub name: String,
    pub fileref: String,
    #[serde(rename = "type")]
    pub tensor_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingConstantsConfig {
    pub constant: Vec<ConstantEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionEntry {
    pub name: String,
    pub fileref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingExpressionsConfig {
    pub expression: Vec<ExpressionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnnxInput {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnnxOutput {
    pub name: String,
    #[serde(rename = "as")]
    pub as_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnnxModelEntry {
    pub name: String,
    pub fileref: String,
    pub input: Vec<OnnxInput>,
    pub output: Vec<OnnxOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateless_execution_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateless_interop_threads: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stateless_intraop_threads: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_device: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnnxModelsConfig {
    pub model: Vec<OnnxModelEntry>,
}

/// One exported artifact, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConfigArtifact {
    RankProfiles(RankProfilesConfig),
    RankingConstants(RankingConstantsConfig),
    RankingExpressions(RankingExpressionsConfig),
    OnnxModels(OnnxModelsConfig),
}

impl ConfigArtifact {
    /// Build one artifact from a derived list.
    pub fn export(list: &RankProfileList, kind: ConfigKind) -> Result<Self, CodecError> {
        let artifact = match kind {
            ConfigKind::RankProfiles => ConfigArtifact::RankProfiles(rank_profiles(list)?),
            ConfigKind::RankingConstants => {
                ConfigArtifact::RankingConstants(RankingConstantsConfig {
                    constant: list
                        .constants()
                        .values()
                        .map(|c| ConstantEntry {
                            name: c.name.clone(),
                            fileref: c.file_reference.to_string(),
                            tensor_type: c.tensor_type.clone(),
                        })
                        .collect(),
                })
            }
            ConfigKind::RankingExpressions => {
                ConfigArtifact::RankingExpressions(RankingExpressionsConfig {
                    expression: list
                        .expressions()
                        .values()
                        .map(|e| ExpressionEntry {
                            name: e.name.clone(),
                            fileref: e.file_reference.to_string(),
                        })
                        .collect(),
                })
            }
            ConfigKind::OnnxModels => ConfigArtifact::OnnxModels(OnnxModelsConfig {
                model: list
                    .onnx_models()
                    .values()
                    .map(|m| OnnxModelEntry {
                        name: m.name.clone(),
                        fileref: m.file_reference.to_string(),
                        input: m
                            .inputs
                            .iter()
                            .map(|(name, source)| OnnxInput {
                                name: name.clone(),
                                source: source.clone(),
                            })
                            .collect(),
                        output: m
                            .outputs
                            .iter()
                            .map(|(name, as_name)| OnnxOutput {
                                name: name.clone(),
                                as_name: as_name.clone(),
                            })
                            .collect(),
                        stateless_execution_mode: m.execution_mode.clone(),
                        stateless_interop_threads: m.inter_op_threads,
                        stateless_intraop_threads: m.intra_op_threads,
                        gpu_device: m.gpu_device,
                    })
                    .collect(),
            }),
        };
        Ok(artifact)
    }

    /// Every artifact kind, in [`ConfigKind::ALL`] order.
    pub fn export_all(list: &RankProfileList) -> Result<Vec<Self>, CodecError> {
        ConfigKind::ALL
            .iter()
            .map(|kind| Self::export(list, *kind))
            .collect()
    }

    pub fn kind(&self) -> ConfigKind {
        match self {
            ConfigArtifact::RankProfiles(_) => ConfigKind::RankProfiles,
            ConfigArtifact::RankingConstants(_) => ConfigKind::RankingConstants,
            ConfigArtifact::RankingExpressions(_) => ConfigKind::RankingExpressions,
            ConfigArtifact::OnnxModels(_) => ConfigKind::OnnxModels,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn rank_profiles(list: &RankProfileList) -> Result<RankProfilesConfig, CodecError> {
    let rankprofile = list
        .profiles()
        .map(|raw| {
            let property = raw
                .fef_properties()?
                .into_iter()
                .map(|(name, value)| FefProperty { name, value })
                .collect();
            Ok(RankProfileEntry {
                name: raw.name().to_string(),
                fef: FefSection { property },
            })
        })
        .collect::<Result<Vec<_>, CodecError>>()?;
    Ok(RankProfilesConfig { rankprofile })
}
