// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Deployment manifest: the already-parsed schema model, as JSON.

use serde::{Deserialize, Serialize};

use super::GLOBAL_DIR;
use crate::codec::DEFAULT_QUALITY;
use crate::derive::DEFAULT_MAX_PROPERTIES;
use crate::model::{QueryProfileTypes, RankProfile, RankProfileRegistry, Schema};

/// Manifest format version this build understands.
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct DeploymentManifest {
    pub version: u32,
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,
    /// Profiles that belong to no schema.
    #[serde(default)]
    pub global_profiles: Vec<RankProfile>,
    #[serde(default)]
    pub query_profile_types: QueryProfileTypes,
    #[serde(default)]
    pub options: DeriveOptions,
}

/// A schema together with the rank profiles it declares.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct SchemaDefinition {
    #[serde(flatten)]
    pub schema: Schema,
    #[serde(default)]
    pub rank_profiles: Vec<RankProfile>,
}

/// Knobs for a derivation run.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DeriveOptions {
    /// Worker threads; 0 uses every available CPU.
    pub threads: usize,
    /// Per-profile property cap.
    pub max_properties: usize,
    /// Brotli quality for the property bag (0-11).
    pub compression_quality: u32,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            max_properties: DEFAULT_MAX_PROPERTIES,
            compression_quality: DEFAULT_QUALITY,
        }
    }
}

impl DeploymentManifest {
    pub fn from_json(text: &str) -> Result<Self, String> {
        let manifest: Self =
            serde_json::from_str(text).map_err(|e| format!("Invalid manifest JSON: {}", e))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(format!(
                "Unsupported manifest version {} (expected {})",
                manifest.version, MANIFEST_VERSION
            ));
        }
        manifest.validate_names()?;
        Ok(manifest)
    }

    /// Schema and profile names become output paths, so each must be a
    /// single plain path component. No schema may take the global directory.
    fn validate_names(&self) -> Result<(), String> {
        for definition in &self.schemas {
            let schema = &definition.schema.name;
            check_path_component("schema", schema)?;
            if schema == GLOBAL_DIR {
                return Err(format!("Schema name '{}' is reserved", GLOBAL_DIR));
            }
            for profile in &definition.rank_profiles {
                check_path_component("rank profile", &profile.name)?;
            }
        }
        for profile in &self.global_profiles {
            check_path_component("rank profile", &profile.name)?;
        }
        Ok(())
    }

    /// Build the profile registry. Schema profiles are re-homed under their
    /// schema; global profiles lose any schema they claimed.
    pub fn registry(&self) -> RankProfileRegistry {
        let mut registry = RankProfileRegistry::new();
        for definition in &self.schemas {
            let schema = &definition.schema;
            registry.add_schema(&schema.name, schema.inherits.as_deref());
            for profile in &definition.rank_profiles {
                let mut profile = profile.clone();
                profile.schema = Some(schema.name.clone());
                registry.add(profile);
            }
        }
        for profile in &self.global_profiles {
            let mut profile = profile.clone();
            profile.schema = None;
            registry.add(profile);
        }
        registry
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas
            .iter()
            .map(|d| &d.schema)
            .find(|s| s.name == name)
    }
}

fn check_path_component(kind: &str, name: &str) -> Result<(), String> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(format!("Invalid {} name '{}'", kind, name.escape_debug()));
    }
    Ok(())
}
