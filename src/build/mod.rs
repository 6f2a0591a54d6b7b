// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Deployment-level derivation: manifest in, blobs and config out.
//!
//! Layout of the output directory:
//!
//! ```text
//! <out>/<schema>/<profile>.fef      property bag blob per profile
//! <out>/<schema>/rank-profiles.json
//! <out>/<schema>/ranking-constants.json
//! <out>/<schema>/ranking-expressions.json
//! <out>/<schema>/onnx-models.json
//! <out>/_global/...                 same, for profiles without a schema
//! ```

pub mod list;
pub mod manifest;
pub mod order;
pub mod parallel;
pub mod raw;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

#[cfg(feature = "parallel")]
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::config::ConfigArtifact;
use crate::model::Schema;

pub use list::RankProfileList;
pub use manifest::{DeploymentManifest, DeriveOptions, SchemaDefinition, MANIFEST_VERSION};
pub use order::{plan, ProfileOrderer};
pub use parallel::WorkerPool;
pub use raw::RawRankProfile;

/// Directory name used for profiles without a schema.
pub const GLOBAL_DIR: &str = "_global";

/// What a derivation run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeriveSummary {
    pub schemas: usize,
    pub profiles: usize,
    pub bytes_written: usize,
    pub warnings: Vec<String>,
    pub output_dirs: Vec<PathBuf>,
}

#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╸")
}

/// Derive every schema of the manifest at `manifest_path` into `output_dir`.
///
/// `threads` overrides the manifest's thread setting.
pub fn run_derive(
    manifest_path: &Path,
    output_dir: &Path,
    threads: Option<usize>,
) -> anyhow::Result<DeriveSummary> {
    let content = fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;
    let manifest = DeploymentManifest::from_json(&content).map_err(anyhow::Error::msg)?;

    let mut options = manifest.options.clone();
    if let Some(threads) = threads {
        options.threads = threads;
    }
    let pool = WorkerPool::new(options.threads)?;
    let registry = manifest.registry();
    tracing::info!(
        schemas = manifest.schemas.len(),
        threads = pool.threads(),
        "starting derivation"
    );

    #[cfg(feature = "parallel")]
    let multi = MultiProgress::new();

    let mut summary = DeriveSummary::default();
    let mut targets: Vec<(Option<&Schema>, String)> = manifest
        .schemas
        .iter()
        .map(|d| (Some(&d.schema), d.schema.name.clone()))
        .collect();
    if !manifest.global_profiles.is_empty() {
        targets.push((None, GLOBAL_DIR.to_string()));
    }

    for (schema, dir_name) in targets {
        let schema_name = schema.map(|s| s.name.as_str());

        #[cfg(feature = "parallel")]
        let list = {
            let total = registry.rank_profiles_of(schema_name).len();
            let pb = multi.add(ProgressBar::new(total as u64));
            pb.set_style(create_progress_style());
            pb.set_prefix(dir_name.clone());
            let list = RankProfileList::derive_with_progress(
                schema,
                &registry,
                &manifest.query_profile_types,
                &pool,
                &options,
                &pb,
            )
            .with_context(|| format!("Failed to derive rank profiles of '{}'", dir_name))?;
            pb.finish_with_message(format!("{} profiles", list.len()));
            list
        };

        #[cfg(not(feature = "parallel"))]
        let list = RankProfileList::derive(
            schema,
            &registry,
            &manifest.query_profile_types,
            &pool,
            &options,
        )
        .with_context(|| format!("Failed to derive rank profiles of '{}'", dir_name))?;

        let dir = output_dir.join(&dir_name);
        summary.bytes_written += write_list(&list, &dir)?;
        summary.profiles += list.len();
        summary
            .warnings
            .extend(list.warnings().iter().map(ToString::to_string));
        if schema_name.is_some() {
            summary.schemas += 1;
        }
        summary.output_dirs.push(dir);
    }

    Ok(summary)
}

/// Write blobs and every config artifact of `list` into `dir`. Returns bytes written.
pub fn write_list(list: &RankProfileList, dir: &Path) -> anyhow::Result<usize> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = 0;
    for raw in list.profiles() {
        let path = dir.join(format!("{}.fef", raw.name()));
        fs::write(&path, raw.blob())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written += raw.blob().len();
    }

    for artifact in ConfigArtifact::export_all(list)? {
        let path = dir.join(artifact.kind().file_name());
        let json = artifact.to_json()?;
        fs::write(&path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
        written += json.len();
    }
    Ok(written)
}
