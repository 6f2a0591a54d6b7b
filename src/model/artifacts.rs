// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! File-backed rank artifacts: constants, large expressions, ONNX models.
//!
//! The content lives in distributed files; derivation only passes the file
//! references through to the exported config.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to a distributed file. Empty means "not distributed yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference(String);

impl FileReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FileReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something with a name and a file reference.
pub trait FileArtifact {
    const KIND: &'static str;

    fn name(&self) -> &str;
    fn file_reference(&self) -> &FileReference;
}

/// A tensor constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConstant {
    pub name: String,
    #[serde(rename = "type")]
    pub tensor_type: String,
    #[serde(default)]
    pub file_reference: FileReference,
}

/// An expression too large to inline in the property bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeRankExpression {
    pub name: String,
    #[serde(default)]
    pub file_reference: FileReference,
}

/// An ONNX model and how to run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnnxModel {
    pub name: String,
    #[serde(default)]
    pub file_reference: FileReference,
    /// Model input name → feature that feeds it.
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
    /// Model output name → exposed feature name.
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    #[serde(default)]
    pub execution_mode: Option<String>,
    #[serde(default)]
    pub inter_op_threads: Option<i64>,
    #[serde(default)]
    pub intra_op_threads: Option<i64>,
    #[serde(default)]
    pub gpu_device: Option<i64>,
}

impl OnnxModel {
    pub fn new(name: impl Into<String>, file_reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_reference: FileReference::new(file_reference),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            execution_mode: None,
            inter_op_threads: None,
            intra_op_threads: None,
            gpu_device: None,
        }
    }
}

impl FileArtifact for RankingConstant {
    const KIND: &'static str = "constant";

    fn name(&self) -> &str {
        &self.name
    }

    fn file_reference(&self) -> &FileReference {
        &self.file_reference
    }
}

impl FileArtifact for LargeRankExpression {
    const KIND: &'static str = "expression";

    fn name(&self) -> &str {
        &self.name
    }

    fn file_reference(&self) -> &FileReference {
        &self.file_reference
    }
}

impl FileArtifact for OnnxModel {
    const KIND: &'static str = "onnx model";

    fn name(&self) -> &str {
        &self.name
    }

    fn file_reference(&self) -> &FileReference {
        &self.file_reference
    }
}
