// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types for derivation and encoding.
//!
//! Three families, one per layer. `CodecError` is about bytes: bad framing,
//! corrupted blobs, properties that would break the marker scheme.
//! `ExpressionError` is about ranking expression text. `DeriveError` is what
//! a deployment sees: it names the profile, the field and the construct that
//! made derivation impossible.
//!
//! Soft problems (duplicate native tables, empty file references) are not
//! errors. They are logged and recorded as [`DeriveWarning`]s on the result.

use std::fmt;

/// Failure to encode or decode a property bag blob.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A key or value contains one of the reserved markers.
    #[error("property {key:?} contains reserved marker {marker:?}")]
    ReservedMarker { key: String, marker: &'static str },
    /// The blob is shorter than header + footer.
    #[error("blob too short: {len} bytes")]
    Truncated { len: usize },
    /// Header magic mismatch.
    #[error("invalid header magic: {found:?}")]
    BadMagic { found: [u8; 4] },
    /// Footer magic mismatch.
    #[error("invalid footer magic: {found:?}")]
    BadFooter { found: [u8; 4] },
    /// Unsupported format version.
    #[error("unsupported blob version {found} (expected {expected})")]
    UnsupportedVersion { expected: u8, found: u8 },
    /// CRC32 over header and body does not match the footer.
    #[error("checksum mismatch: stored {stored:08x}, computed {computed:08x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    /// Declared uncompressed length exceeds the safety limit.
    #[error("declared length {len} exceeds limit {limit}")]
    TooLarge { len: usize, limit: usize },
    /// Brotli stream failed to encode.
    #[error("compression failed: {0}")]
    Compress(String),
    /// Brotli stream failed to decode.
    #[error("decompression failed: {0}")]
    Decompress(String),
    /// Decompressed size does not match the header.
    #[error("length mismatch: header says {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// Decompressed bytes are not UTF-8.
    #[error("property bag is not valid UTF-8")]
    InvalidUtf8,
    /// A chunk did not split into exactly key and value.
    #[error("malformed property at index {index}: {chunk:?}")]
    MalformedEntry { index: usize, chunk: String },
}

/// Failure to parse a ranking expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset} in '{source_text}'")]
pub struct ExpressionError {
    pub message: String,
    pub offset: usize,
    pub source_text: String,
}

/// Hard derivation failure. Always fails the deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    /// An overridden phase script could not be parsed.
    #[error("rank profile '{profile}': could not parse {phase} expression: {source}")]
    InvalidPhaseExpression {
        profile: String,
        phase: String,
        #[source]
        source: ExpressionError,
    },
    /// A function body could not be parsed.
    #[error("rank profile '{profile}': could not parse function '{function}': {source}")]
    InvalidFunction {
        profile: String,
        function: String,
        #[source]
        source: ExpressionError,
    },
    /// A rank type with no native table definition.
    #[error(
        "rank profile '{profile}', field '{field}': rank type '{rank_type}' is known but has no implementation. Supported rank types: {supported:?}"
    )]
    UnsupportedRankType {
        profile: String,
        field: String,
        rank_type: String,
        supported: Vec<String>,
    },
    /// A function with parameters calls itself, directly or indirectly.
    #[error("rank profile '{profile}': function '{function}' expands recursively")]
    RecursiveFunction { profile: String, function: String },
    /// A function with parameters was called with the wrong arity.
    #[error(
        "rank profile '{profile}': function '{function}' takes {expected} arguments, got {actual}"
    )]
    FunctionArity {
        profile: String,
        function: String,
        expected: usize,
        actual: usize,
    },
    /// The property cap was reached.
    #[error("rank profile '{profile}': too many rank properties ({count} >= {limit})")]
    TooManyProperties {
        profile: String,
        count: usize,
        limit: usize,
    },
    /// Profiles whose inherited names never become compiled.
    #[error("unresolvable or cyclic rank profile inheritance: {}", format_stuck(.stuck))]
    UnresolvableInheritance { stuck: Vec<StuckProfile> },
    /// The property bag could not be encoded.
    #[error("rank profile '{profile}': {source}")]
    Codec {
        profile: String,
        #[source]
        source: CodecError,
    },
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// A profile the orderer could not schedule, with the parents it was waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuckProfile {
    pub profile: String,
    pub missing: Vec<String>,
}

fn format_stuck(stuck: &[StuckProfile]) -> String {
    stuck
        .iter()
        .map(|s| format!("'{}' waits on [{}]", s.profile, s.missing.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A soft problem: logged, recorded, and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveWarning {
    /// A second native table of the same type was registered for a field.
    DuplicateNativeTable {
        profile: String,
        field: String,
        kept: String,
        ignored: String,
    },
    /// A field was given more than one weight.
    DuplicateFieldWeight {
        profile: String,
        field: String,
        kept: i64,
        ignored: i64,
    },
    /// A constant, expression or model had no file reference and was skipped.
    EmptyFileReference { kind: &'static str, name: String },
}

impl fmt::Display for DeriveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeriveWarning::DuplicateNativeTable {
                profile,
                field,
                kept,
                ignored,
            } => write!(
                f,
                "rank profile '{}': using {} for field '{}', ignoring {}",
                profile, kept, field, ignored
            ),
            DeriveWarning::DuplicateFieldWeight {
                profile,
                field,
                kept,
                ignored,
            } => write!(
                f,
                "rank profile '{}': using weight {} for field '{}', ignoring {}",
                profile, kept, field, ignored
            ),
            DeriveWarning::EmptyFileReference { kind, name } => {
                write!(f, "skipping {} '{}': empty file reference", kind, name)
            }
        }
    }
}
