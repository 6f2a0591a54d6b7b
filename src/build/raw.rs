// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Compiled, encoded rank profile.

use crate::codec::{self, Property};
use crate::derive::{strip_part_suffix, DerivedProfile};
use crate::error::{CodecError, DeriveError, DeriveWarning};

/// A derived profile sealed into a property bag blob. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRankProfile {
    name: String,
    blob: Vec<u8>,
    property_count: usize,
    warnings: Vec<DeriveWarning>,
}

impl RawRankProfile {
    /// Encode a derived profile.
    pub fn encode(derived: DerivedProfile, quality: u32) -> Result<Self, DeriveError> {
        let blob = codec::encode_properties_with(&derived.properties, quality).map_err(
            |source| DeriveError::Codec {
                profile: derived.name.clone(),
                source,
            },
        )?;
        Ok(Self {
            name: derived.name,
            property_count: derived.properties.len(),
            blob,
            warnings: derived.warnings,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn property_count(&self) -> usize {
        self.property_count
    }

    pub fn warnings(&self) -> &[DeriveWarning] {
        &self.warnings
    }

    /// The properties as derived, `.partN` suffixes included.
    pub fn decode(&self) -> Result<Vec<Property>, CodecError> {
        codec::decode_properties(&self.blob)
    }

    /// The properties as the engine receives them: suffixes stripped.
    pub fn fef_properties(&self) -> Result<Vec<Property>, CodecError> {
        Ok(self
            .decode()?
            .into_iter()
            .map(|(key, value)| (strip_part_suffix(&key).to_string(), value))
            .collect())
    }
}
