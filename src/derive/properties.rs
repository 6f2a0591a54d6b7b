// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Ordered property accumulation with `.partN` disambiguation.

use crate::codec::Property;
use crate::error::DeriveError;

/// Hard cap on properties per profile.
pub const DEFAULT_MAX_PROPERTIES: usize = 1_000_000;

/// The ordered output of one profile derivation.
///
/// Keys that may legitimately repeat (explicit rank properties, summary and
/// dump features) get a `.partN` suffix from one counter shared across the
/// whole profile, so every key in the bag is unique and the suffix records
/// emission order.
#[derive(Debug)]
pub struct PropertyList {
    profile: String,
    limit: usize,
    next_part: usize,
    entries: Vec<Property>,
}

impl PropertyList {
    pub fn new(profile: &str, limit: usize) -> Self {
        Self {
            profile: profile.to_string(),
            limit,
            next_part: 0,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), DeriveError> {
        self.entries.push((key.into(), value.into()));
        if self.entries.len() >= self.limit {
            return Err(DeriveError::TooManyProperties {
                profile: self.profile.clone(),
                count: self.entries.len(),
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Push `key.partN` with the next part number.
    pub fn push_part(&mut self, key: &str, value: impl Into<String>) -> Result<(), DeriveError> {
        let part = self.next_part;
        self.next_part += 1;
        self.push(format!("{}.part{}", key, part), value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_properties(self) -> Vec<Property> {
        self.entries
    }
}

/// Drop a trailing `.part<digits>` from a key, if present.
pub fn strip_part_suffix(key: &str) -> &str {
    if let Some(pos) = key.rfind(".part") {
        let digits = &key[pos + ".part".len()..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return &key[..pos];
        }
    }
    key
}
