// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Property bag codec.
//!
//! A compiled rank profile is an ordered list of `(key, value)` strings. On the
//! wire it is the concatenation of `key KEY_MARKER value VALUE_MARKER` for every
//! pair, brotli-compressed and framed (see [`frame`]). Rank property bags are
//! extremely repetitive (`vespa.`, `nativeFieldMatch.`, `rankingExpression(`),
//! which is exactly what brotli is good at.
//!
//! Markers must never appear inside a key or a value. The encoder enforces this
//! rather than producing a blob that decodes into something else.

pub mod frame;

pub use frame::{BlobFooter, BlobHeader, DEFAULT_QUALITY, FOOTER_MAGIC, MAGIC, VERSION};

use crate::error::CodecError;

/// Separates a key from its value.
pub const KEY_MARKER: &str = "\r=";

/// Terminates a value.
pub const VALUE_MARKER: &str = "\r\n";

/// One `(key, value)` pair of a property bag.
pub type Property = (String, String);

/// Encode properties with the default compression quality.
pub fn encode_properties(properties: &[Property]) -> Result<Vec<u8>, CodecError> {
    encode_properties_with(properties, DEFAULT_QUALITY)
}

/// Encode properties with an explicit brotli quality (0-11).
pub fn encode_properties_with(
    properties: &[Property],
    quality: u32,
) -> Result<Vec<u8>, CodecError> {
    let raw = join_properties(properties)?;
    frame::seal(raw.as_bytes(), quality)
}

/// Decode a blob produced by [`encode_properties`].
pub fn decode_properties(blob: &[u8]) -> Result<Vec<Property>, CodecError> {
    let raw = frame::open(blob)?;
    let text = String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
    split_properties(&text)
}

/// Concatenate properties into the uncompressed text form.
pub fn join_properties(properties: &[Property]) -> Result<String, CodecError> {
    let capacity = properties
        .iter()
        .map(|(k, v)| k.len() + v.len() + KEY_MARKER.len() + VALUE_MARKER.len())
        .sum();
    let mut raw = String::with_capacity(capacity);
    for (key, value) in properties {
        check_markers(key, key)?;
        check_markers(key, value)?;
        raw.push_str(key);
        raw.push_str(KEY_MARKER);
        raw.push_str(value);
        raw.push_str(VALUE_MARKER);
    }
    Ok(raw)
}

/// Split the uncompressed text form back into properties.
pub fn split_properties(raw: &str) -> Result<Vec<Property>, CodecError> {
    raw.split_terminator(VALUE_MARKER)
        .enumerate()
        .map(|(index, chunk)| {
            // Exactly one key marker per entry.
            chunk
                .split_once(KEY_MARKER)
                .filter(|(_, v)| !v.contains(KEY_MARKER))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| CodecError::MalformedEntry {
                    index,
                    chunk: chunk.to_string(),
                })
        })
        .collect()
}

fn check_markers(key: &str, text: &str) -> Result<(), CodecError> {
    for marker in [KEY_MARKER, VALUE_MARKER] {
        if text.contains(marker) {
            return Err(CodecError::ReservedMarker {
                key: key.to_string(),
                marker,
            });
        }
    }
    Ok(())
}
