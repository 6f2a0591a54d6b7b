// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `rankc inspect`: framing, integrity and contents of one blob.

use std::fs;
use std::path::Path;

use anyhow::Context;

use rankc::codec::{self, BlobFooter, BlobHeader};
use rankc::derive::strip_part_suffix;

use super::display::*;

pub fn run_inspect(file: &Path, stripped: bool) -> anyhow::Result<()> {
    let blob = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let header = BlobHeader::read(&blob).context("Invalid blob header")?;
    let footer = BlobFooter::verify(&blob).context("Blob integrity check failed")?;
    let properties = codec::decode_properties(&blob).context("Failed to decode properties")?;

    let name = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    title(&format!("RANK PROFILE {}", name));

    section_top("FRAME");
    row(&format!(
        "  version {}   raw {}   compressed {}   saved {}",
        header.version,
        format_size(header.raw_len as usize),
        format_size(blob.len()),
        savings_colored(header.raw_len as usize, blob.len())
    ));
    row(&format!(
        "  crc32 {}  {}",
        themed(YELLOW, &[], &format!("{:08x}", footer.crc32)),
        themed(GREEN, &[], "ok")
    ));

    section_mid(&format!("PROPERTIES ({})", properties.len()));
    let key_width = 46;
    for (key, value) in &properties {
        let key = if stripped {
            strip_part_suffix(key)
        } else {
            key.as_str()
        };
        let shown_key = truncate(key, key_width);
        let pad = key_width.saturating_sub(shown_key.chars().count());
        let shown_value = truncate(value, BOX_WIDTH.saturating_sub(key_width + 5));
        row(&format!(
            "  {}{} {}",
            property_key(&shown_key),
            " ".repeat(pad),
            themed(GRAY, &[DIM], &shown_value)
        ));
    }
    section_bot();
    Ok(())
}
