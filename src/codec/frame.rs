// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Blob framing: header, brotli body, footer.
//!
//! The header is 9 bytes and tells you how big the property bag will be once
//! decompressed, so the decoder can refuse absurd sizes before allocating.
//! The footer is 8 bytes: a CRC32 over everything before it, plus the header
//! magic reversed. If the footer is wrong, the blob was truncated or
//! corrupted in transit. Don't trust the data.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ HEADER (9 bytes)                         │
//! │   magic: [u8; 4] = "FEFP"                │
//! │   version: u8 = 1                        │
//! │   raw_len: u32 LE (uncompressed bytes)   │
//! ├──────────────────────────────────────────┤
//! │ BODY (brotli)                            │
//! ├──────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 LE + "PFEF"      │
//! └──────────────────────────────────────────┘
//! ```

use std::io::{Read, Write};

use crc32fast::Hasher as Crc32Hasher;

use crate::error::CodecError;

/// Magic bytes: "FEFP" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x46, 0x45, 0x46, 0x50];

/// Footer magic: "PFEF" (reversed, marks valid blob end)
pub const FOOTER_MAGIC: [u8; 4] = [0x50, 0x46, 0x45, 0x46];

/// Current blob format version
pub const VERSION: u8 = 1;

/// Maximum uncompressed property bag size: 256 MB
pub const MAX_RAW_LEN: usize = 256 * 1024 * 1024;

/// Default brotli quality (0-11)
pub const DEFAULT_QUALITY: u32 = 9;

/// Brotli window size (log2)
const LG_WINDOW: u32 = 22;

const BUFFER_SIZE: usize = 4096;

/// Fixed-size blob header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    pub version: u8,
    pub raw_len: u32,
}

impl BlobHeader {
    pub const SIZE: usize = 9;

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.push(self.version);
        out.extend_from_slice(&self.raw_len.to_le_bytes());
    }

    pub fn read(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::SIZE {
            return Err(CodecError::Truncated { len: bytes.len() });
        }
        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(CodecError::BadMagic { found: magic });
        }
        let version = bytes[4];
        if version != VERSION {
            return Err(CodecError::UnsupportedVersion {
                expected: VERSION,
                found: version,
            });
        }
        let raw_len = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        if raw_len as usize > MAX_RAW_LEN {
            return Err(CodecError::TooLarge {
                len: raw_len as usize,
                limit: MAX_RAW_LEN,
            });
        }
        Ok(Self { version, raw_len })
    }
}

/// Blob footer: CRC32 of header + body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobFooter {
    pub crc32: u32,
}

impl BlobFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn compute_crc32(bytes: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(bytes);
        hasher.finalize()
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.crc32.to_le_bytes());
        out.extend_from_slice(&FOOTER_MAGIC);
    }

    /// Read the footer from the end of `bytes` and check it against the content.
    pub fn verify(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < BlobHeader::SIZE + Self::SIZE {
            return Err(CodecError::Truncated { len: bytes.len() });
        }
        let start = bytes.len() - Self::SIZE;
        let magic = [
            bytes[start + 4],
            bytes[start + 5],
            bytes[start + 6],
            bytes[start + 7],
        ];
        if magic != FOOTER_MAGIC {
            return Err(CodecError::BadFooter { found: magic });
        }
        let stored = u32::from_le_bytes([
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ]);
        let computed = Self::compute_crc32(&bytes[..start]);
        if stored != computed {
            return Err(CodecError::ChecksumMismatch { stored, computed });
        }
        Ok(Self { crc32: stored })
    }
}

/// Compress `raw` and wrap it in header + footer.
pub fn seal(raw: &[u8], quality: u32) -> Result<Vec<u8>, CodecError> {
    if raw.len() > MAX_RAW_LEN {
        return Err(CodecError::TooLarge {
            len: raw.len(),
            limit: MAX_RAW_LEN,
        });
    }

    let mut out = Vec::with_capacity(BlobHeader::SIZE + raw.len() / 4 + BlobFooter::SIZE);
    BlobHeader {
        version: VERSION,
        raw_len: raw.len() as u32,
    }
    .write(&mut out);

    {
        let mut encoder =
            brotli::CompressorWriter::new(&mut out, BUFFER_SIZE, quality.min(11), LG_WINDOW);
        encoder
            .write_all(raw)
            .map_err(|e| CodecError::Compress(e.to_string()))?;
        encoder
            .flush()
            .map_err(|e| CodecError::Compress(e.to_string()))?;
    }

    let crc32 = BlobFooter::compute_crc32(&out);
    BlobFooter { crc32 }.write(&mut out);
    Ok(out)
}

/// Validate framing and return the decompressed bytes.
pub fn open(blob: &[u8]) -> Result<Vec<u8>, CodecError> {
    let header = BlobHeader::read(blob)?;
    BlobFooter::verify(blob)?;

    let body = &blob[BlobHeader::SIZE..blob.len() - BlobFooter::SIZE];
    let expected = header.raw_len as usize;

    // Read one byte past the declared length so oversized streams are caught
    // without decompressing all of them.
    let mut raw = Vec::with_capacity(expected);
    brotli::Decompressor::new(body, BUFFER_SIZE)
        .take(expected as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| CodecError::Decompress(e.to_string()))?;

    if raw.len() != expected {
        return Err(CodecError::LengthMismatch {
            expected,
            actual: raw.len(),
        });
    }
    Ok(raw)
}
