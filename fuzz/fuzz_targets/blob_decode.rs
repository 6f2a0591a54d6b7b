// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Property bag decoding under adversarial input.
//!
//! A blob on disk may be truncated, bit-rotted or hand-crafted. The worst
//! case must be an error, never a panic or an unbounded allocation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rankc::codec::{decode_properties, encode_properties};

fuzz_target!(|data: &[u8]| {
    if let Ok(properties) = decode_properties(data) {
        // Anything that decodes must re-encode to the same properties.
        let blob = encode_properties(&properties).expect("decoded properties re-encode");
        let again = decode_properties(&blob).expect("fresh blob decodes");
        assert_eq!(again, properties);
    }
});
