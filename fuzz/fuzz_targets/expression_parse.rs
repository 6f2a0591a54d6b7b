// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Ranking expression parsing under arbitrary text.
//!
//! The parser must reject garbage with an error, and whatever it accepts must
//! print back to text that parses to the same tree.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rankc::ExpressionNode;

fuzz_target!(|text: &str| {
    let Ok(node) = ExpressionNode::parse(text) else {
        return;
    };
    let printed = node.to_string();
    let reparsed = ExpressionNode::parse(&printed).expect("printed expression parses");
    assert_eq!(reparsed, node, "print/parse mismatch for {:?}", text);
});
