// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Ranking expressions: parse text into a tree, print a tree back as text.
//!
//! The deriver never evaluates anything. It only needs to know the shape of
//! the root (is it a single feature reference?), rewrite function references,
//! and serialize the result in one canonical form.

mod node;
mod parser;

pub use node::{BinaryOp, ExpressionNode, Reference};
pub use parser::{parse, BUILTIN_FUNCTIONS};
