// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Function inlining.
//!
//! Zero-argument functions become their own scripts
//! (`rankingExpression(name).rankingScript`) and every reference to one turns
//! into `rankingExpression(name)`. Functions with parameters have no script
//! of their own: each call is replaced by the body with arguments
//! substituted.
//!
//! Arguments of ordinary features (`attribute(price)`) are names, not
//! expressions, so nothing inside them is rewritten.

use indexmap::IndexMap;

use crate::error::DeriveError;
use crate::expression::{ExpressionNode, Reference};
use crate::model::{FunctionDef, RankProfile};

pub struct FunctionInliner<'a> {
    profile: &'a str,
    functions: IndexMap<&'a str, &'a FunctionDef>,
}

impl<'a> FunctionInliner<'a> {
    pub fn new(profile: &'a RankProfile) -> Self {
        Self {
            profile: &profile.name,
            functions: profile
                .functions
                .iter()
                .map(|f| (f.name.as_str(), f))
                .collect(),
        }
    }

    fn is_script_function(&self, name: &str) -> bool {
        self.functions
            .get(name)
            .is_some_and(|f| f.params.is_empty())
    }

    /// `(name, serialized body)` for every zero-argument function, in
    /// declaration order.
    pub fn scripts(&self) -> Result<Vec<(String, String)>, DeriveError> {
        self.functions
            .values()
            .filter(|f| f.params.is_empty())
            .map(|f| {
                let body = self.rewrite(f.body.clone())?;
                Ok((f.name.clone(), body.to_string()))
            })
            .collect()
    }

    /// Rewrite function references in an expression.
    pub fn rewrite(&self, expr: ExpressionNode) -> Result<ExpressionNode, DeriveError> {
        self.rewrite_with(expr, &mut Vec::new())
    }

    /// Rewrite a feature name (summary or rank feature). Anything that is not
    /// a reference to a zero-argument function comes back unchanged.
    pub fn rewrite_feature(&self, feature: &str) -> String {
        match ExpressionNode::parse(feature) {
            Ok(ExpressionNode::Reference(r))
                if r.is_bare_name() && self.is_script_function(&r.name) =>
            {
                Reference::ranking_expression(&r.name).to_string()
            }
            _ => feature.to_string(),
        }
    }

    fn rewrite_with(
        &self,
        node: ExpressionNode,
        expanding: &mut Vec<String>,
    ) -> Result<ExpressionNode, DeriveError> {
        let ExpressionNode::Reference(reference) = node else {
            return node.try_map_children(|child| self.rewrite_with(child, expanding));
        };

        let Some(function) = self.functions.get(reference.name.as_str()) else {
            return Ok(ExpressionNode::Reference(reference));
        };
        if reference.output.is_some() {
            return Ok(ExpressionNode::Reference(reference));
        }

        if function.params.is_empty() {
            if !reference.args.is_empty() {
                return Err(self.arity_error(function, reference.args.len()));
            }
            return Ok(ExpressionNode::Reference(Reference::ranking_expression(
                &function.name,
            )));
        }

        if reference.args.len() != function.params.len() {
            return Err(self.arity_error(function, reference.args.len()));
        }
        if expanding.iter().any(|name| *name == function.name) {
            return Err(DeriveError::RecursiveFunction {
                profile: self.profile.to_string(),
                function: function.name.clone(),
            });
        }

        let args = reference
            .args
            .into_iter()
            .map(|arg| self.rewrite_with(arg, expanding))
            .collect::<Result<Vec<_>, _>>()?;

        expanding.push(function.name.clone());
        let body = function.body.clone().substitute(&function.params, &args);
        let expanded = self.rewrite_with(body, expanding)?;
        expanding.pop();

        Ok(expanded.embraced_if_compound())
    }

    fn arity_error(&self, function: &FunctionDef, actual: usize) -> DeriveError {
        DeriveError::FunctionArity {
            profile: self.profile.to_string(),
            function: function.name.clone(),
            expected: function.params.len(),
            actual,
        }
    }
}
