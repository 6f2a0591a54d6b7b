// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Expression tree and its canonical text form.
//!
//! Serialization is what ends up in `rankingExpression(..).rankingScript`, so it
//! must be stable: the same tree always prints the same bytes. Parentheses the
//! author wrote are kept as [`ExpressionNode::Embraced`] so that printing never
//! has to guess about precedence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ExpressionError;

/// Binary operators, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Equal,
    NotEqual,
    ApproxEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::ApproxEqual => "~=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "^",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::ApproxEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => 3,
            BinaryOp::Add | BinaryOp::Subtract => 4,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 5,
            BinaryOp::Power => 6,
        }
    }
}

/// A feature reference: `name(arg, ...).output`.
///
/// Bare names (`nativeRank`), features with arguments (`attribute(price)`) and
/// features with an output (`fieldMatch(title).completeness`) are all
/// references. Calls to user functions look exactly the same until the
/// deriver decides otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub name: String,
    pub args: Vec<ExpressionNode>,
    pub output: Option<String>,
}

impl Reference {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            output: None,
        }
    }

    /// `rankingExpression(<name>)`
    pub fn ranking_expression(name: &str) -> Self {
        Self {
            name: "rankingExpression".to_string(),
            args: vec![ExpressionNode::Reference(Reference::simple(name))],
            output: None,
        }
    }

    /// True for a plain identifier with no arguments and no output.
    pub fn is_bare_name(&self) -> bool {
        self.args.is_empty() && self.output.is_none()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            write_args(f, &self.args)?;
            f.write_str(")")?;
        }
        if let Some(ref output) = self.output {
            write!(f, ".{}", output)?;
        }
        Ok(())
    }
}

/// A node of a ranking expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExpressionNode {
    /// Numeric literal, kept as written.
    Constant(String),
    /// String literal, unescaped content.
    Str(String),
    Reference(Reference),
    /// Built-in math function such as `max(a,b)`.
    Function {
        name: String,
        args: Vec<ExpressionNode>,
    },
    If {
        condition: Box<ExpressionNode>,
        if_true: Box<ExpressionNode>,
        if_false: Box<ExpressionNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExpressionNode>,
        right: Box<ExpressionNode>,
    },
    Negate(Box<ExpressionNode>),
    Not(Box<ExpressionNode>),
    /// Explicit parentheses.
    Embraced(Box<ExpressionNode>),
}

impl ExpressionNode {
    pub fn parse(text: &str) -> Result<Self, ExpressionError> {
        super::parser::parse(text)
    }

    /// The reference at the root, if the whole expression is a single reference.
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            ExpressionNode::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Wrap in parentheses unless the node prints as a single term.
    pub fn embraced_if_compound(self) -> Self {
        match self {
            ExpressionNode::Binary { .. } => ExpressionNode::Embraced(Box::new(self)),
            other => other,
        }
    }

    /// Rebuild this node with every direct child replaced by `f(child)`.
    ///
    /// Arguments of a [`Reference`] are children too; callers that treat
    /// feature arguments as opaque names must match references themselves
    /// before recursing.
    pub fn try_map_children<E>(
        self,
        mut f: impl FnMut(ExpressionNode) -> Result<ExpressionNode, E>,
    ) -> Result<ExpressionNode, E> {
        let node = match self {
            ExpressionNode::Constant(_) | ExpressionNode::Str(_) => self,
            ExpressionNode::Reference(r) => ExpressionNode::Reference(Reference {
                name: r.name,
                args: r.args.into_iter().map(&mut f).collect::<Result<_, _>>()?,
                output: r.output,
            }),
            ExpressionNode::Function { name, args } => ExpressionNode::Function {
                name,
                args: args.into_iter().map(&mut f).collect::<Result<_, _>>()?,
            },
            ExpressionNode::If {
                condition,
                if_true,
                if_false,
            } => ExpressionNode::If {
                condition: Box::new(f(*condition)?),
                if_true: Box::new(f(*if_true)?),
                if_false: Box::new(f(*if_false)?),
            },
            ExpressionNode::Binary { op, left, right } => ExpressionNode::Binary {
                op,
                left: Box::new(f(*left)?),
                right: Box::new(f(*right)?),
            },
            ExpressionNode::Negate(inner) => ExpressionNode::Negate(Box::new(f(*inner)?)),
            ExpressionNode::Not(inner) => ExpressionNode::Not(Box::new(f(*inner)?)),
            ExpressionNode::Embraced(inner) => ExpressionNode::Embraced(Box::new(f(*inner)?)),
        };
        Ok(node)
    }

    /// Replace bare references to `params[i]` with `args[i]`, everywhere.
    pub fn substitute(self, params: &[String], args: &[ExpressionNode]) -> ExpressionNode {
        if let ExpressionNode::Reference(ref r) = self {
            if r.is_bare_name() {
                if let Some(arg) = params
                    .iter()
                    .position(|p| *p == r.name)
                    .and_then(|i| args.get(i))
                {
                    return arg.clone().embraced_if_compound();
                }
            }
        }
        let mapped: Result<ExpressionNode, std::convert::Infallible> =
            self.try_map_children(|child| Ok(child.substitute(params, args)));
        match mapped {
            Ok(node) => node,
            Err(never) => match never {},
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[ExpressionNode]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionNode::Constant(lexeme) => f.write_str(lexeme),
            ExpressionNode::Str(s) => write_escaped(f, s),
            ExpressionNode::Reference(r) => write!(f, "{}", r),
            ExpressionNode::Function { name, args } => {
                write!(f, "{}(", name)?;
                write_args(f, args)?;
                f.write_str(")")
            }
            ExpressionNode::If {
                condition,
                if_true,
                if_false,
            } => write!(f, "if ({}, {}, {})", condition, if_true, if_false),
            ExpressionNode::Binary { op, left, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            ExpressionNode::Negate(inner) => write!(f, "-{}", inner),
            ExpressionNode::Not(inner) => write!(f, "!{}", inner),
            ExpressionNode::Embraced(inner) => write!(f, "({})", inner),
        }
    }
}

impl TryFrom<String> for ExpressionNode {
    type Error = ExpressionError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        ExpressionNode::parse(&text)
    }
}

impl From<ExpressionNode> for String {
    fn from(node: ExpressionNode) -> Self {
        node.to_string()
    }
}
