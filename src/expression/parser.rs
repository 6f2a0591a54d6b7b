// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent parser for ranking expressions.
//!
//! Grammar, loosest first:
//!
//! ```text
//! expr    := or
//! or      := and ( "||" and )*
//! and     := cmp ( "&&" cmp )*
//! cmp     := add ( ("==" | "!=" | "~=" | "<" | "<=" | ">" | ">=") add )*
//! add     := mul ( ("+" | "-") mul )*
//! mul     := pow ( ("*" | "/" | "%") pow )*
//! pow     := unary ( "^" pow )?
//! unary   := "-" unary | "!" unary | primary
//! primary := NUMBER | STRING | "(" expr ")" | if | call | reference
//! ```
//!
//! Built-in math functions become [`ExpressionNode::Function`]; every other
//! `name(...)` is a feature [`Reference`].

use super::node::{BinaryOp, ExpressionNode, Reference};
use crate::error::ExpressionError;

/// Math functions evaluated by the ranking engine itself.
pub const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs", "acos", "asin", "atan", "atan2", "bit", "ceil", "cos", "cosh", "elu", "erf", "exp",
    "floor", "fmod", "hamming", "isNan", "ldexp", "log", "log10", "max", "min", "pow", "relu",
    "sigmoid", "sin", "sinh", "sqrt", "tan", "tanh",
];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Comma,
    Dot,
}

/// Parse a full expression; trailing input is an error.
pub fn parse(text: &str) -> Result<ExpressionNode, ExpressionError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        text,
        tokens,
        pos: 0,
    };
    let node = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(node)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || c == '@'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '@'
}

const OPERATORS: &[&str] = &[
    "||", "&&", "==", "!=", "~=", "<=", ">=", "<", ">", "+", "-", "*", "/", "%", "^", "!",
];

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let err = |message: &str, offset: usize| ExpressionError {
        message: message.to_string(),
        offset,
        source_text: text.to_string(),
    };

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (offset, c) = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|(_, n)| n.is_ascii_digit()))
        {
            let start = i;
            while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                i += 1;
            }
            if i < chars.len() && (chars[i].1 == 'e' || chars[i].1 == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j].1 == '+' || chars[j].1 == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].1.is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].1.is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let lexeme: String = chars[start..i].iter().map(|(_, c)| c).collect();
            if lexeme.matches('.').count() > 1 {
                return Err(err("malformed number", offset));
            }
            tokens.push((Token::Number(lexeme), offset));
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < chars.len() && is_ident_char(chars[i].1) {
                i += 1;
            }
            let ident: String = chars[start..i].iter().map(|(_, c)| c).collect();
            tokens.push((Token::Ident(ident), offset));
            continue;
        }

        if c == '"' || c == '\'' {
            let quote = c;
            let mut value = String::new();
            i += 1;
            loop {
                let Some(&(_, ch)) = chars.get(i) else {
                    return Err(err("unterminated string", offset));
                };
                i += 1;
                match ch {
                    '\\' => {
                        let Some(&(_, escaped)) = chars.get(i) else {
                            return Err(err("unterminated string", offset));
                        };
                        i += 1;
                        value.push(match escaped {
                            'n' => '\n',
                            'r' => '\r',
                            't' => '\t',
                            other => other,
                        });
                    }
                    ch if ch == quote => break,
                    ch => value.push(ch),
                }
            }
            tokens.push((Token::Str(value), offset));
            continue;
        }

        match c {
            '(' => tokens.push((Token::LParen, offset)),
            ')' => tokens.push((Token::RParen, offset)),
            ',' => tokens.push((Token::Comma, offset)),
            '.' => tokens.push((Token::Dot, offset)),
            _ => {
                let rest = &text[offset..];
                let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
                    return Err(err(&format!("unexpected character '{}'", c), offset));
                };
                tokens.push((Token::Op(op), offset));
                i += op.chars().count();
                continue;
            }
        }
        i += 1;
    }
    Ok(tokens)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> ExpressionError {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.text.len(), |(_, offset)| *offset);
        ExpressionError {
            message: message.to_string(),
            offset,
            source_text: self.text.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), ExpressionError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    fn peek_binary(&self, allowed: &[BinaryOp]) -> Option<BinaryOp> {
        let Some(Token::Op(symbol)) = self.peek() else {
            return None;
        };
        allowed.iter().copied().find(|op| op.symbol() == *symbol)
    }

    fn expr(&mut self) -> Result<ExpressionNode, ExpressionError> {
        self.binary_level(1)
    }

    /// Left-associative binary operators at `level` and tighter.
    fn binary_level(&mut self, level: u8) -> Result<ExpressionNode, ExpressionError> {
        if level == BinaryOp::Power.precedence() {
            return self.power();
        }
        let ops: Vec<BinaryOp> = [
            BinaryOp::Or,
            BinaryOp::And,
            BinaryOp::Equal,
            BinaryOp::NotEqual,
            BinaryOp::ApproxEqual,
            BinaryOp::LessEqual,
            BinaryOp::GreaterEqual,
            BinaryOp::Less,
            BinaryOp::Greater,
            BinaryOp::Add,
            BinaryOp::Subtract,
            BinaryOp::Multiply,
            BinaryOp::Divide,
            BinaryOp::Modulo,
        ]
        .into_iter()
        .filter(|op| op.precedence() == level)
        .collect();

        let mut left = self.binary_level(level + 1)?;
        while let Some(op) = self.peek_binary(&ops) {
            self.pos += 1;
            let right = self.binary_level(level + 1)?;
            left = ExpressionNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn power(&mut self) -> Result<ExpressionNode, ExpressionError> {
        let base = self.unary()?;
        if self.peek_binary(&[BinaryOp::Power]).is_some() {
            self.pos += 1;
            let exponent = self.power()?;
            return Ok(ExpressionNode::Binary {
                op: BinaryOp::Power,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<ExpressionNode, ExpressionError> {
        match self.peek() {
            Some(Token::Op("-")) => {
                self.pos += 1;
                Ok(ExpressionNode::Negate(Box::new(self.unary()?)))
            }
            Some(Token::Op("!")) => {
                self.pos += 1;
                Ok(ExpressionNode::Not(Box::new(self.unary()?)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<ExpressionNode, ExpressionError> {
        let start = self.pos;
        match self.advance() {
            Some(Token::Number(lexeme)) => Ok(ExpressionNode::Constant(lexeme)),
            Some(Token::Str(value)) => Ok(ExpressionNode::Str(value)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(ExpressionNode::Embraced(Box::new(inner)))
            }
            Some(Token::Ident(name)) => self.identifier(name),
            _ => {
                self.pos = start;
                Err(self.error("expected an expression"))
            }
        }
    }

    fn identifier(&mut self, name: String) -> Result<ExpressionNode, ExpressionError> {
        let args = if self.eat(&Token::LParen) {
            self.arguments()?
        } else {
            Vec::new()
        };

        if name == "if" && !args.is_empty() {
            let [condition, if_true, if_false]: [ExpressionNode; 3] = args
                .try_into()
                .map_err(|_| self.error("if() takes exactly three arguments"))?;
            return Ok(ExpressionNode::If {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            });
        }

        if !args.is_empty()
            && BUILTIN_FUNCTIONS.contains(&name.as_str())
            && self.peek() != Some(&Token::Dot)
        {
            return Ok(ExpressionNode::Function { name, args });
        }

        let output = self.output()?;
        Ok(ExpressionNode::Reference(Reference { name, args, output }))
    }

    /// Comma-separated expressions up to and including `)`.
    fn arguments(&mut self) -> Result<Vec<ExpressionNode>, ExpressionError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RParen, "',' or ')'")?;
            return Ok(args);
        }
    }

    /// `.out` or `.out.more` after a reference.
    fn output(&mut self) -> Result<Option<String>, ExpressionError> {
        let mut parts = Vec::new();
        while self.eat(&Token::Dot) {
            match self.peek().cloned() {
                Some(Token::Ident(part)) => {
                    self.pos += 1;
                    parts.push(part);
                }
                _ => return Err(self.error("expected output name after '.'")),
            }
        }
        Ok(if parts.is_empty() {
            None
        } else {
            Some(parts.join("."))
        })
    }
}
