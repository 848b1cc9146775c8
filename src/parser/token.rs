// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashSet;
use std::fmt::{self, Display};

use lazy_static::lazy_static;

use crate::util::{display_float, Duration};

lazy_static! {
    pub(crate) static ref AGGREGATION_OPERATORS: HashSet<&'static str> = HashSet::from([
        "sum",
        "min",
        "max",
        "avg",
        "group",
        "stddev",
        "stdvar",
        "count",
        "count_values",
        "bottomk",
        "topk",
        "quantile",
    ]);
    pub(crate) static ref AGGREGATION_CLAUSES: HashSet<&'static str> =
        HashSet::from(["by", "without"]);
    pub(crate) static ref MATCH_CLAUSES: HashSet<&'static str> =
        HashSet::from(["on", "ignoring"]);
    pub(crate) static ref GROUP_CLAUSES: HashSet<&'static str> =
        HashSet::from(["group_left", "group_right"]);
    pub(crate) static ref SET_OPERATORS: HashSet<&'static str> =
        HashSet::from(["and", "or", "unless"]);
}

/// The closed set of token kinds. Whitespace and comments are consumed by
/// the lexer and never become tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    /// duration literal, e.g. `5m`
    Range,
    Scalar,
    /// sum, avg, count_values, ...
    AggregationOperator,
    /// by, without
    AggregationClause,
    /// on, ignoring
    MatchClause,
    /// group_left, group_right
    GroupClause,
    /// and, or, unless
    SetOperator,
    /// ==, >, <, >=, <=
    Comparator,
    /// `!=` is both a comparator and a label operator
    NotEqual,
    /// +, -, *, /, %, ^
    Arithmetic,
    /// =, =~, !~
    LabelOperator,
    /// a registered function name
    FunctionName,
    Identifier,
    String,
}

impl TokenKind {
    /// whether a token of this kind may end an operand, in which case a
    /// following `+`/`-` is a binary operator rather than a sign.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::RightBrace
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::Range
                | TokenKind::Scalar
                | TokenKind::String
                | TokenKind::Identifier
                | TokenKind::FunctionName
        )
    }

    /// whether a word of this kind may be used as a label name inside braces.
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::FunctionName
                | TokenKind::AggregationOperator
                | TokenKind::AggregationClause
                | TokenKind::MatchClause
                | TokenKind::GroupClause
                | TokenKind::SetOperator
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Text(String),
    Number(f64),
    Range(Duration),
}

impl Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenValue::Text(s) => write!(f, "{s}"),
            TokenValue::Number(n) => write!(f, "{}", display_float(*n)),
            TokenValue::Range(d) => write!(f, "{d}"),
        }
    }
}

/// Token is a single lexeme. `position` is the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub position: usize,
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "string \"{}\"", self.value),
            _ => write!(f, "\"{}\"", self.value),
        }
    }
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, position: usize) -> Self {
        Self {
            kind,
            value,
            position,
        }
    }

    pub fn text(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self::new(kind, TokenValue::Text(text.into()), position)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// the textual value, empty for numbers and ranges.
    pub fn val(&self) -> &str {
        match &self.value {
            TokenValue::Text(s) => s,
            _ => "",
        }
    }

    pub fn is_text(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.val() == text
    }
}
