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

use thiserror::Error;

pub const MALFORMED_EXPRESSION: &str = "Malformed PromQL expression";

/// Lexer error. Tokenizing stops at the first one and no tokens are returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated quoted string at position {0}")]
    UnterminatedString(usize),
    #[error("{message} in string at position {position}")]
    UnterminatedEscape { message: String, position: usize },
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    #[error("invalid number {0:?} at position {1}")]
    InvalidNumber(String, usize),
}

/// The input does not reduce to a single PromQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// the default error, optionally followed by what was found instead.
    pub fn malformed(detail: Option<String>) -> Self {
        match detail {
            Some(detail) => Self::new(format!("{MALFORMED_EXPRESSION}: {detail}")),
            None => Self::new(MALFORMED_EXPRESSION),
        }
    }
}

impl Default for SyntaxError {
    fn default() -> Self {
        Self::malformed(None)
    }
}

impl From<LexError> for SyntaxError {
    fn from(e: LexError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<String> for SyntaxError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
