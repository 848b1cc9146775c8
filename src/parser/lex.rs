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

use lazy_static::lazy_static;
use regex::Regex;

use crate::parser::token::{
    AGGREGATION_CLAUSES, AGGREGATION_OPERATORS, GROUP_CLAUSES, MATCH_CLAUSES, SET_OPERATORS,
};
use crate::parser::{get_function, LexError, Token, TokenKind, TokenValue};
use crate::util::{parse_str_radix, unquote_string, Duration};

lazy_static! {
    static ref RANGE_RE: Regex = Regex::new(r"^[0-9]+[smhdwy]\b").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(
        r"^(?:0[xX][0-9a-fA-F]+|0[oO][0-7]+|0[bB][01]+|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)"
    )
    .unwrap();
    static ref WORD_RE: Regex = Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*").unwrap();
}

/// split the input into tokens. Whitespace and `#` comments are dropped.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(input).run()?;
    tracing::trace!(tokens = tokens.len(), "tokenized PromQL input");
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    brace_depth: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            brace_depth: 0,
            tokens: vec![],
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => self.pos += c.len_utf8(),
                '#' => self.skip_comment(),
                '{' => {
                    self.brace_depth += 1;
                    self.punct(TokenKind::LeftBrace, "{");
                }
                '}' => {
                    self.brace_depth = self.brace_depth.saturating_sub(1);
                    self.punct(TokenKind::RightBrace, "}");
                }
                '(' => self.punct(TokenKind::LeftParen, "("),
                ')' => self.punct(TokenKind::RightParen, ")"),
                '[' => self.punct(TokenKind::LeftBracket, "["),
                ']' => self.punct(TokenKind::RightBracket, "]"),
                ',' => self.punct(TokenKind::Comma, ","),
                '"' | '\'' | '`' => self.lex_string(c)?,
                '+' | '-' if self.sign_allowed() && self.number_follows() => self.lex_number()?,
                '=' | '!' | '>' | '<' | '+' | '-' | '*' | '/' | '%' | '^' => self.lex_operator(c)?,
                c if c.is_ascii_digit() || c == '.' => self.lex_number()?,
                c if c.is_ascii_alphabetic() || c == '_' || c == ':' => self.lex_word(),
                c => return Err(LexError::UnexpectedChar(c, self.pos)),
            }
        }
        Ok(self.tokens)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn push(&mut self, kind: TokenKind, value: TokenValue, len: usize) {
        self.tokens.push(Token::new(kind, value, self.pos));
        self.pos += len;
    }

    fn punct(&mut self, kind: TokenKind, text: &str) {
        self.push(kind, TokenValue::Text(text.to_string()), text.len());
    }

    fn skip_comment(&mut self) {
        match self.rest().find('\n') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.input.len(),
        }
    }

    /// a sign belongs to the number when nothing before it can end an operand.
    /// Unlike Prometheus, the folded sign binds tighter than `^`: `-1^2` is `(-1)^2`.
    fn sign_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(t) if t.is_text(TokenKind::Identifier, "bool") => true,
            Some(t) => !t.kind().ends_operand(),
        }
    }

    fn number_follows(&self) -> bool {
        let after_sign = &self.rest()[1..];
        NUMBER_RE.is_match(after_sign) || self.inf_or_nan(after_sign).is_some()
    }

    /// length of a leading Inf/NaN word, which is a number outside braces only.
    fn inf_or_nan(&self, s: &str) -> Option<usize> {
        if self.brace_depth > 0 {
            return None;
        }
        let word = WORD_RE.find(s)?.as_str();
        if word.eq_ignore_ascii_case("inf") || word.eq_ignore_ascii_case("nan") {
            Some(word.len())
        } else {
            None
        }
    }

    fn lex_operator(&mut self, c: char) -> Result<(), LexError> {
        let two = self.rest().get(..2).unwrap_or("");
        let (kind, len) = match two {
            "==" | ">=" | "<=" => (TokenKind::Comparator, 2),
            "!=" => (TokenKind::NotEqual, 2),
            "=~" | "!~" => (TokenKind::LabelOperator, 2),
            _ => match c {
                '=' => (TokenKind::LabelOperator, 1),
                '>' | '<' => (TokenKind::Comparator, 1),
                '+' | '-' | '*' | '/' | '%' | '^' => (TokenKind::Arithmetic, 1),
                _ => return Err(LexError::UnexpectedChar(c, self.pos)),
            },
        };
        let text = self.rest()[..len].to_string();
        self.push(kind, TokenValue::Text(text), len);
        Ok(())
    }

    fn lex_number(&mut self) -> Result<(), LexError> {
        let rest = self.rest();
        let sign_len = usize::from(rest.starts_with(|c: char| c == '+' || c == '-'));
        let unsigned = &rest[sign_len..];

        if sign_len == 0 {
            if let Some(m) = RANGE_RE.find(unsigned) {
                let text = m.as_str();
                let range = Duration::parse(text)
                    .map_err(|_| LexError::InvalidNumber(text.to_string(), self.pos))?;
                self.push(TokenKind::Range, TokenValue::Range(range), text.len());
                return Ok(());
            }
        }

        let len = match NUMBER_RE.find(unsigned) {
            Some(m) => m.end(),
            None => self
                .inf_or_nan(unsigned)
                .ok_or_else(|| LexError::InvalidNumber(unsigned.to_string(), self.pos))?,
        };
        let text = &rest[..sign_len + len];

        let trailing_word = rest[sign_len + len..]
            .starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_');
        if trailing_word {
            let end = rest[sign_len + len..]
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .map_or(rest.len(), |i| sign_len + len + i);
            return Err(LexError::InvalidNumber(rest[..end].to_string(), self.pos));
        }

        let value = parse_str_radix(text)
            .map_err(|_| LexError::InvalidNumber(text.to_string(), self.pos))?;
        self.push(TokenKind::Scalar, TokenValue::Number(value), text.len());
        Ok(())
    }

    fn lex_word(&mut self) {
        if let Some(len) = self.inf_or_nan(self.rest()) {
            let value = if self.rest()[..len].eq_ignore_ascii_case("inf") {
                f64::INFINITY
            } else {
                f64::NAN
            };
            self.push(TokenKind::Scalar, TokenValue::Number(value), len);
            return;
        }

        let word = WORD_RE.find(self.rest()).map_or("", |m| m.as_str());
        let kind = classify_word(word);
        let len = word.len();
        self.push(kind, TokenValue::Text(word.to_string()), len);
    }

    fn lex_string(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.pos;
        let bytes = self.rest().as_bytes();
        let mut i = 1;
        let end = loop {
            match bytes.get(i).copied() {
                None => return Err(LexError::UnterminatedString(start)),
                Some(b'\\') if quote != '`' => i += 2,
                Some(b'\n') if quote != '`' => return Err(LexError::UnterminatedString(start)),
                Some(b) if b == quote as u8 => break i + 1,
                Some(_) => i += 1,
            }
        };

        let literal = &self.rest()[..end];
        let value = unquote_string(literal).map_err(|message| LexError::UnterminatedEscape {
            message,
            position: start,
        })?;
        self.push(TokenKind::String, TokenValue::Text(value), end);
        Ok(())
    }
}

fn classify_word(word: &str) -> TokenKind {
    if AGGREGATION_OPERATORS.contains(word) {
        TokenKind::AggregationOperator
    } else if AGGREGATION_CLAUSES.contains(word) {
        TokenKind::AggregationClause
    } else if MATCH_CLAUSES.contains(word) {
        TokenKind::MatchClause
    } else if GROUP_CLAUSES.contains(word) {
        TokenKind::GroupClause
    } else if SET_OPERATORS.contains(word) {
        TokenKind::SetOperator
    } else if get_function(word).is_some() {
        TokenKind::FunctionName
    } else {
        TokenKind::Identifier
    }
}
