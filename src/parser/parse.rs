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

use crate::label::{new_label, Labels};
use crate::parser::{
    tokenize, AggregationOperator, BinaryOperator, Clause, ClauseOperator, Expr, GroupClause,
    GroupOperator, SyntaxError, Token, TokenKind, TokenValue, VectorMatchClause,
};
use crate::util::Duration;

/// parse a PromQL expression into its AST.
pub fn parse(input: &str) -> Result<Expr, SyntaxError> {
    let result = tokenize(input)
        .map_err(SyntaxError::from)
        .and_then(|tokens| Parser::new(tokens).parse_all());
    if let Err(e) = &result {
        tracing::debug!(input, error = %e, "failed to parse PromQL expression");
    }
    result
}

/// precedence climbing over the token stream. `pos` always points at the
/// next unconsumed token.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse_all(mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_expr(0)?;
        match self.peek() {
            Some(tok) => Err(unexpected(tok)),
            None => Ok(expr),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(Token::kind)
    }

    fn next(&mut self) -> Result<Token, SyntaxError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or_else(unexpected_end)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        let tok = self.next()?;
        if tok.kind() != kind {
            return Err(unexpected(&tok));
        }
        Ok(tok)
    }

    fn expect_range(&mut self) -> Result<Duration, SyntaxError> {
        let tok = self.next()?;
        match tok.value {
            TokenValue::Range(d) if tok.kind() == TokenKind::Range => Ok(d),
            _ => Err(SyntaxError::malformed(Some(format!(
                "expected duration, found {tok}"
            )))),
        }
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_unary()?;

        while let Some(op) = self.peek_binary_operator() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.pos += 1;

            let return_bool = self.parse_bool_modifier();
            let match_clause = self.parse_match_clause()?;
            let next_min = if op.is_right_associative() {
                prec
            } else {
                prec + 1
            };
            let rhs = self.parse_expr(next_min)?;
            lhs = Expr::new_binary_expr(lhs, op, return_bool, match_clause, rhs)?;
        }

        Ok(lhs)
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperator> {
        let tok = self.peek()?;
        match tok.kind() {
            TokenKind::Comparator
            | TokenKind::NotEqual
            | TokenKind::Arithmetic
            | TokenKind::SetOperator => BinaryOperator::from_op(tok.val()),
            _ => None,
        }
    }

    fn parse_bool_modifier(&mut self) -> bool {
        let is_bool = self
            .peek()
            .map_or(false, |t| t.is_text(TokenKind::Identifier, "bool"));
        if is_bool {
            self.pos += 1;
        }
        is_bool
    }

    fn parse_match_clause(&mut self) -> Result<Option<VectorMatchClause>, SyntaxError> {
        if self.peek_kind() != Some(TokenKind::MatchClause) {
            return Ok(None);
        }
        let tok = self.next()?;
        let operator = ClauseOperator::from_op(tok.val()).ok_or_else(|| unexpected(&tok))?;
        let clause = Clause::new(operator, self.parse_label_names()?);

        let group = match self.peek_kind() {
            Some(TokenKind::GroupClause) => {
                let tok = self.next()?;
                let operator = GroupOperator::from_op(tok.val()).ok_or_else(|| unexpected(&tok))?;
                let label_names = if self.peek_kind() == Some(TokenKind::LeftParen) {
                    self.parse_label_names()?
                } else {
                    vec![]
                };
                Some(GroupClause {
                    operator,
                    label_names,
                })
            }
            _ => None,
        };

        Ok(Some(VectorMatchClause::new(clause, group)))
    }

    /// `(` [name (`,` name)* [`,`]] `)`
    fn parse_label_names(&mut self) -> Result<Vec<String>, SyntaxError> {
        self.expect(TokenKind::LeftParen)?;
        let mut names = vec![];
        loop {
            let tok = self.next()?;
            match tok.kind() {
                TokenKind::RightParen => return Ok(names),
                _ => names.push(label_name(&tok)?),
            }
            let sep = self.next()?;
            match sep.kind() {
                TokenKind::Comma => continue,
                TokenKind::RightParen => return Ok(names),
                _ => return Err(unexpected(&sep)),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let tok = self.next()?;
        match tok.kind() {
            TokenKind::Scalar => match tok.value {
                TokenValue::Number(n) => Ok(Expr::new_scalar(n)),
                _ => Err(unexpected(&tok)),
            },
            TokenKind::String => Ok(Expr::new_string_literal(tok.val())),
            TokenKind::LeftParen => {
                let expr = self.parse_expr(0)?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::Arithmetic if tok.val() == "-" || tok.val() == "+" => {
                match self.parse_unary()? {
                    Expr::Scalar(s) if tok.val() == "-" => Ok(Expr::new_scalar(-s.value)),
                    scalar @ Expr::Scalar(_) => Ok(scalar),
                    _ => Err(SyntaxError::new(
                        "unary expression only allowed on scalars",
                    )),
                }
            }
            TokenKind::AggregationOperator => self.parse_aggregation(&tok),
            // `bool` is a modifier keyword, never a metric name
            TokenKind::Identifier if tok.val() == "bool" => Err(unexpected(&tok)),
            TokenKind::Identifier | TokenKind::FunctionName => {
                if self.peek_kind() == Some(TokenKind::LeftParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::new_call(tok.val(), args)?)
                } else {
                    self.parse_selector(tok.val().to_string())
                }
            }
            TokenKind::LeftBrace => {
                self.pos -= 1;
                self.parse_selector(String::new())
            }
            _ => Err(unexpected(&tok)),
        }
    }

    fn parse_aggregation(&mut self, tok: &Token) -> Result<Expr, SyntaxError> {
        let operator = AggregationOperator::from_op(tok.val()).ok_or_else(|| unexpected(tok))?;

        let mut clause = self.parse_aggregation_clause()?;
        if clause.is_none() && self.peek_kind() != Some(TokenKind::LeftParen) {
            return Err(match self.peek() {
                Some(next) => unexpected(next),
                None => SyntaxError::malformed(Some(format!(
                    "aggregation {tok} without arguments"
                ))),
            });
        }

        let args = self.parse_args()?;

        if let Some(trailing) = self.parse_aggregation_clause()? {
            if clause.is_some() {
                return Err(SyntaxError::new(format!(
                    "{operator} may only have one by/without clause"
                )));
            }
            clause = Some(trailing);
        }

        Ok(Expr::new_aggregate_expr(operator, clause, args)?)
    }

    fn parse_aggregation_clause(&mut self) -> Result<Option<Clause>, SyntaxError> {
        if self.peek_kind() != Some(TokenKind::AggregationClause) {
            return Ok(None);
        }
        let tok = self.next()?;
        let operator = ClauseOperator::from_op(tok.val()).ok_or_else(|| unexpected(&tok))?;
        Ok(Some(Clause::new(operator, self.parse_label_names()?)))
    }

    /// `(` [expr (`,` expr)*] `)`
    fn parse_args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = vec![];
        if self.peek_kind() == Some(TokenKind::RightParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            let sep = self.next()?;
            match sep.kind() {
                TokenKind::Comma => continue,
                TokenKind::RightParen => return Ok(args),
                _ => return Err(unexpected(&sep)),
            }
        }
    }

    /// name [labels] [`[` range `]`] [offset duration]
    fn parse_selector(&mut self, name: String) -> Result<Expr, SyntaxError> {
        let labels = if self.peek_kind() == Some(TokenKind::LeftBrace) {
            self.parse_label_matchers()?
        } else {
            Labels::empty()
        };
        let mut expr = Expr::new_instant_selector(name, labels);

        loop {
            match self.peek() {
                Some(t) if t.kind() == TokenKind::LeftBracket => {
                    self.pos += 1;
                    let range = self.expect_range()?;
                    self.expect(TokenKind::RightBracket)?;
                    expr = Expr::new_range_selector(expr, range)?;
                }
                Some(t) if t.is_text(TokenKind::Identifier, "offset") => {
                    self.pos += 1;
                    let offset = self.expect_range()?;
                    expr = expr.offset_expr(offset)?;
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `{` [name op string (`,` name op string)* [`,`]] `}`
    fn parse_label_matchers(&mut self) -> Result<Labels, SyntaxError> {
        self.expect(TokenKind::LeftBrace)?;
        let mut labels = Labels::empty();
        loop {
            let tok = self.next()?;
            if tok.kind() == TokenKind::RightBrace {
                return Ok(labels);
            }
            let name = label_name(&tok)?;

            let op = self.next()?;
            if !matches!(op.kind(), TokenKind::LabelOperator | TokenKind::NotEqual) {
                return Err(unexpected(&op));
            }
            let value = self.expect(TokenKind::String)?;
            labels.push(new_label(op.val(), name, value.val().to_string())?);

            let sep = self.next()?;
            match sep.kind() {
                TokenKind::Comma => continue,
                TokenKind::RightBrace => return Ok(labels),
                _ => return Err(unexpected(&sep)),
            }
        }
    }
}

fn label_name(tok: &Token) -> Result<String, SyntaxError> {
    if !tok.kind().is_word() {
        return Err(unexpected(tok));
    }
    let name = tok.val();
    if name.contains(':') {
        return Err(SyntaxError::new(format!("invalid label name \"{name}\"")));
    }
    Ok(name.to_string())
}

fn unexpected(tok: &Token) -> SyntaxError {
    SyntaxError::malformed(Some(format!(
        "unexpected {tok} at position {}",
        tok.position
    )))
}

fn unexpected_end() -> SyntaxError {
    SyntaxError::malformed(Some("unexpected end of input".into()))
}
