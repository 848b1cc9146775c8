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

use std::fmt;

use regex::Regex;

use crate::label::Label;

/// The comparison a label filter applies to the label value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum LabelOperator {
    #[default]
    #[cfg_attr(feature = "ser", serde(rename = "="))]
    Equal,
    #[cfg_attr(feature = "ser", serde(rename = "!="))]
    NotEqual,
    #[cfg_attr(feature = "ser", serde(rename = "=~"))]
    Re,
    #[cfg_attr(feature = "ser", serde(rename = "!~"))]
    NotRe,
}

impl LabelOperator {
    pub fn from_op(op: &str) -> Option<Self> {
        match op {
            "=" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "=~" => Some(Self::Re),
            "!~" => Some(Self::NotRe),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Re => "=~",
            Self::NotRe => "!~",
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Re | Self::NotRe)
    }

    /// whether a filter with this operator and `value` accepts `s`.
    /// Regular expressions are fully anchored, as Prometheus does.
    pub fn is_match(&self, value: &str, s: &str) -> Result<bool, String> {
        match self {
            Self::Equal => Ok(value.eq(s)),
            Self::NotEqual => Ok(value.ne(s)),
            Self::Re => anchored_regex(value).map(|re| re.is_match(s)),
            Self::NotRe => anchored_regex(value).map(|re| !re.is_match(s)),
        }
    }
}

impl fmt::Display for LabelOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn anchored_regex(value: &str) -> Result<Regex, String> {
    Regex::new(&format!("^(?:{value})$")).map_err(|_| format!("illegal regex for {value}"))
}

/// build a label filter from the operator text found by the lexer,
/// rejecting regular expressions that do not compile.
pub fn new_label(op: &str, name: String, value: String) -> Result<Label, String> {
    let operator = LabelOperator::from_op(op).ok_or_else(|| format!("invalid match op {op}"))?;
    if operator.is_regex() {
        anchored_regex(&value)?;
    }
    Ok(Label {
        name,
        value,
        operator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_label() {
        assert_eq!(
            new_label("+", "".into(), "".into()),
            Err("invalid match op +".into())
        );
        assert_eq!(
            new_label("=~", "code".into(), "5..".into()),
            Ok(Label::new("code", "5..", LabelOperator::Re))
        );
        assert_eq!(
            new_label("!~", "code".into(), "(".into()),
            Err("illegal regex for (".into())
        );
        // only regex operators compile their value
        assert_eq!(
            new_label("=", "code".into(), "(".into()),
            Ok(Label::new("code", "(", LabelOperator::Equal))
        );
    }

    #[test]
    fn test_label_operator_text() {
        for op in ["=", "!=", "=~", "!~"] {
            let operator = LabelOperator::from_op(op).unwrap();
            assert_eq!(operator.to_string(), op);
        }
        assert_eq!(LabelOperator::from_op("=="), None);
        assert_eq!(LabelOperator::default(), LabelOperator::Equal);
    }

    #[test]
    fn test_is_match_eq_ne() {
        assert_eq!(LabelOperator::Equal.is_match("up", "up"), Ok(true));
        assert_eq!(LabelOperator::Equal.is_match("up", "down"), Ok(false));

        assert_eq!(LabelOperator::NotEqual.is_match("up", "foo"), Ok(true));
        assert_eq!(LabelOperator::NotEqual.is_match("up", "up"), Ok(false));
    }

    #[test]
    fn test_is_match_re() {
        let value = "api/v1/.*";
        assert_eq!(LabelOperator::Re.is_match(value, "api/v1/query"), Ok(true));
        assert_eq!(
            LabelOperator::Re.is_match(value, "api/v1/range_query"),
            Ok(true)
        );
        assert_eq!(LabelOperator::Re.is_match(value, "api/v2"), Ok(false));
        // anchored on both ends
        assert_eq!(LabelOperator::Re.is_match("v1", "api/v1"), Ok(false));
        assert_eq!(LabelOperator::NotRe.is_match("v1", "api/v1"), Ok(true));
        assert!(LabelOperator::Re.is_match("(", "x").is_err());
    }
}
