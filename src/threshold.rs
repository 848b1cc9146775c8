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

//! Threshold alert expressions: `metric{filters} <comparator> <number>`.
//!
//! [`extract_threshold`] recognizes that shape in a parsed [`Expr`] and
//! [`threshold_to_promql`] renders an edited threshold back to PromQL.
//! Anything that is not a plain threshold is left to the caller as raw text.

use std::fmt::{self, Display};

use crate::label::{Label, LabelOperator, Labels, NETWORK_ID_LABEL};
use crate::parser::{parse, BinaryComparator, BinaryOperation, Expr, InstantSelector};
use crate::util::{display_float, f64_equals, join_vector};

/// How threshold filters are rendered and read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "ser", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum ThresholdFormat {
    /// filters verbatim: `test{label1="val1"}>10`
    #[default]
    Canonical,
    /// equality filters as anchored regexes with a trailing comma:
    /// `test{label1=~"^val1$",}>10`
    AnchoredRegex,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct ThresholdExpression {
    pub metric_name: String,
    pub comparator: Option<BinaryComparator>,
    pub filters: Labels,
    pub value: f64,
}

impl ThresholdExpression {
    pub fn new(
        metric_name: impl Into<String>,
        comparator: BinaryComparator,
        filters: Labels,
        value: f64,
    ) -> Self {
        Self {
            metric_name: metric_name.into(),
            comparator: Some(comparator),
            filters,
            value,
        }
    }

    /// a threshold renders to PromQL only with a comparator and a metric name
    /// that reads back as a bare selector, so keywords such as `sum`, `by` or
    /// `nan` do not qualify.
    pub fn is_complete(&self) -> bool {
        self.comparator.is_some() && is_metric_name(&self.metric_name)
    }

    /// the equivalent AST, `None` when incomplete.
    pub fn to_expr(&self) -> Option<Expr> {
        let comparator = self.comparator.filter(|_| self.is_complete())?;
        let selector = Expr::new_instant_selector(self.metric_name.clone(), self.filters.clone());
        match Expr::new_binary_expr(
            selector,
            comparator.into(),
            false,
            None,
            Expr::new_scalar(self.value),
        ) {
            Ok(expr) => Some(expr),
            Err(e) => {
                tracing::debug!(error = %e, "threshold does not form a binary expression");
                None
            }
        }
    }
}

impl PartialEq for ThresholdExpression {
    fn eq(&self, other: &Self) -> bool {
        self.metric_name == other.metric_name
            && self.comparator == other.comparator
            && self.filters == other.filters
            && f64_equals(self.value, other.value)
    }
}

impl Display for ThresholdExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", threshold_to_promql(self))
    }
}

pub fn extract_threshold(expr: &Expr) -> Option<ThresholdExpression> {
    extract_threshold_with(expr, ThresholdFormat::default())
}

/// read a threshold out of a parsed expression, `None` for any other shape.
///
/// Filters on `networkID` are dropped from the result. With
/// [`ThresholdFormat::AnchoredRegex`], `=~"^v$"` filters with an escaped
/// literal `v` are read back as `="v"` and `=~"(?:p)"` as `=~"p"`.
pub fn extract_threshold_with(expr: &Expr, format: ThresholdFormat) -> Option<ThresholdExpression> {
    match match_threshold(expr, format) {
        Ok(t) => Some(t),
        Err(reason) => {
            tracing::debug!(expr = %expr, reason, "not a threshold expression");
            None
        }
    }
}

fn match_threshold(expr: &Expr, format: ThresholdFormat) -> Result<ThresholdExpression, &'static str> {
    let BinaryOperation {
        lhs,
        rhs,
        operator,
        return_bool,
        match_clause,
    } = match expr {
        Expr::BinaryOperation(op) => op,
        _ => return Err("not a binary operation"),
    };

    let comparator =
        BinaryComparator::try_from(*operator).map_err(|_| "operator is not a comparison")?;
    if *return_bool {
        return Err("bool modifier");
    }
    if match_clause.is_some() {
        return Err("vector matching clause");
    }

    let (name, labels) = match &**lhs {
        Expr::InstantSelector(InstantSelector {
            name,
            labels,
            offset: None,
        }) if !name.is_empty() => (name, labels),
        Expr::InstantSelector(_) => return Err("selector without metric name or with offset"),
        _ => return Err("left operand is not an instant selector"),
    };
    let value = match &**rhs {
        Expr::Scalar(s) => s.value,
        _ => return Err("right operand is not a number"),
    };

    let mut filters = labels.copy();
    filters.remove_by_name(NETWORK_ID_LABEL);
    if format == ThresholdFormat::AnchoredRegex {
        filters = filters.iter().map(unanchor).collect::<Vec<_>>().into();
    }

    Ok(ThresholdExpression {
        metric_name: name.clone(),
        comparator: Some(comparator),
        filters,
        value,
    })
}

pub fn threshold_to_promql(threshold: &ThresholdExpression) -> String {
    threshold_to_promql_with(threshold, ThresholdFormat::default())
}

/// render a threshold, or an empty string when it has no metric name or no
/// comparator.
pub fn threshold_to_promql_with(threshold: &ThresholdExpression, format: ThresholdFormat) -> String {
    if !threshold.is_complete() {
        tracing::debug!(
            metric_name = %threshold.metric_name,
            "incomplete threshold renders as empty text"
        );
        return String::new();
    }

    match format {
        ThresholdFormat::Canonical => threshold
            .to_expr()
            .map(|e| e.to_promql())
            .unwrap_or_default(),
        ThresholdFormat::AnchoredRegex => {
            let mut s = threshold.metric_name.clone();
            if !threshold.filters.is_empty() {
                let filters: Vec<Label> = threshold.filters.iter().map(anchor).collect();
                s.push_str(&format!("{{{}}}", join_vector(&filters, ",", true)));
            }
            if let Some(comparator) = threshold.comparator {
                s.push_str(comparator.as_str());
            }
            s.push_str(&display_float(threshold.value));
            s
        }
    }
}

fn is_metric_name(name: &str) -> bool {
    !name.is_empty()
        && matches!(
            parse(name),
            Ok(Expr::InstantSelector(InstantSelector { name: parsed, labels, offset: None }))
                if parsed == name && labels.is_empty()
        )
}

/// `=` filters become `=~"^literal$"` with the value regex-escaped. A regex
/// filter that would read back as one of those is wrapped in `(?:...)`,
/// which matches the same series, so every filter survives extraction.
fn anchor(label: &Label) -> Label {
    match label.operator {
        LabelOperator::Equal => Label::new(
            label.name.clone(),
            format!("^{}$", regex::escape(&label.value)),
            LabelOperator::Re,
        ),
        LabelOperator::Re if is_wrappable(&label.value) => Label::new(
            label.name.clone(),
            format!("(?:{})", label.value),
            LabelOperator::Re,
        ),
        _ => label.clone(),
    }
}

fn unanchor(label: &Label) -> Label {
    if label.operator != LabelOperator::Re {
        return label.clone();
    }
    if let Some(value) = anchored_literal(&label.value) {
        return Label::new(label.name.clone(), value, LabelOperator::Equal);
    }
    match unwrap_group(&label.value) {
        Some(inner) if is_wrappable(inner) => {
            Label::new(label.name.clone(), inner, LabelOperator::Re)
        }
        _ => label.clone(),
    }
}

/// the literal matched by `^<escaped literal>$`, if the pattern has that form.
fn anchored_literal(pattern: &str) -> Option<String> {
    let escaped = pattern.strip_prefix('^')?.strip_suffix('$')?;
    let mut literal = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => literal.push(chars.next()?),
            c => literal.push(c),
        }
    }
    (regex::escape(&literal) == escaped).then_some(literal)
}

fn unwrap_group(pattern: &str) -> Option<&str> {
    pattern.strip_prefix("(?:")?.strip_suffix(')')
}

fn is_wrappable(pattern: &str) -> bool {
    anchored_literal(pattern).is_some() || unwrap_group(pattern).map_or(false, is_wrappable)
}
