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

use std::fmt::{self, Display};

use crate::label::Labels;
use crate::parser::{get_function, Value, ValueType};
use crate::util::{display_float, escape_string, f64_equals, join_vector, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum BinaryOperator {
    #[cfg_attr(feature = "ser", serde(rename = "=="))]
    Eql,
    #[cfg_attr(feature = "ser", serde(rename = "!="))]
    Neq,
    #[cfg_attr(feature = "ser", serde(rename = ">"))]
    Gtr,
    #[cfg_attr(feature = "ser", serde(rename = "<"))]
    Lss,
    #[cfg_attr(feature = "ser", serde(rename = ">="))]
    Gte,
    #[cfg_attr(feature = "ser", serde(rename = "<="))]
    Lte,
    #[cfg_attr(feature = "ser", serde(rename = "+"))]
    Add,
    #[cfg_attr(feature = "ser", serde(rename = "-"))]
    Sub,
    #[cfg_attr(feature = "ser", serde(rename = "*"))]
    Mul,
    #[cfg_attr(feature = "ser", serde(rename = "/"))]
    Div,
    #[cfg_attr(feature = "ser", serde(rename = "%"))]
    Mod,
    #[cfg_attr(feature = "ser", serde(rename = "^"))]
    Pow,
    #[cfg_attr(feature = "ser", serde(rename = "and"))]
    And,
    #[cfg_attr(feature = "ser", serde(rename = "or"))]
    Or,
    #[cfg_attr(feature = "ser", serde(rename = "unless"))]
    Unless,
}

impl BinaryOperator {
    pub fn from_op(op: &str) -> Option<Self> {
        let op = match op {
            "==" => Self::Eql,
            "!=" => Self::Neq,
            ">" => Self::Gtr,
            "<" => Self::Lss,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "^" => Self::Pow,
            "and" => Self::And,
            "or" => Self::Or,
            "unless" => Self::Unless,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::Gtr => ">",
            Self::Lss => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
            Self::And => "and",
            Self::Or => "or",
            Self::Unless => "unless",
        }
    }

    /// binding power, higher binds tighter:
    /// `or` < `and unless` < comparisons < `+ -` < `* / %` < `^`
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And | Self::Unless => 2,
            Self::Eql | Self::Neq | Self::Gtr | Self::Lss | Self::Gte | Self::Lte => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Mod => 5,
            Self::Pow => 6,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, Self::Pow)
    }

    pub fn is_comparison(&self) -> bool {
        BinaryComparator::try_from(*self).is_ok()
    }

    pub fn is_set_operator(&self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Unless)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The comparison subset of [`BinaryOperator`], the only operators a
/// threshold expression may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum BinaryComparator {
    #[cfg_attr(feature = "ser", serde(rename = "=="))]
    Eql,
    #[cfg_attr(feature = "ser", serde(rename = "!="))]
    Neq,
    #[cfg_attr(feature = "ser", serde(rename = ">"))]
    Gtr,
    #[cfg_attr(feature = "ser", serde(rename = "<"))]
    Lss,
    #[cfg_attr(feature = "ser", serde(rename = ">="))]
    Gte,
    #[cfg_attr(feature = "ser", serde(rename = "<="))]
    Lte,
}

impl BinaryComparator {
    pub fn from_op(op: &str) -> Option<Self> {
        BinaryOperator::from_op(op).and_then(|op| Self::try_from(op).ok())
    }

    pub fn as_str(&self) -> &'static str {
        BinaryOperator::from(*self).as_str()
    }
}

impl From<BinaryComparator> for BinaryOperator {
    fn from(c: BinaryComparator) -> Self {
        match c {
            BinaryComparator::Eql => Self::Eql,
            BinaryComparator::Neq => Self::Neq,
            BinaryComparator::Gtr => Self::Gtr,
            BinaryComparator::Lss => Self::Lss,
            BinaryComparator::Gte => Self::Gte,
            BinaryComparator::Lte => Self::Lte,
        }
    }
}

impl TryFrom<BinaryOperator> for BinaryComparator {
    type Error = String;

    fn try_from(op: BinaryOperator) -> Result<Self, Self::Error> {
        match op {
            BinaryOperator::Eql => Ok(Self::Eql),
            BinaryOperator::Neq => Ok(Self::Neq),
            BinaryOperator::Gtr => Ok(Self::Gtr),
            BinaryOperator::Lss => Ok(Self::Lss),
            BinaryOperator::Gte => Ok(Self::Gte),
            BinaryOperator::Lte => Ok(Self::Lte),
            _ => Err(format!("{op} is not a comparison operator")),
        }
    }
}

impl Display for BinaryComparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum AggregationOperator {
    Sum,
    Min,
    Max,
    Avg,
    Group,
    Stddev,
    Stdvar,
    Count,
    CountValues,
    Bottomk,
    Topk,
    Quantile,
}

impl AggregationOperator {
    pub fn from_op(op: &str) -> Option<Self> {
        let op = match op {
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "avg" => Self::Avg,
            "group" => Self::Group,
            "stddev" => Self::Stddev,
            "stdvar" => Self::Stdvar,
            "count" => Self::Count,
            "count_values" => Self::CountValues,
            "bottomk" => Self::Bottomk,
            "topk" => Self::Topk,
            "quantile" => Self::Quantile,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::Group => "group",
            Self::Stddev => "stddev",
            Self::Stdvar => "stdvar",
            Self::Count => "count",
            Self::CountValues => "count_values",
            Self::Bottomk => "bottomk",
            Self::Topk => "topk",
            Self::Quantile => "quantile",
        }
    }

    /// count_values, quantile, topk and bottomk take a leading parameter.
    pub fn has_param(&self) -> bool {
        matches!(
            self,
            Self::CountValues | Self::Quantile | Self::Topk | Self::Bottomk
        )
    }
}

impl Display for AggregationOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum ClauseOperator {
    By,
    Without,
    On,
    Ignoring,
}

impl ClauseOperator {
    pub fn from_op(op: &str) -> Option<Self> {
        match op {
            "by" => Some(Self::By),
            "without" => Some(Self::Without),
            "on" => Some(Self::On),
            "ignoring" => Some(Self::Ignoring),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::By => "by",
            Self::Without => "without",
            Self::On => "on",
            Self::Ignoring => "ignoring",
        }
    }

    pub fn is_aggregation_clause(&self) -> bool {
        matches!(self, Self::By | Self::Without)
    }
}

/// by/without (...) on aggregations, on/ignoring (...) on binary operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct Clause {
    pub operator: ClauseOperator,
    pub label_names: Vec<String>,
}

impl Clause {
    pub fn new(operator: ClauseOperator, label_names: Vec<String>) -> Self {
        Self {
            operator,
            label_names,
        }
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let labels = join_vector(&self.label_names, ", ", false);
        if self.operator.is_aggregation_clause() {
            write!(f, "{} ({labels})", self.operator.as_str())
        } else {
            write!(f, "{}({labels})", self.operator.as_str())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum GroupOperator {
    GroupLeft,
    GroupRight,
}

impl GroupOperator {
    pub fn from_op(op: &str) -> Option<Self> {
        match op {
            "group_left" => Some(Self::GroupLeft),
            "group_right" => Some(Self::GroupRight),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupLeft => "group_left",
            Self::GroupRight => "group_right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct GroupClause {
    pub operator: GroupOperator,
    pub label_names: Vec<String>,
}

impl Display for GroupClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.operator.as_str())?;
        if !self.label_names.is_empty() {
            write!(f, "({})", join_vector(&self.label_names, ", ", false))?;
        }
        Ok(())
    }
}

// VectorMatchClause describes how elements from two vectors in a binary
// operation are supposed to be matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct VectorMatchClause {
    pub clause: Clause,
    pub group: Option<GroupClause>,
}

impl VectorMatchClause {
    pub fn new(clause: Clause, group: Option<GroupClause>) -> Self {
        Self { clause, group }
    }
}

impl Display for VectorMatchClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.clause)?;
        if let Some(group) = &self.group {
            write!(f, " {group}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct InstantSelector {
    /// empty for a bare `{...}` selector
    pub name: String,
    pub labels: Labels,
    pub offset: Option<Duration>,
}

impl InstantSelector {
    pub fn new(name: impl Into<String>, labels: Labels) -> Self {
        Self {
            name: name.into(),
            labels,
            offset: None,
        }
    }

    fn fmt_without_offset(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.name.is_empty() || !self.labels.is_empty() {
            write!(f, "{{{}}}", self.labels)?;
        }
        Ok(())
    }
}

impl Display for InstantSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_without_offset(f)?;
        if let Some(offset) = &self.offset {
            write!(f, " offset {offset}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct RangeSelector {
    pub selector: InstantSelector,
    pub range: Duration,
}

/// offset is written after the range: `foo[5m] offset 1h`
impl Display for RangeSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.selector.fmt_without_offset(f)?;
        write!(f, "[{}]", self.range)?;
        if let Some(offset) = &self.selector.offset {
            write!(f, " offset {offset}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct BinaryOperation {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub operator: BinaryOperator,
    /// If a comparison operator, return 0/1 rather than filtering.
    pub return_bool: bool,
    /// The matching behavior for the operation if both operands are vectors.
    pub match_clause: Option<VectorMatchClause>,
}

impl BinaryOperation {
    fn fmt_operand(&self, f: &mut fmt::Formatter, operand: &Expr, is_rhs: bool) -> fmt::Result {
        let needs_paren = match operand {
            Expr::BinaryOperation(child) => {
                let (child_prec, prec) = (child.operator.precedence(), self.operator.precedence());
                child_prec < prec
                    || (child_prec == prec && is_rhs != self.operator.is_right_associative())
            }
            _ => false,
        };
        if needs_paren {
            write!(f, "({operand})")
        } else {
            write!(f, "{operand}")
        }
    }
}

/// Symbolic operators without modifiers are written compactly (`up==0`),
/// set operators, `bool` and vector matching are written with spaces.
impl Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_operand(f, &self.lhs, false)?;
        let compact =
            !self.return_bool && self.match_clause.is_none() && !self.operator.is_set_operator();
        if compact {
            write!(f, "{}", self.operator)?;
        } else {
            write!(f, " {}", self.operator)?;
            if self.return_bool {
                write!(f, " bool")?;
            }
            if let Some(mc) = &self.match_clause {
                write!(f, " {mc}")?;
            }
            write!(f, " ")?;
        }
        self.fmt_operand(f, &self.rhs, true)
    }
}

/// <aggr-op> [without|by (<label list>)] ([parameter,] <vector expression>)
/// or
/// <aggr-op>([parameter,] <vector expression>) [without|by (<label list>)]
///
/// both forms produce the same node, which always renders in the first form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct AggregationOperation {
    pub operator: AggregationOperator,
    pub args: Vec<Expr>,
    pub clause: Option<Clause>,
}

impl Display for AggregationOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.operator)?;
        if let Some(clause) = &self.clause {
            write!(f, " {clause} ")?;
        }
        write!(f, "({})", join_vector(&self.args, ", ", false))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
}

impl Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, join_vector(&self.args, ", ", false))
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct Scalar {
    pub value: f64,
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        f64_equals(self.value, other.value)
    }
}

impl Eq for Scalar {}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", display_float(self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct StringLiteral {
    pub value: String,
}

impl Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", escape_string(&self.value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "ser",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "camelCase")
)]
pub enum Expr {
    /// A metric name with optional label filters and offset.
    InstantSelector(InstantSelector),

    /// An instant selector with a trailing `[<range>]`.
    RangeSelector(RangeSelector),

    /// Comparison, arithmetic and set operations between two expressions.
    BinaryOperation(BinaryOperation),

    /// An aggregation such as `sum by (job) (...)`.
    AggregationOperation(AggregationOperation),

    /// A call of a registered function.
    Function(FunctionCall),

    Scalar(Scalar),

    StringLiteral(StringLiteral),
}

impl Expr {
    pub fn new_instant_selector(name: impl Into<String>, labels: Labels) -> Self {
        Self::InstantSelector(InstantSelector::new(name, labels))
    }

    pub fn new_scalar(value: f64) -> Self {
        Self::Scalar(Scalar { value })
    }

    pub fn new_string_literal(value: impl Into<String>) -> Self {
        Self::StringLiteral(StringLiteral {
            value: value.into(),
        })
    }

    pub fn new_range_selector(expr: Expr, range: Duration) -> Result<Self, String> {
        if range.amount == 0 {
            return Err("range duration must be greater than 0".into());
        }
        match expr {
            Expr::InstantSelector(InstantSelector {
                offset: Some(_), ..
            }) => Err("no offset modifiers allowed before range".into()),
            Expr::InstantSelector(selector) => {
                Ok(Expr::RangeSelector(RangeSelector { selector, range }))
            }
            _ => Err("ranges only allowed for vector selectors".into()),
        }
    }

    /// set offset field for specified Expr, but CAN ONLY be set once.
    pub fn offset_expr(self, offset: Duration) -> Result<Self, String> {
        let already_set_err = Err("offset may not be set multiple times".into());
        match self {
            Expr::InstantSelector(mut vs) => match vs.offset {
                None => {
                    vs.offset = Some(offset);
                    Ok(Expr::InstantSelector(vs))
                }
                Some(_) => already_set_err,
            },
            Expr::RangeSelector(mut rs) => match rs.selector.offset {
                None => {
                    rs.selector.offset = Some(offset);
                    Ok(Expr::RangeSelector(rs))
                }
                Some(_) => already_set_err,
            },
            _ => Err(
                "offset modifier must be preceded by an instant vector selector or range vector selector"
                    .into(),
            ),
        }
    }

    pub fn new_call(name: &str, args: Vec<Expr>) -> Result<Expr, String> {
        let func = get_function(name).ok_or_else(|| format!("unknown function: {name}"))?;
        func.check_args_count(args.len())?;
        Ok(Expr::Function(FunctionCall {
            name: func.name.to_string(),
            args,
        }))
    }

    pub fn new_binary_expr(
        lhs: Expr,
        operator: BinaryOperator,
        return_bool: bool,
        match_clause: Option<VectorMatchClause>,
        rhs: Expr,
    ) -> Result<Expr, String> {
        let (lt, rt) = (lhs.value_type(), rhs.value_type());

        if return_bool && !operator.is_comparison() {
            return Err("bool modifier can only be used on comparison operators".into());
        }

        let operand_ok = |t: ValueType| matches!(t, ValueType::Scalar | ValueType::Vector);
        if !operand_ok(lt) || !operand_ok(rt) {
            return Err("binary expression must contain only scalar and instant vector types".into());
        }

        if operator.is_set_operator() && (lt == ValueType::Scalar || rt == ValueType::Scalar) {
            return Err(format!(
                "set operator \"{operator}\" not allowed in binary scalar expression"
            ));
        }

        if let Some(mc) = &match_clause {
            if lt != ValueType::Vector || rt != ValueType::Vector {
                return Err("vector matching only allowed between instant vectors".into());
            }
            if operator.is_set_operator() && mc.group.is_some() {
                return Err(format!("no grouping allowed for \"{operator}\" operation"));
            }
        }

        Ok(Expr::BinaryOperation(BinaryOperation {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            operator,
            return_bool,
            match_clause,
        }))
    }

    pub fn new_aggregate_expr(
        operator: AggregationOperator,
        clause: Option<Clause>,
        args: Vec<Expr>,
    ) -> Result<Expr, String> {
        if args.is_empty() {
            return Err("no arguments for aggregate expression provided".into());
        }

        let desired_args_count = if operator.has_param() { 2 } else { 1 };
        if args.len() != desired_args_count {
            return Err(format!(
                "wrong number of arguments for aggregate expression provided, expected {}, got {}",
                desired_args_count,
                args.len()
            ));
        }

        Ok(Expr::AggregationOperation(AggregationOperation {
            operator,
            args,
            clause,
        }))
    }

    /// render the expression as canonical PromQL text.
    pub fn to_promql(&self) -> String {
        self.to_string()
    }
}

impl Value for Expr {
    fn value_type(&self) -> ValueType {
        match self {
            Expr::InstantSelector(_) => ValueType::Vector,
            Expr::RangeSelector(_) => ValueType::Matrix,
            Expr::BinaryOperation(b) => {
                if b.lhs.value_type() == ValueType::Scalar
                    && b.rhs.value_type() == ValueType::Scalar
                {
                    ValueType::Scalar
                } else {
                    ValueType::Vector
                }
            }
            Expr::AggregationOperation(_) => ValueType::Vector,
            Expr::Function(call) => get_function(&call.name)
                .map(|f| f.return_type)
                .unwrap_or(ValueType::Vector),
            Expr::Scalar(_) => ValueType::Scalar,
            Expr::StringLiteral(_) => ValueType::String,
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::InstantSelector(e) => write!(f, "{e}"),
            Expr::RangeSelector(e) => write!(f, "{e}"),
            Expr::BinaryOperation(e) => write!(f, "{e}"),
            Expr::AggregationOperation(e) => write!(f, "{e}"),
            Expr::Function(e) => write!(f, "{e}"),
            Expr::Scalar(e) => write!(f, "{e}"),
            Expr::StringLiteral(e) => write!(f, "{e}"),
        }
    }
}

impl From<f64> for Expr {
    fn from(val: f64) -> Self {
        Expr::new_scalar(val)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::new_string_literal(s)
    }
}

impl From<InstantSelector> for Expr {
    fn from(vs: InstantSelector) -> Self {
        Expr::InstantSelector(vs)
    }
}
