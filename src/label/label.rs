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

use crate::label::LabelOperator;
use crate::util::{escape_string, join_vector};

/// Injected by the multi-tenant host into every stored alert expression.
/// It is never shown to, or edited by, the operator.
pub const NETWORK_ID_LABEL: &str = "networkID";

/// Label is a single label filter: a name, a value and the operator
/// comparing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct Label {
    pub name: String,
    pub value: String,
    pub operator: LabelOperator,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>, operator: LabelOperator) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            operator,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.name,
            self.operator,
            escape_string(&self.value)
        )
    }
}

/// Labels is an ordered list of label filters. Names need not be unique,
/// duplicates are kept in insertion order.
///
/// It is a plain owned value: an editor works on its own clone and never
/// shares the list with the AST it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize), serde(transparent))]
pub struct Labels {
    pub labels: Vec<Label>,
}

impl Labels {
    pub fn empty() -> Self {
        Self { labels: vec![] }
    }

    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn append(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn add_equal(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(Label::new(name, value, LabelOperator::Equal))
    }

    pub fn add_not_equal(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(Label::new(name, value, LabelOperator::NotEqual))
    }

    pub fn add_regex(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(Label::new(name, value, LabelOperator::Re))
    }

    pub fn add_not_regex(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(Label::new(name, value, LabelOperator::NotRe))
    }

    pub fn push(&mut self, label: Label) {
        self.labels.push(label);
    }

    /// remove every filter with the given name.
    pub fn remove_by_name(&mut self, name: &str) {
        self.labels.retain(|l| l.name != name);
    }

    /// an independent deep copy, safe to mutate.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// overwrite the filter at index `i`. The operator is kept when `operator`
    /// is None. Returns false when `i` is out of bounds.
    pub fn set_index(
        &mut self,
        i: usize,
        name: impl Into<String>,
        value: impl Into<String>,
        operator: Option<LabelOperator>,
    ) -> bool {
        match self.labels.get_mut(i) {
            Some(label) => {
                label.name = name.into();
                label.value = value.into();
                if let Some(op) = operator {
                    label.operator = op;
                }
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, i: usize) -> Option<Label> {
        if i < self.labels.len() {
            Some(self.labels.remove(i))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Label> {
        self.labels.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    /// find the first filter whose name equals the specified name.
    pub fn find(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }
}

impl From<Vec<Label>> for Labels {
    fn from(labels: Vec<Label>) -> Self {
        Self { labels }
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

/// the filters joined by commas, without the surrounding braces.
impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_vector(&self.labels, ",", false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Labels {
        Labels::empty()
            .add_equal("code", "500")
            .add_regex("path", "/api/.*")
            .add_equal("code", "501")
    }

    #[test]
    fn test_builders_keep_order_and_duplicates() {
        let labels = sample();
        assert_eq!(3, labels.len());
        assert_eq!(labels.get(0), Some(&Label::new("code", "500", LabelOperator::Equal)));
        assert_eq!(labels.get(1), Some(&Label::new("path", "/api/.*", LabelOperator::Re)));
        assert_eq!(labels.get(2), Some(&Label::new("code", "501", LabelOperator::Equal)));
        assert_eq!(labels.find("code").map(|l| l.value.as_str()), Some("500"));
        assert_eq!(labels.find("missing"), None);
    }

    #[test]
    fn test_remove_by_name() {
        let mut labels = sample();
        labels.remove_by_name("code");
        assert_eq!(labels, Labels::empty().add_regex("path", "/api/.*"));

        labels.remove_by_name("not-there");
        assert_eq!(1, labels.len());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = sample();
        let mut copy = original.copy();
        assert!(copy.set_index(0, "status", "200", Some(LabelOperator::NotEqual)));
        copy.remove(1);

        assert_eq!(original, sample());
        assert_eq!(
            copy,
            Labels::empty()
                .add_not_equal("status", "200")
                .add_equal("code", "501")
        );
    }

    #[test]
    fn test_set_index_and_remove() {
        let mut labels = sample();
        assert!(labels.set_index(1, "path", "/v2", None));
        assert_eq!(labels.get(1), Some(&Label::new("path", "/v2", LabelOperator::Re)));
        assert!(!labels.set_index(3, "x", "y", None));

        assert_eq!(
            labels.remove(0),
            Some(Label::new("code", "500", LabelOperator::Equal))
        );
        assert_eq!(labels.remove(5), None);
        assert_eq!(2, labels.len());

        labels.remove(0);
        labels.remove(0);
        assert!(labels.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Labels::empty().to_string(), "");
        assert_eq!(
            sample().to_string(),
            r#"code="500",path=~"/api/.*",code="501""#
        );
        assert_eq!(
            Labels::empty().add_not_regex("l", r#""esc""#).to_string(),
            r#"l!~"\"esc\"""#
        );
    }
}
