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

use alert_promql::label::{LabelOperator, Labels, NETWORK_ID_LABEL};
use alert_promql::parser::{parse, BinaryComparator, BinaryOperator, Expr};
use alert_promql::threshold::{
    extract_threshold, extract_threshold_with, threshold_to_promql, threshold_to_promql_with,
    ThresholdExpression, ThresholdFormat,
};

/// the editor flow: parse stored text, edit the threshold, store it again.
#[test]
fn test_edit_stored_alert() {
    let stored = r#"node_load5{networkID="tenant-1", instance=~"web-.*"} >= 4"#;
    let ast = parse(stored).unwrap();

    let mut t = extract_threshold(&ast).unwrap();
    assert_eq!(t.metric_name, "node_load5");
    assert_eq!(t.comparator, Some(BinaryComparator::Gte));
    assert!(t.filters.find(NETWORK_ID_LABEL).is_none());
    assert_eq!(t.filters.len(), 1);

    t.value = 8.0;
    t.filters = t.filters.add_equal("env", "prod");
    let edited = threshold_to_promql(&t);
    assert_eq!(edited, r#"node_load5{instance=~"web-.*",env="prod"}>=8"#);

    assert_eq!(extract_threshold(&parse(&edited).unwrap()), Some(t));
}

#[test]
fn test_filter_editing() {
    let mut t = extract_threshold(&parse(r#"up{a="1",b="2",c="3"} == 0"#).unwrap()).unwrap();
    assert!(t.filters.set_index(1, "b", "two", Some(LabelOperator::NotEqual)));
    assert!(t.filters.remove(0).is_some());
    assert!(!t.filters.set_index(5, "x", "y", None));
    assert_eq!(threshold_to_promql(&t), r#"up{b!="two",c="3"}==0"#);
}

#[test]
fn test_non_threshold_stays_text() {
    for input in [
        "vector(1)",
        "sum by (job) (up) > 1",
        "up > bool 1",
        "absent(up)",
        "up",
    ] {
        let ast = parse(input).unwrap();
        assert_eq!(extract_threshold(&ast), None, "<input> {input}");
        assert_eq!(parse(&ast.to_promql()).unwrap(), ast, "<input> {input}");
    }
}

#[test]
fn test_legacy_format_round_trip() {
    let t = ThresholdExpression::new(
        "test",
        BinaryComparator::Gtr,
        Labels::empty()
            .add_equal("label1", "val1")
            .add_equal("label2", "val2"),
        10.0,
    );
    let legacy = threshold_to_promql_with(&t, ThresholdFormat::AnchoredRegex);
    assert_eq!(legacy, r#"test{label1=~"^val1$",label2=~"^val2$",}>10"#);

    let ast = parse(&legacy).unwrap();
    assert_eq!(
        extract_threshold_with(&ast, ThresholdFormat::AnchoredRegex),
        Some(t.clone())
    );
    assert_eq!(
        threshold_to_promql(&extract_threshold_with(&ast, ThresholdFormat::AnchoredRegex).unwrap()),
        r#"test{label1="val1",label2="val2"}>10"#
    );
}

#[test]
fn test_threshold_to_expr() {
    let t = ThresholdExpression::new("up", BinaryComparator::Lss, Labels::empty(), 1.0);
    match t.to_expr() {
        Some(Expr::BinaryOperation(op)) => {
            assert_eq!(op.operator, BinaryOperator::Lss);
            assert!(!op.return_bool);
            assert!(op.match_clause.is_none());
        }
        other => panic!("unexpected expression {other:?}"),
    }
}
