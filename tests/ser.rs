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

#![cfg(feature = "ser")]

use alert_promql::parser::parse;
use alert_promql::threshold::{extract_threshold, ThresholdFormat};

macro_rules! assert_json_ser_eq {
    ($promql: literal, $json: tt) => {
        let ast = parse($promql).expect("Failed to parse");
        assert_eq!(
            serde_json::json!($json),
            serde_json::to_value(ast).expect("Failed to serialize")
        );
    };
}

#[test]
fn test_serialize_selector() {
    assert_json_ser_eq!(
        r#"prometheus_tsdb_wal_writes_failed_total{job=~"prom.*"} offset 5m"#,
    {
        "type": "instantSelector",
        "name": "prometheus_tsdb_wal_writes_failed_total",
        "labels": [
            { "name": "job", "value": "prom.*", "operator": "=~" }
        ],
        "offset": { "amount": 5, "unit": "m" }
    });

    assert_json_ser_eq!(
        "foo[1h]",
    {
        "type": "rangeSelector",
        "selector": { "name": "foo", "labels": [], "offset": null },
        "range": { "amount": 1, "unit": "h" }
    });
}

#[test]
fn test_serialize_binary() {
    assert_json_ser_eq!(
        "up == bool on(job) group_left other",
    {
        "type": "binaryOperation",
        "lhs": { "type": "instantSelector", "name": "up", "labels": [], "offset": null },
        "rhs": { "type": "instantSelector", "name": "other", "labels": [], "offset": null },
        "operator": "==",
        "return_bool": true,
        "match_clause": {
            "clause": { "operator": "on", "label_names": ["job"] },
            "group": { "operator": "group_left", "label_names": [] }
        }
    });
}

#[test]
fn test_serialize_aggregation_and_call() {
    assert_json_ser_eq!(
        r#"count_values without (instance) ("v", vector(1))"#,
    {
        "type": "aggregationOperation",
        "operator": "count_values",
        "args": [
            { "type": "stringLiteral", "value": "v" },
            {
                "type": "function",
                "name": "vector",
                "args": [{ "type": "scalar", "value": 1.0 }]
            }
        ],
        "clause": { "operator": "without", "label_names": ["instance"] }
    });
}

#[test]
fn test_serialize_threshold() {
    let ast = parse(r#"disk_usage{networkID="n",host="a"} > 90"#).unwrap();
    let threshold = extract_threshold(&ast).unwrap();
    assert_eq!(
        serde_json::json!({
            "metric_name": "disk_usage",
            "comparator": ">",
            "filters": [{ "name": "host", "value": "a", "operator": "=" }],
            "value": 90.0
        }),
        serde_json::to_value(threshold).unwrap()
    );
    assert_eq!(
        serde_json::to_value(ThresholdFormat::AnchoredRegex).unwrap(),
        serde_json::json!("anchored_regex")
    );
}
