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

use alert_promql::{parser, threshold};

fn main() {
    let promql = r#"disk_usage{networkID="net1",host="a"} > 90"#;

    let ast = parser::parse(promql).unwrap();
    println!("AST: {:?}", ast);

    if let Some(mut t) = threshold::extract_threshold(&ast) {
        t.value = 95.0;
        println!("edited: {}", threshold::threshold_to_promql(&t));
    }
}
