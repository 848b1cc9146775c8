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

//! # PromQL for alert rules
//!
//! A lexer, parser and serializer for the subset of PromQL used by alerting
//! expressions, plus a threshold layer that turns the common
//! `metric{filters} <comparator> <number>` shape into a structured value an
//! editor can work with, and back.
//!
//! ## Example
//!
//! The parser entry point is [`parser::parse()`], which takes a string slice of
//! PromQL and returns either an AST ([`parser::Expr`]) or a
//! [`parser::SyntaxError`].
//!
//! ``` rust
//! use alert_promql::{parser, threshold};
//!
//! let ast = parser::parse(r#"disk_usage{networkID="net1",host="a"} > 90"#).unwrap();
//!
//! match threshold::extract_threshold(&ast) {
//!     Some(mut t) => {
//!         t.value = 95.0;
//!         assert_eq!(threshold::threshold_to_promql(&t), r#"disk_usage{host="a"}>95"#);
//!     }
//!     None => println!("edit as raw text: {}", ast),
//! }
//! ```
//!
//! Every AST node renders back to PromQL through [`std::fmt::Display`]
//! (or [`parser::Expr::to_promql`]), and parsing the rendered text yields an
//! equal AST.

pub mod label;
pub mod parser;
pub mod threshold;
pub mod util;
