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

mod ast;
mod error;
mod function;
mod lex;
mod parse;
pub mod token;
mod value;

pub use ast::{
    AggregationOperation, AggregationOperator, BinaryComparator, BinaryOperation, BinaryOperator,
    Clause, ClauseOperator, Expr, FunctionCall, GroupClause, GroupOperator, InstantSelector,
    RangeSelector, Scalar, StringLiteral, VectorMatchClause,
};
pub use error::{LexError, SyntaxError, MALFORMED_EXPRESSION};
pub use function::{get_function, Function};
pub use lex::tokenize;
pub use parse::parse;
pub use token::{Token, TokenKind, TokenValue};
pub use value::{Value, ValueType};
