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

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::parser::ValueType;

/// Function is the signature of a registered PromQL function.
///
/// `variadic` follows Prometheus: 0 means exactly `arg_types.len()`
/// arguments, n > 0 allows up to n trailing arguments to be left out of
/// the last position, and -1 allows any number of repetitions of the last
/// argument type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: &'static str,
    pub arg_types: Vec<ValueType>,
    pub variadic: i32,
    pub return_type: ValueType,
}

impl Function {
    pub fn new(
        name: &'static str,
        arg_types: Vec<ValueType>,
        variadic: i32,
        return_type: ValueType,
    ) -> Self {
        Self {
            name,
            arg_types,
            variadic,
            return_type,
        }
    }

    /// check the number of arguments of a call.
    pub fn check_args_count(&self, nargs: usize) -> Result<(), String> {
        let expected = self.arg_types.len();
        if self.variadic == 0 {
            if expected != nargs {
                return Err(format!(
                    "expected {expected} argument(s) in call to \"{}\", got {nargs}",
                    self.name
                ));
            }
            return Ok(());
        }

        let min = expected.saturating_sub(1);
        if nargs < min {
            return Err(format!(
                "expected at least {min} argument(s) in call to \"{}\", got {nargs}",
                self.name
            ));
        }
        if self.variadic > 0 {
            let max = min + self.variadic as usize;
            if nargs > max {
                return Err(format!(
                    "expected at most {max} argument(s) in call to \"{}\", got {nargs}",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

lazy_static! {
    static ref FUNCTIONS: HashMap<&'static str, Function> = {
        use ValueType::{Matrix as M, Scalar as S, String as Str, Vector as V};

        let signatures: Vec<(&'static str, Vec<ValueType>, i32, ValueType)> = vec![
            ("abs", vec![V], 0, V),
            ("absent", vec![V], 0, V),
            ("absent_over_time", vec![M], 0, V),
            ("acos", vec![V], 0, V),
            ("acosh", vec![V], 0, V),
            ("asin", vec![V], 0, V),
            ("asinh", vec![V], 0, V),
            ("atan", vec![V], 0, V),
            ("atanh", vec![V], 0, V),
            ("avg_over_time", vec![M], 0, V),
            ("ceil", vec![V], 0, V),
            ("changes", vec![M], 0, V),
            ("clamp", vec![V, S, S], 0, V),
            ("clamp_max", vec![V, S], 0, V),
            ("clamp_min", vec![V, S], 0, V),
            ("cos", vec![V], 0, V),
            ("cosh", vec![V], 0, V),
            ("count_over_time", vec![M], 0, V),
            ("days_in_month", vec![V], 1, V),
            ("day_of_month", vec![V], 1, V),
            ("day_of_week", vec![V], 1, V),
            ("day_of_year", vec![V], 1, V),
            ("deg", vec![V], 0, V),
            ("delta", vec![M], 0, V),
            ("deriv", vec![M], 0, V),
            ("exp", vec![V], 0, V),
            ("floor", vec![V], 0, V),
            ("histogram_count", vec![V], 0, V),
            ("histogram_fraction", vec![S, S, V], 0, V),
            ("histogram_quantile", vec![S, V], 0, V),
            ("histogram_sum", vec![V], 0, V),
            ("holt_winters", vec![M, S, S], 0, V),
            ("hour", vec![V], 1, V),
            ("idelta", vec![M], 0, V),
            ("increase", vec![M], 0, V),
            ("irate", vec![M], 0, V),
            ("label_join", vec![V, Str, Str, Str], -1, V),
            ("label_replace", vec![V, Str, Str, Str, Str], 0, V),
            ("last_over_time", vec![M], 0, V),
            ("ln", vec![V], 0, V),
            ("log10", vec![V], 0, V),
            ("log2", vec![V], 0, V),
            ("max_over_time", vec![M], 0, V),
            ("min_over_time", vec![M], 0, V),
            ("minute", vec![V], 1, V),
            ("month", vec![V], 1, V),
            ("pi", vec![], 0, S),
            ("predict_linear", vec![M, S], 0, V),
            ("present_over_time", vec![M], 0, V),
            ("quantile_over_time", vec![S, M], 0, V),
            ("rad", vec![V], 0, V),
            ("rate", vec![M], 0, V),
            ("resets", vec![M], 0, V),
            ("round", vec![V, S], 1, V),
            ("scalar", vec![V], 0, S),
            ("sgn", vec![V], 0, V),
            ("sin", vec![V], 0, V),
            ("sinh", vec![V], 0, V),
            ("sort", vec![V], 0, V),
            ("sort_desc", vec![V], 0, V),
            ("sqrt", vec![V], 0, V),
            ("stddev_over_time", vec![M], 0, V),
            ("stdvar_over_time", vec![M], 0, V),
            ("sum_over_time", vec![M], 0, V),
            ("tan", vec![V], 0, V),
            ("tanh", vec![V], 0, V),
            ("time", vec![], 0, S),
            ("timestamp", vec![V], 0, V),
            ("vector", vec![S], 0, V),
            ("year", vec![V], 1, V),
        ];

        signatures
            .into_iter()
            .map(|(name, arg_types, variadic, return_type)| {
                (name, Function::new(name, arg_types, variadic, return_type))
            })
            .collect()
    };
}

// get_function returns a predefined Function object for the given name.
pub fn get_function(name: &str) -> Option<&'static Function> {
    FUNCTIONS.get(name)
}
