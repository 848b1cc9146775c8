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

pub mod duration;
pub mod float;
pub mod number;
pub mod string;

pub use duration::{display_for_duration, parse_for_duration, Duration, DurationUnit};
pub use float::{display_float, f64_equals};
pub use number::parse_str_radix;
pub use string::{escape_string, unquote_string};

use std::fmt::Display;

/// join the displayed items with the separator, optionally keeping a
/// trailing separator after the last item.
pub(crate) fn join_vector<T: Display>(v: &[T], sep: &str, trailing: bool) -> String {
    let mut s = v
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<String>>()
        .join(sep);
    if trailing && !v.is_empty() {
        s.push_str(sep);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_vector() {
        assert_eq!(join_vector(&["a", "b"], ",", false), "a,b");
        assert_eq!(join_vector(&["a", "b"], ",", true), "a,b,");
        assert_eq!(join_vector::<&str>(&[], ",", true), "");
    }
}
