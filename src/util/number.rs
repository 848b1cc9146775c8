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

/// parse a PromQL number literal into f64.
///
/// Accepted forms are decimal and float literals (with exponent),
/// `0x` hexadecimal, `0o` octal, `0b` binary, legacy leading-zero octal
/// and `Inf`/`NaN`, each with an optional sign. If 8 or 9 is included
/// in a legacy octal literal, it will be treated as decimal literal.
pub fn parse_str_radix(s: &str) -> Result<f64, String> {
    let st: String = s
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| !c.is_whitespace())
        .collect();

    let (negative, digits) = match st.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, st.strip_prefix('+').unwrap_or(&st)),
    };

    let err = || format!("ParseFloatError. {s} can't be parsed into f64");

    let radix = |digits: &str, radix: u32| {
        u64::from_str_radix(digits, radix)
            .map(|x| x as f64)
            .map_err(|_| err())
    };

    let v = if let Some(hex) = digits.strip_prefix("0x") {
        radix(hex, 16)?
    } else if let Some(oct) = digits.strip_prefix("0o") {
        radix(oct, 8)?
    } else if let Some(bin) = digits.strip_prefix("0b") {
        radix(bin, 2)?
    } else if digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.contains(|c| c == '8' || c == '9')
    {
        radix(&digits[1..], 8)?
    } else {
        match digits {
            "inf" => f64::INFINITY,
            "nan" => f64::NAN,
            _ if digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
                digits.parse::<f64>().map_err(|_| err())?
            }
            _ => return Err(err()),
        }
    };

    Ok(if negative { -v } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_radix() {
        assert_eq!(parse_str_radix("0x2f").unwrap(), 47_f64);
        assert_eq!(parse_str_radix("+0x2f").unwrap(), 47_f64);
        assert_eq!(parse_str_radix("- 0x2f ").unwrap(), -47_f64);
        assert_eq!(parse_str_radix("0xfaceb00c").unwrap(), 4207849484_f64);
        assert_eq!(parse_str_radix("017").unwrap(), 15_f64);
        assert_eq!(parse_str_radix("-017").unwrap(), -15_f64);
        assert_eq!(parse_str_radix("+017").unwrap(), 15_f64);
        assert_eq!(parse_str_radix("0o33653337357").unwrap(), 3735928559_f64);
        assert_eq!(parse_str_radix("0b101010").unwrap(), 42_f64);
        assert_eq!(parse_str_radix("2023.0128").unwrap(), 2023.0128_f64);
        assert_eq!(parse_str_radix("-3.14").unwrap(), -3.14_f64);
        assert_eq!(parse_str_radix("+2.718").unwrap(), 2.718_f64);
        assert_eq!(parse_str_radix("089").unwrap(), 89_f64);
        assert_eq!(parse_str_radix("+089").unwrap(), 89_f64);
        assert_eq!(parse_str_radix("-089").unwrap(), -89_f64);
        assert_eq!(parse_str_radix("0").unwrap(), 0_f64);
        assert_eq!(parse_str_radix("-0").unwrap(), 0_f64);
        assert_eq!(parse_str_radix(".5").unwrap(), 0.5_f64);
        assert_eq!(parse_str_radix("5e-3").unwrap(), 0.005_f64);
        assert_eq!(parse_str_radix("+Inf").unwrap(), f64::INFINITY);
        assert_eq!(parse_str_radix("-inf").unwrap(), f64::NEG_INFINITY);
        assert!(parse_str_radix("NaN").unwrap().is_nan());

        assert!(parse_str_radix("rust").is_err());
        assert!(parse_str_radix("0xgolang").is_err());
        assert!(parse_str_radix("0clojure").is_err());
        assert!(parse_str_radix("0b102").is_err());
        assert!(parse_str_radix("-").is_err());
    }
}
