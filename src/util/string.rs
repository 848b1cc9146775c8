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

//! Utilities for quoting and unquoting PromQL strings.

const INVALID_SYNTAX: &str = "invalid syntax";
const UNTERMINATED_ESCAPE: &str = "unterminated escape sequence";

/// unquote a complete quoted string literal, including its quotes.
///
/// Double- and single-quoted strings decode escape sequences, back-tick
/// strings are raw. A bad escape yields an error whose message contains
/// "unterminated escape".
pub fn unquote_string(s: &str) -> Result<String, String> {
    let n = s.len();
    if n < 2 {
        return Err(INVALID_SYNTAX.to_string());
    }

    let bytes = s.as_bytes();
    let quote = bytes[0];
    if quote != bytes[n - 1] {
        return Err(INVALID_SYNTAX.to_string());
    }

    let inner = &s[1..n - 1];

    if quote == b'`' {
        if inner.contains('`') {
            return Err(INVALID_SYNTAX.to_string());
        }
        return Ok(inner.to_string());
    }

    if quote != b'"' && quote != b'\'' {
        return Err(INVALID_SYNTAX.to_string());
    }

    if inner.contains('\n') {
        return Err(INVALID_SYNTAX.to_string());
    }

    if !inner.contains('\\') && !inner.contains(quote as char) {
        return Ok(inner.to_string());
    }

    let mut res = String::with_capacity(3 * inner.len() / 2);
    let mut rest = inner;

    while !rest.is_empty() {
        let (c, tail) = unquote_char(rest, quote)?;
        res.push(c);
        rest = tail;
    }

    Ok(res)
}

fn unquote_char(s: &str, quote: u8) -> Result<(char, &str), String> {
    let bytes = s.as_bytes();
    let c = bytes[0];

    // Easy cases
    if c == quote && (quote == b'\'' || quote == b'"') {
        return Err(INVALID_SYNTAX.to_string());
    }

    if c >= 0x80 {
        // multi-byte UTF-8 character
        return match s.chars().next() {
            Some(r) => Ok((r, &s[r.len_utf8()..])),
            None => Err(INVALID_SYNTAX.to_string()),
        };
    }

    if c != b'\\' {
        return Ok((c as char, &s[1..]));
    }

    // Hard case: backslash
    if s.len() <= 1 {
        return Err(UNTERMINATED_ESCAPE.to_string());
    }

    let c = bytes[1];
    let mut tail = &s[2..];

    let value = match c {
        b'a' => '\x07', // Alert/Bell
        b'b' => '\x08', // Backspace
        b'f' => '\x0c', // Form feed
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'v' => '\x0b', // Vertical tab
        b'x' | b'u' | b'U' => {
            let n = match c {
                b'x' => 2,
                b'u' => 4,
                _ => 8,
            };

            if tail.len() < n {
                return Err(UNTERMINATED_ESCAPE.to_string());
            }

            let mut v: u32 = 0;
            for &b in &tail.as_bytes()[..n] {
                v = (v << 4) | unhex(b)?;
            }

            tail = &tail[n..];

            if v > 0x10FFFF {
                return Err(UNTERMINATED_ESCAPE.to_string());
            }
            std::char::from_u32(v).ok_or(UNTERMINATED_ESCAPE)?
        }
        b'0'..=b'7' => {
            let mut v = (c - b'0') as u32;
            if tail.len() < 2 {
                return Err(UNTERMINATED_ESCAPE.to_string());
            }
            for &b in &tail.as_bytes()[..2] {
                let x = (b as char).to_digit(8).ok_or(UNTERMINATED_ESCAPE)?;
                v = (v << 3) | x;
            }
            tail = &tail[2..];
            if v > 255 {
                return Err(UNTERMINATED_ESCAPE.to_string());
            }
            std::char::from_u32(v).ok_or(UNTERMINATED_ESCAPE)?
        }
        b'\\' => '\\',
        b'\'' | b'"' => {
            if c != quote {
                return Err(UNTERMINATED_ESCAPE.to_string());
            }
            c as char
        }
        _ => return Err(UNTERMINATED_ESCAPE.to_string()),
    };

    Ok((value, tail))
}

fn unhex(b: u8) -> Result<u32, String> {
    (b as char)
        .to_digit(16)
        .ok_or_else(|| UNTERMINATED_ESCAPE.to_string())
}

/// quote a string with double quotes, escaping everything `unquote_string`
/// would otherwise reject or decode.
pub fn escape_string(s: &str) -> String {
    let mut res = String::with_capacity(s.len() + 2);
    res.push('"');
    for c in s.chars() {
        match c {
            '\\' => res.push_str("\\\\"),
            '"' => res.push_str("\\\""),
            '\n' => res.push_str("\\n"),
            '\r' => res.push_str("\\r"),
            '\t' => res.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\x7f' => {
                res.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => res.push(c),
        }
    }
    res.push('"');
    res
}
