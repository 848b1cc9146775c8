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

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{self, Display, Write};
use std::time::Duration as StdDuration;

lazy_static! {
    static ref RANGE_RE: Regex = Regex::new(r"^([0-9]+)([smhdwy])$").unwrap();
    static ref FOR_DURATION_RE: Regex = Regex::new(
        r"(?x)
^
((?P<h>[0-9]+)h)?
((?P<m>[0-9]+)m)?
((?P<s>[0-9]+)s)?
$",
    )
    .unwrap();
}

pub const SECOND_DURATION: StdDuration = StdDuration::from_secs(1);
pub const MINUTE_DURATION: StdDuration = StdDuration::from_secs(60);
pub const HOUR_DURATION: StdDuration = StdDuration::from_secs(60 * 60);
pub const DAY_DURATION: StdDuration = StdDuration::from_secs(60 * 60 * 24);
pub const WEEK_DURATION: StdDuration = StdDuration::from_secs(60 * 60 * 24 * 7);
pub const YEAR_DURATION: StdDuration = StdDuration::from_secs(60 * 60 * 24 * 365);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum DurationUnit {
    #[cfg_attr(feature = "ser", serde(rename = "s"))]
    Second,
    #[cfg_attr(feature = "ser", serde(rename = "m"))]
    Minute,
    #[cfg_attr(feature = "ser", serde(rename = "h"))]
    Hour,
    #[cfg_attr(feature = "ser", serde(rename = "d"))]
    Day,
    #[cfg_attr(feature = "ser", serde(rename = "w"))]
    Week,
    #[cfg_attr(feature = "ser", serde(rename = "y"))]
    Year,
}

impl DurationUnit {
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "s" => Some(Self::Second),
            "m" => Some(Self::Minute),
            "h" => Some(Self::Hour),
            "d" => Some(Self::Day),
            "w" => Some(Self::Week),
            "y" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Second => "s",
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Week => "w",
            Self::Year => "y",
        }
    }

    /// the length of one unit, assuming that a year always has 365d,
    /// a week always has 7d, and a day always has 24h.
    pub fn std_duration(&self) -> StdDuration {
        match self {
            Self::Second => SECOND_DURATION,
            Self::Minute => MINUTE_DURATION,
            Self::Hour => HOUR_DURATION,
            Self::Day => DAY_DURATION,
            Self::Week => WEEK_DURATION,
            Self::Year => YEAR_DURATION,
        }
    }
}

impl Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// A single-unit PromQL duration literal such as `5m` or `50d`, used by
/// range selectors and offsets. Compound durations like `1h30m` are not
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct Duration {
    pub amount: u64,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn new(amount: u64, unit: DurationUnit) -> Self {
        Self { amount, unit }
    }

    /// parses a duration literal made of an integer and a single unit.
    ///
    /// # Examples
    ///
    /// ```
    /// use alert_promql::util::{Duration, DurationUnit};
    ///
    /// assert_eq!(Duration::parse("5m").unwrap(), Duration::new(5, DurationUnit::Minute));
    /// assert!(Duration::parse("1h30m").is_err());
    /// ```
    pub fn parse(ds: &str) -> Result<Self, String> {
        if ds.is_empty() {
            return Err("empty duration string".into());
        }

        let caps = RANGE_RE
            .captures(ds)
            .ok_or_else(|| format!("not a valid duration string: {ds}"))?;
        let amount = caps[1]
            .parse::<u64>()
            .map_err(|_| format!("duration out of range: {ds}"))?;
        let unit = DurationUnit::from_suffix(&caps[2])
            .ok_or_else(|| format!("unknown duration unit in {ds}"))?;
        Ok(Self { amount, unit })
    }

    /// the equivalent std duration, None on overflow.
    pub fn as_std(&self) -> Option<StdDuration> {
        let amount = u32::try_from(self.amount).ok()?;
        self.unit.std_duration().checked_mul(amount)
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit)
    }
}

/// parses the `for` duration of an alert rule, e.g. `1h30m`, `5m` or `30s`.
/// Only hours, minutes and seconds are accepted, in that order.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use alert_promql::util;
///
/// assert_eq!(util::parse_for_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(util::parse_for_duration("0s").unwrap(), Duration::ZERO);
/// ```
pub fn parse_for_duration(ds: &str) -> Result<StdDuration, String> {
    if ds.is_empty() {
        return Err("empty duration string".into());
    }

    let caps = FOR_DURATION_RE
        .captures(ds)
        .ok_or_else(|| format!("not a valid duration string: {ds}"))?;

    [
        ("h", HOUR_DURATION),
        ("m", MINUTE_DURATION),
        ("s", SECOND_DURATION),
    ]
    .into_iter()
    .try_fold(StdDuration::ZERO, |acc, (title, unit)| {
        let part = match caps.name(title) {
            Some(cap) => cap
                .as_str()
                .parse::<u32>()
                .ok()
                .and_then(|v| unit.checked_mul(v))
                .ok_or_else(|| format!("duration overflowed: {ds}"))?,
            None => StdDuration::ZERO,
        };
        acc.checked_add(part)
            .ok_or_else(|| format!("duration overflowed: {ds}"))
    })
}

/// display an alert rule `for` duration using hours, minutes and seconds.
pub fn display_for_duration(duration: &StdDuration) -> String {
    let mut secs = duration.as_secs();
    if secs == 0 {
        return "0s".into();
    }
    let mut ss = String::new();

    let mut f = |unit: &str, mult: u64| {
        let v = secs / mult;
        if v > 0 {
            // writing into a String never fails
            let _ = write!(ss, "{v}{unit}");
            secs -= v * mult;
        }
    };

    f("h", 60 * 60);
    f("m", 60);
    f("s", 1);

    ss
}
