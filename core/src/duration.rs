//! Nanosecond-precision durations with composite segment syntax.
//!
//! The wire format is a sequence of `<count><unit>` segments, high-to-low
//! magnitude, e.g. `"1h30m25s"` or `"1.5ms"`. A leading sign applies to the
//! whole string. Parsing and formatting round-trip, so coerced duration
//! values survive serialization unchanged.

use std::fmt;
use std::ops::{Add, Mul, Neg};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Recognized unit suffixes, in nanoseconds. Longest match wins, so `ms`
/// takes priority over a bare `m`.
const UNITS: &[(&str, i64)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60_000_000_000),
    ("h", 3_600_000_000_000),
];

/// Duration parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDurationError {
    /// The string is empty or a segment has no digits.
    #[error("invalid duration: {0:?}")]
    Invalid(String),
    /// A segment count is not followed by a recognized unit.
    #[error("missing unit in duration: {0:?}")]
    MissingUnit(String),
    /// The accumulated value does not fit in a signed 64-bit nanosecond count.
    #[error("duration out of range: {0:?}")]
    OutOfRange(String),
}

/// A signed span of time, stored as nanoseconds.
///
/// # Examples
///
/// ```
/// use command_api_core::Duration;
///
/// let d: Duration = "1.5h25s".parse().unwrap();
/// assert_eq!(d, Duration::HOUR + Duration::MINUTE * 30 + Duration::SECOND * 25);
/// assert_eq!(d.to_string(), "1h30m25s");
///
/// let back: Duration = "-15m8s".parse().unwrap();
/// assert_eq!(back.to_string(), "-15m8s");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(i64);

impl Duration {
    /// One nanosecond.
    pub const NANOSECOND: Duration = Duration(1);
    /// One microsecond.
    pub const MICROSECOND: Duration = Duration(1_000);
    /// One millisecond.
    pub const MILLISECOND: Duration = Duration(1_000_000);
    /// One second.
    pub const SECOND: Duration = Duration(1_000_000_000);
    /// One minute.
    pub const MINUTE: Duration = Duration(60_000_000_000);
    /// One hour.
    pub const HOUR: Duration = Duration(3_600_000_000_000);

    /// Creates a duration from a raw nanosecond count.
    pub const fn from_nanos(nanos: i64) -> Self {
        Duration(nanos)
    }

    /// Returns the raw nanosecond count.
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Returns the duration as fractional seconds.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    /// Whether this duration is exactly zero.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s;
        let mut negative = false;
        if let Some(stripped) = rest.strip_prefix('-') {
            negative = true;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped;
        }
        if rest == "0" {
            return Ok(Duration(0));
        }
        if rest.is_empty() {
            return Err(ParseDurationError::Invalid(s.to_string()));
        }

        let mut total: i128 = 0;
        while !rest.is_empty() {
            let digits = leading_digits(rest);
            let int_part: i128 = if digits > 0 {
                rest[..digits]
                    .parse()
                    .map_err(|_| ParseDurationError::OutOfRange(s.to_string()))?
            } else {
                0
            };
            rest = &rest[digits..];

            let mut fraction = 0.0f64;
            let mut has_fraction = false;
            if let Some(after_dot) = rest.strip_prefix('.') {
                let frac_digits = leading_digits(after_dot);
                if frac_digits == 0 {
                    return Err(ParseDurationError::Invalid(s.to_string()));
                }
                let mut scale = 1.0;
                for byte in after_dot[..frac_digits].bytes() {
                    scale /= 10.0;
                    fraction += f64::from(byte - b'0') * scale;
                }
                has_fraction = true;
                rest = &after_dot[frac_digits..];
            }
            if digits == 0 && !has_fraction {
                return Err(ParseDurationError::Invalid(s.to_string()));
            }

            let Some((unit, unit_nanos)) = UNITS
                .iter()
                .filter(|(unit, _)| rest.starts_with(unit))
                .max_by_key(|(unit, _)| unit.len())
            else {
                return Err(ParseDurationError::MissingUnit(s.to_string()));
            };
            rest = &rest[unit.len()..];

            total += int_part * i128::from(*unit_nanos);
            if has_fraction {
                total += (fraction * *unit_nanos as f64) as i128;
            }
            if total > i128::from(i64::MAX) {
                return Err(ParseDurationError::OutOfRange(s.to_string()));
            }
        }

        let nanos = if negative { -total } else { total };
        Ok(Duration(nanos as i64))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let nanos = self.0.unsigned_abs();
        if nanos < NANOS_PER_SEC {
            let (scale, unit) = if nanos < 1_000 {
                (1, "ns")
            } else if nanos < 1_000_000 {
                (1_000, "µs")
            } else {
                (1_000_000, "ms")
            };
            write!(f, "{}", nanos / scale)?;
            if scale > 1 {
                write_fraction(f, nanos % scale, scale.ilog10())?;
            }
            return f.write_str(unit);
        }

        let secs = nanos / NANOS_PER_SEC;
        let frac = nanos % NANOS_PER_SEC;
        let hours = secs / 3600;
        let minutes = secs / 60 % 60;
        if hours > 0 {
            write!(f, "{hours}h")?;
        }
        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        write!(f, "{}", secs % 60)?;
        write_fraction(f, frac, 9)?;
        f.write_str("s")
    }
}

/// Writes `.digits` with trailing zeros trimmed, or nothing for a zero
/// fraction.
fn write_fraction(f: &mut fmt::Formatter<'_>, frac: u64, precision: u32) -> fmt::Result {
    if frac == 0 {
        return Ok(());
    }
    let mut text = format!("{frac:0width$}", width = precision as usize);
    while text.ends_with('0') {
        text.pop();
    }
    write!(f, ".{text}")
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(|b| b.is_ascii_digit()).count()
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration(self.0 * rhs)
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration(-self.0)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_segments() {
        assert_eq!("2s".parse::<Duration>().unwrap(), Duration::SECOND * 2);
        assert_eq!("100ns".parse::<Duration>().unwrap(), Duration::NANOSECOND * 100);
        assert_eq!("3m".parse::<Duration>().unwrap(), Duration::MINUTE * 3);
        assert_eq!("0".parse::<Duration>().unwrap(), Duration::from_nanos(0));
    }

    #[test]
    fn test_parse_composite_and_fractional() {
        assert_eq!(
            "1.5h25s".parse::<Duration>().unwrap(),
            Duration::HOUR + Duration::MINUTE * 30 + Duration::SECOND * 25,
        );
        assert_eq!(
            "-15m8s".parse::<Duration>().unwrap(),
            -(Duration::MINUTE * 15 + Duration::SECOND * 8),
        );
        assert_eq!("1.5ms".parse::<Duration>().unwrap(), Duration::MICROSECOND * 1500);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Duration>().is_err());
        assert!("foo".parse::<Duration>().is_err());
        assert!("-5.8".parse::<Duration>().is_err());
        assert!("true".parse::<Duration>().is_err());
        assert!("5x".parse::<Duration>().is_err());
        assert!("1h2q".parse::<Duration>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["2s", "1h30m25s", "-15m8s", "0s", "1.5ms", "100ns", "1m0s"] {
            let parsed: Duration = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text, "round trip of {text}");
        }
    }

    #[test]
    fn test_display_picks_subsecond_units() {
        assert_eq!(Duration::from_nanos(1_500).to_string(), "1.5µs");
        assert_eq!(Duration::from_nanos(12).to_string(), "12ns");
        assert_eq!((Duration::MILLISECOND * 250).to_string(), "250ms");
    }

    #[test]
    fn test_serde_uses_segment_syntax() {
        let d: Duration = "1h30m".parse().unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"1h30m0s\"");
        let back: Duration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
