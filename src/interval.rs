//! SQL interval types.
//!
//! `chrono` has no SQL interval, so the two ANSI interval classes are modeled
//! directly. Display renders the SQL textual form; `FromStr` accepts both
//! that form and the sign-prefixed variants drivers emit.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An ANSI `INTERVAL DAY TO SECOND` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayToSecond {
    pub negative: bool,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub nanos: u32,
}

impl DayToSecond {
    pub fn new(days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            negative: false,
            days,
            hours,
            minutes,
            seconds,
            nanos: 0,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Total length in milliseconds, signed.
    pub fn total_millis(&self) -> i64 {
        let ms = self.days as i64 * 86_400_000
            + self.hours as i64 * 3_600_000
            + self.minutes as i64 * 60_000
            + self.seconds as i64 * 1_000
            + self.nanos as i64 / 1_000_000;
        if self.negative { -ms } else { ms }
    }
}

impl std::fmt::Display for DayToSecond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.negative { "-" } else { "+" };
        write!(
            f,
            "{}{} {:02}:{:02}:{:02}.{:09}",
            sign, self.days, self.hours, self.minutes, self.seconds, self.nanos
        )
    }
}

impl FromStr for DayToSecond {
    type Err = String;

    /// Parse `[+|-]D HH:MM:SS[.fffffffff]`. Days and the fraction are
    /// optional, matching both our own Display output and common driver
    /// output such as `04:05:06`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (days, clock) = match rest.split_once(' ') {
            Some((d, c)) => (
                d.parse::<u32>().map_err(|e| format!("bad days: {}", e))?,
                c,
            ),
            None => (0, rest),
        };

        let (clock, nanos) = match clock.split_once('.') {
            Some((c, frac)) => {
                if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(format!("bad fraction: '{}'", frac));
                }
                // Right-pad to nanosecond precision.
                let mut n: u32 = frac.parse().map_err(|e| format!("bad fraction: {}", e))?;
                for _ in frac.len()..9 {
                    n *= 10;
                }
                (c, n)
            }
            None => (clock, 0),
        };

        let mut parts = clock.split(':');
        let hours = parse_part(parts.next(), "hours")?;
        let minutes = parse_part(parts.next(), "minutes")?;
        let seconds = parse_part(parts.next(), "seconds")?;
        if parts.next().is_some() {
            return Err(format!("too many clock components in '{}'", s));
        }

        Ok(Self {
            negative,
            days,
            hours,
            minutes,
            seconds,
            nanos,
        })
    }
}

fn parse_part(part: Option<&str>, what: &str) -> Result<u32, String> {
    part.ok_or_else(|| format!("missing {}", what))?
        .parse()
        .map_err(|e| format!("bad {}: {}", what, e))
}

/// An ANSI `INTERVAL YEAR TO MONTH` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearToMonth {
    pub negative: bool,
    pub years: u32,
    pub months: u32,
}

impl YearToMonth {
    pub fn new(years: u32, months: u32) -> Self {
        Self {
            negative: false,
            years,
            months,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Total length in months, signed.
    pub fn total_months(&self) -> i64 {
        let m = self.years as i64 * 12 + self.months as i64;
        if self.negative { -m } else { m }
    }
}

impl std::fmt::Display for YearToMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.negative { "-" } else { "+" };
        write!(f, "{}{}-{:02}", sign, self.years, self.months)
    }
}

impl FromStr for YearToMonth {
    type Err = String;

    /// Parse `[+|-]Y-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (y, m) = rest
            .split_once('-')
            .ok_or_else(|| format!("missing year-month separator in '{}'", s))?;
        Ok(Self {
            negative,
            years: y.parse().map_err(|e| format!("bad years: {}", e))?,
            months: m.parse().map_err(|e| format!("bad months: {}", e))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_to_second_roundtrip() {
        let i = DayToSecond::new(3, 4, 5, 6);
        let parsed: DayToSecond = i.to_string().parse().unwrap();
        assert_eq!(parsed, i);
    }

    #[test]
    fn test_day_to_second_lenient_forms() {
        let bare: DayToSecond = "04:05:06".parse().unwrap();
        assert_eq!(bare, DayToSecond::new(0, 4, 5, 6));

        let frac: DayToSecond = "1 00:00:00.5".parse().unwrap();
        assert_eq!(frac.nanos, 500_000_000);

        let neg: DayToSecond = "-2 01:00:00".parse().unwrap();
        assert!(neg.negative);
        assert_eq!(neg.total_millis(), -(2 * 86_400_000 + 3_600_000));
    }

    #[test]
    fn test_year_to_month() {
        let i: YearToMonth = "1-06".parse().unwrap();
        assert_eq!(i.total_months(), 18);
        let neg: YearToMonth = "-0-03".parse().unwrap();
        assert_eq!(neg.total_months(), -3);
        assert_eq!(YearToMonth::new(2, 1).to_string(), "+2-01");
    }

    #[test]
    fn test_bad_input() {
        assert!("abc".parse::<DayToSecond>().is_err());
        assert!("1 2:3".parse::<DayToSecond>().is_err());
        assert!("12".parse::<YearToMonth>().is_err());
    }
}
