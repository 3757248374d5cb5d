//! Calendar quarters used to key preventive maintenance reports

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Accepted textual form, e.g. `2026-Q3`
pub static QUARTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-Q([1-4])$").expect("valid quarter regex"));

/// A calendar quarter (`number` is 1..=4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    year: i32,
    number: u8,
}

impl Quarter {
    pub fn new(year: i32, number: u8) -> Result<Self, AppError> {
        if !(1..=4).contains(&number) {
            return Err(AppError::Validation(format!(
                "Quarter number must be between 1 and 4, got {}",
                number
            )));
        }
        Ok(Self { year, number })
    }

    /// Quarter containing the given date (Jan-Mar is Q1)
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            number: (date.month0() / 3 + 1) as u8,
        }
    }

    /// First day of the quarter
    pub fn start_date(&self) -> NaiveDate {
        let month = (self.number as u32 - 1) * 3 + 1;
        NaiveDate::from_ymd_opt(self.year, month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the quarter
    pub fn end_date(&self) -> NaiveDate {
        self.next().start_date().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.number == 4 {
            Self { year: self.year + 1, number: 1 }
        } else {
            Self { year: self.year, number: self.number + 1 }
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.number)
    }
}

impl FromStr for Quarter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = QUARTER_RE
            .captures(s.trim())
            .ok_or_else(|| AppError::Validation(format!("Invalid quarter '{}', expected YYYY-Qn", s)))?;
        let year: i32 = caps[1]
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid quarter year in '{}'", s)))?;
        let number: u8 = caps[2]
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid quarter number in '{}'", s)))?;
        Quarter::new(year, number)
    }
}

impl TryFrom<String> for Quarter {
    type Error = AppError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> Self {
        q.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_containing() {
        assert_eq!(Quarter::containing(date(2026, 1, 1)).to_string(), "2026-Q1");
        assert_eq!(Quarter::containing(date(2026, 3, 31)).to_string(), "2026-Q1");
        assert_eq!(Quarter::containing(date(2026, 4, 1)).to_string(), "2026-Q2");
        assert_eq!(Quarter::containing(date(2026, 10, 19)).to_string(), "2026-Q4");
    }

    #[test]
    fn test_parse() {
        let q: Quarter = "2025-Q3".parse().unwrap();
        assert_eq!(q, Quarter::new(2025, 3).unwrap());
        assert!("2025-Q5".parse::<Quarter>().is_err());
        assert!("Q3-2025".parse::<Quarter>().is_err());
        assert!("".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_bounds() {
        let q = Quarter::new(2024, 4).unwrap();
        assert_eq!(q.start_date(), date(2024, 10, 1));
        assert_eq!(q.end_date(), date(2024, 12, 31));
        assert_eq!(q.next().to_string(), "2025-Q1");
        assert_eq!(Quarter::new(2024, 1).unwrap().end_date(), date(2024, 3, 31));
    }

    #[test]
    fn test_serde_as_string() {
        let q = Quarter::new(2026, 2).unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"2026-Q2\"");
        let back: Quarter = serde_json::from_str("\"2026-Q2\"").unwrap();
        assert_eq!(back, q);
        assert!(serde_json::from_str::<Quarter>("\"2026-Q0\"").is_err());
    }
}
