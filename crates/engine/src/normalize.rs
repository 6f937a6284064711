use crate::error::{ResolveError, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// `YYYY`, `YYYY-MM` or `YYYY-MM-DD`; month and day may be one or two digits.
static NUMERIC_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{4})(?:-([0-9]{1,2})(?:-([0-9]{1,2}))?)?$").expect("valid regex")
});

/// `<month-name> <YYYY>` anywhere in the text; the first occurrence wins.
static MONTH_NAME_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z]+)\s+([0-9]{4})").expect("valid regex"));

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Canonical form of an entity or event name.
///
/// Lowercases, drops the possessive `'s`, strips ASCII punctuation and collapses
/// whitespace. Two inputs with the same canonical form are the same entity.
#[must_use]
pub fn normalize_entity(text: &str) -> String {
    let lowered = text.to_lowercase().replace("'s", "");
    let stripped: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A year with an optional month. An absent month matches any month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NormalizedTime {
    pub year: i32,
    pub month: Option<u32>,
}

impl NormalizedTime {
    #[must_use]
    pub const fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    #[must_use]
    pub const fn year_month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// Hard time constraint: years must be equal, and months too when both are known.
    #[must_use]
    pub fn agrees_with(&self, other: &NormalizedTime) -> bool {
        if self.year != other.year {
            return false;
        }
        match (self.month, other.month) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for NormalizedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(month) => write!(f, "{:04}-{:02}", self.year, month),
            None => write!(f, "{:04}", self.year),
        }
    }
}

impl FromStr for NormalizedTime {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self> {
        normalize_time(s)
    }
}

/// Parse a free-text time expression into year and optional month.
///
/// Accepted shapes, tried in order: `YYYY-MM-DD`, `YYYY-MM`, `YYYY` (all calendar
/// checked), then `<month-name> <YYYY>` where only the first three letters of the
/// month name are significant.
pub fn normalize_time(text: &str) -> Result<NormalizedTime> {
    let trimmed = text.trim();
    parse_numeric(trimmed)
        .or_else(|| parse_month_name(trimmed))
        .ok_or_else(|| ResolveError::TimeFormat(trimmed.to_string()))
}

fn parse_numeric(text: &str) -> Option<NormalizedTime> {
    let caps = NUMERIC_TIME.captures(text)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    if year < 1 {
        return None;
    }
    let month = match caps.get(2) {
        Some(m) => m.as_str().parse::<u32>().ok()?,
        None => return Some(NormalizedTime::year(year)),
    };
    let day = match caps.get(3) {
        Some(d) => d.as_str().parse::<u32>().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)?;
    Some(NormalizedTime::year_month(year, month))
}

fn parse_month_name(text: &str) -> Option<NormalizedTime> {
    let caps = MONTH_NAME_TIME.captures(text)?;
    let word = caps.get(1)?.as_str();
    let prefix = word.get(..3)?.to_ascii_lowercase();
    let month = MONTH_ABBREVIATIONS.iter().position(|m| *m == prefix)? as u32 + 1;
    let year: i32 = caps.get(2)?.as_str().parse().ok()?;
    if year < 1 {
        return None;
    }
    Some(NormalizedTime::year_month(year, month))
}
