//! Partial-precision date/time values.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

/// A point in time known to year, month, day or instant precision.
///
/// Instants keep the offset as written: `Z` and `+00:00` are distinct values,
/// as are the same moment written in two different offsets.
#[derive(Debug, Clone, Copy)]
pub enum DateTimeValue {
    Year(i32),
    YearMonth(i32, u32),
    Date(NaiveDate),
    Instant {
        at: DateTime<FixedOffset>,
        /// Offset was written as `Z`.
        zulu: bool,
    },
}

impl DateTimeValue {
    fn instant_key(&self) -> Option<(chrono::NaiveDateTime, i32, bool)> {
        match self {
            DateTimeValue::Instant { at, zulu } => {
                Some((at.naive_utc(), at.offset().local_minus_utc(), *zulu))
            }
            _ => None,
        }
    }
}

impl PartialEq for DateTimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DateTimeValue::Year(a), DateTimeValue::Year(b)) => a == b,
            (DateTimeValue::YearMonth(ay, am), DateTimeValue::YearMonth(by, bm)) => {
                ay == by && am == bm
            }
            (DateTimeValue::Date(a), DateTimeValue::Date(b)) => a == b,
            (DateTimeValue::Instant { .. }, DateTimeValue::Instant { .. }) => {
                self.instant_key() == other.instant_key()
            }
            _ => false,
        }
    }
}

impl Eq for DateTimeValue {}

impl Hash for DateTimeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DateTimeValue::Year(year) => year.hash(state),
            DateTimeValue::YearMonth(year, month) => (year, month).hash(state),
            DateTimeValue::Date(date) => date.hash(state),
            DateTimeValue::Instant { .. } => self.instant_key().hash(state),
        }
    }
}

impl DateTimeValue {
    /// Earliest calendar date covered by the value.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self {
            DateTimeValue::Year(year) => NaiveDate::from_ymd_opt(*year, 1, 1),
            DateTimeValue::YearMonth(year, month) => NaiveDate::from_ymd_opt(*year, *month, 1),
            DateTimeValue::Date(date) => Some(*date),
            DateTimeValue::Instant { at, .. } => Some(at.date_naive()),
        }
    }

    pub fn has_time(&self) -> bool {
        matches!(self, DateTimeValue::Instant { .. })
    }
}

impl From<NaiveDate> for DateTimeValue {
    fn from(date: NaiveDate) -> Self {
        DateTimeValue::Date(date)
    }
}

impl From<DateTime<FixedOffset>> for DateTimeValue {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        DateTimeValue::Instant {
            at: instant,
            zulu: instant.offset().local_minus_utc() == 0,
        }
    }
}

impl FromStr for DateTimeValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('T') {
            let zulu = s.ends_with('Z') || s.ends_with('z');
            return DateTime::parse_from_rfc3339(s)
                .map(|at| DateTimeValue::Instant { at, zulu })
                .map_err(|e| format!("not an instant with time zone: {e}"));
        }
        match s.len() {
            4 => parse_year(s).map(DateTimeValue::Year),
            7 => {
                let (year, month) = s.split_once('-').ok_or("expected YYYY-MM")?;
                let year = parse_year(year)?;
                let month: u32 = month.parse().map_err(|_| "month is not a number")?;
                if !(1..=12).contains(&month) {
                    return Err(format!("month {month} out of range"));
                }
                Ok(DateTimeValue::YearMonth(year, month))
            }
            10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(DateTimeValue::Date)
                .map_err(|e| format!("not a calendar date: {e}")),
            _ => Err("expected YYYY, YYYY-MM, YYYY-MM-DD or an instant".to_string()),
        }
    }
}

fn parse_year(s: &str) -> Result<i32, String> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not a four digit year"));
    }
    s.parse().map_err(|_| format!("'{s}' is not a year"))
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeValue::Year(year) => write!(f, "{year:04}"),
            DateTimeValue::YearMonth(year, month) => write!(f, "{year:04}-{month:02}"),
            DateTimeValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DateTimeValue::Instant { at, zulu } => {
                f.write_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, *zulu))
            }
        }
    }
}
