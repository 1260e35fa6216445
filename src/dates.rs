//! Calendar date handling.
//!
//! The backend sends dates as `YYYY-MM-DD` (sometimes with a time part), older
//! exports and hand-entered values use `M/D/YYYY`. Both normalise to a naive
//! calendar date; comparisons happen on whole days.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

use crate::error::SchoolError;

/// Parse either `M/D/YYYY` or `YYYY-MM-DD[Thh:mm...]`. Anything else is `None`.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let slash: Vec<&str> = raw.split('/').collect();
    if slash.len() == 3 {
        let month: u32 = slash[0].trim().parse().ok()?;
        let day: u32 = slash[1].trim().parse().ok()?;
        let year: i32 = slash[2].trim().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let date_part = raw.split(&['T', ' '][..]).next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse a date typed on the command line, reporting which flag was wrong.
pub fn parse_input_date(flag: &str, raw: &str) -> Result<NaiveDate, SchoolError> {
    parse_record_date(raw)
        .ok_or_else(|| SchoolError::invalid(flag, raw, "expected YYYY-MM-DD or M/D/YYYY"))
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last representable millisecond of the day, so `to` bounds include the whole day.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| start_of_day(date))
}

/// A calendar month, used for billing periods and month filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month of a raw record date, if it parses.
    pub fn of_record(raw: &str) -> Option<Self> {
        parse_record_date(raw).map(Self::of)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// "April 2025"
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = SchoolError;

    /// Accepts `YYYY-MM` or any full date form understood by [`parse_record_date`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(date) = parse_record_date(s) {
            return Ok(Self::of(date));
        }
        let invalid = || SchoolError::invalid("month", s, "expected YYYY-MM");
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(invalid());
        }
        Ok(YearMonth { year, month })
    }
}

/// Human label for a raw month value, falling back to the raw text.
pub fn month_label(raw: &str) -> String {
    YearMonth::of_record(raw)
        .map(|m| m.label())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_both_wire_forms() {
        assert_eq!(parse_record_date("4/7/2025"), Some(ymd(2025, 4, 7)));
        assert_eq!(parse_record_date("2025-04-07"), Some(ymd(2025, 4, 7)));
        assert_eq!(parse_record_date("2025-04-07T10:30:00Z"), Some(ymd(2025, 4, 7)));
    }

    #[test]
    fn rejects_other_shapes() {
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("07.04.2025"), None);
        assert_eq!(parse_record_date("next tuesday"), None);
        assert_eq!(parse_record_date("2/30/2025"), None);
    }

    #[test]
    fn end_of_day_covers_the_whole_day() {
        let day = ymd(2025, 3, 31);
        assert!(start_of_day(day) <= end_of_day(day));
        assert!(end_of_day(day) < start_of_day(ymd(2025, 4, 1)));
    }

    #[test]
    fn year_month_parsing_and_labels() {
        let m: YearMonth = "2024-12".parse().unwrap();
        assert_eq!(m, YearMonth { year: 2024, month: 12 });
        assert_eq!(m.label(), "December 2024");
        assert_eq!("2025-01-15".parse::<YearMonth>().unwrap().to_string(), "2025-01");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!(m < "2025-01".parse().unwrap());
    }
}
