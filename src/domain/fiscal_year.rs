use crate::utils::error::{GstError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Indian fiscal year, 1 April to 31 March, written `"2025-26"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// Four-digit start years only, so both boundary dates exist.
    pub fn new(start_year: i32) -> Result<Self> {
        if !(1000..=9998).contains(&start_year) {
            return Err(GstError::FiscalYearError {
                value: start_year.to_string(),
                reason: "start year must have four digits".to_string(),
            });
        }
        Ok(Self { start_year })
    }

    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: &str| GstError::FiscalYearError {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let (start, end) = value
            .trim()
            .split_once('-')
            .ok_or_else(|| invalid("expected YYYY-YY"))?;

        if start.len() != 4 || !start.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("start year must be four digits"));
        }
        if end.len() != 2 || !end.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("end year must be two digits"));
        }

        let start_year: i32 = start.parse().map_err(|_| invalid("start year is not a number"))?;
        let end_year: i32 = end.parse().map_err(|_| invalid("end year is not a number"))?;
        if end_year != (start_year + 1) % 100 {
            return Err(invalid("end year must follow the start year"));
        }

        Self::new(start_year)
    }

    /// The fiscal year a date falls in.
    pub fn containing(date: NaiveDate) -> Result<Self> {
        if date.month() >= 4 {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year, 4, 1).expect("four-digit years are valid dates")
    }

    pub fn end_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.start_year + 1, 3, 31)
            .expect("four-digit years are valid dates")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// `"25-26"` for 2025-26.
    pub fn short(&self) -> String {
        format!("{:02}-{:02}", self.start_year % 100, (self.start_year + 1) % 100)
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, (self.start_year + 1) % 100)
    }
}

impl FromStr for FiscalYear {
    type Err = GstError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = GstError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FiscalYear> for String {
    fn from(value: FiscalYear) -> Self {
        value.to_string()
    }
}
