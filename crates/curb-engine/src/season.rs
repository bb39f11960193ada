//! Yearly season windows.
//!
//! Regulations are often only posted for part of the year ("1 AVRIL AU 1 DEC.").
//! A season is stored as a pair of month-day dates and may wrap around the end
//! of the year (December to April).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CurbError;

/// A month-day pair, written `MM-DD` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeasonDate {
    pub month: u32,
    pub day: u32,
}

impl SeasonDate {
    pub fn new(month: u32, day: u32) -> Result<Self, CurbError> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(CurbError::InvalidSeason(format!("{:02}-{:02}", month, day)));
        }
        Ok(Self { month, day })
    }
}

impl FromStr for SeasonDate {
    type Err = CurbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CurbError::InvalidSeason(s.to_string());
        let (month, day) = s.trim().split_once('-').ok_or_else(invalid)?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        let day = day.parse::<u32>().map_err(|_| invalid())?;
        Self::new(month, day)
    }
}

impl TryFrom<String> for SeasonDate {
    type Error = CurbError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SeasonDate> for String {
    fn from(d: SeasonDate) -> Self {
        d.to_string()
    }
}

impl fmt::Display for SeasonDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Decide whether `(day, month)` falls inside the season
/// `(start_day, start_month)..=(end_day, end_month)`.
///
/// A zero `start_month` means the rule has no season and always matches.
/// When `start_month > end_month` the season wraps around the new year, and
/// only months strictly between `end_month` and `start_month` are excluded.
/// Day boundaries are enforced on the start and end months independently.
pub fn season_matches(
    start_day: u32,
    start_month: u32,
    end_day: u32,
    end_month: u32,
    day: u32,
    month: u32,
) -> bool {
    if start_month == 0 {
        return true;
    }

    if start_month <= end_month && !(start_month..=end_month).contains(&month) {
        return false;
    }
    if start_month > end_month && month < start_month && month > end_month {
        return false;
    }

    if month == start_month && day < start_day {
        return false;
    }
    if month == end_month && day > end_day {
        return false;
    }

    true
}

/// Match a calendar date against an optional season window.
///
/// A missing start means "all year". A missing end is treated as month zero,
/// so the window runs from the start date to the end of the year.
pub fn in_season(start: Option<SeasonDate>, end: Option<SeasonDate>, date: NaiveDate) -> bool {
    let Some(start) = start else {
        return true;
    };
    let (end_day, end_month) = end.map_or((0, 0), |e| (e.day, e.month));
    season_matches(
        start.day,
        start.month,
        end_day,
        end_month,
        date.day(),
        date.month(),
    )
}
