//! Decide whether a requested parking window collides with posted regulations.
//!
//! Each rule goes through an ordered set of guards (paid, season, permit)
//! before its agenda is anchored to absolute times and tested for overlap with
//! `[checkin, checkin + duration)`. Overlaps under a maximum-parking limit are
//! only blocking when the restricted part of the stay exceeds the limit.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CurbError, Result};
use crate::rule::{next_weekday, CompiledRule, HourInterval, RestrictType};

/// Default requested stay, in hours.
pub const DEFAULT_DURATION_HOURS: f64 = 0.5;

/// Permit held by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permit {
    /// No permit; permit-restricted windows apply.
    #[default]
    None,
    /// Treat every permit-restricted window as exempt.
    All,
    /// A specific permit number, compared as text with the rule's `permit_no`.
    Number(String),
}

impl Permit {
    fn exempts(&self, rule: &CompiledRule) -> bool {
        match self {
            Permit::None => false,
            Permit::All => true,
            Permit::Number(n) => rule.permit_no.as_deref() == Some(n.as_str()),
        }
    }
}

impl FromStr for Permit {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "false" => Permit::None,
            "all" => Permit::All,
            other => Permit::Number(other.to_string()),
        })
    }
}

/// A requested occupancy window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationQuery {
    pub checkin: NaiveDateTime,
    pub duration_hours: f64,
    /// Whether the caller accepts paid slots.
    pub want_paid: bool,
    pub permit: Permit,
}

impl EvaluationQuery {
    /// Query for a half-hour stay, paid slots accepted, no permit.
    pub fn new(checkin: NaiveDateTime) -> Self {
        Self {
            checkin,
            duration_hours: DEFAULT_DURATION_HOURS,
            want_paid: true,
            permit: Permit::None,
        }
    }

    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    pub fn with_want_paid(mut self, want_paid: bool) -> Self {
        self.want_paid = want_paid;
        self
    }

    pub fn with_permit(mut self, permit: Permit) -> Self {
        self.permit = permit;
        self
    }

    /// Requested stay as a [`TimeDelta`].
    ///
    /// # Errors
    /// Returns [`CurbError::InvalidQuery`] unless the duration is finite and positive.
    pub fn duration(&self) -> Result<TimeDelta> {
        if !self.duration_hours.is_finite() || self.duration_hours <= 0.0 {
            return Err(CurbError::InvalidQuery(format!(
                "duration must be a positive number of hours, got {}",
                self.duration_hours
            )));
        }
        hours_to_delta(self.duration_hours).ok_or_else(|| {
            CurbError::InvalidQuery(format!("duration {} is out of range", self.duration_hours))
        })
    }

    /// End of the requested window.
    pub fn checkout(&self) -> Result<NaiveDateTime> {
        self.checkin
            .checked_add_signed(self.duration()?)
            .ok_or_else(|| CurbError::InvalidQuery("checkout is out of range".to_string()))
    }
}

/// Parse an ISO-8601 local timestamp such as `2015-04-07T09:30`.
pub fn parse_checkin(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| CurbError::InvalidQuery(format!("unparseable checkin: {}", s)))
}

/// Outcome of the guards run before a rule's agenda is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleGate {
    /// The rule does not concern this query.
    Skip,
    /// The whole evaluation is decided by this rule.
    Decide(bool),
    /// Anchor the agenda and test for overlap.
    Inspect,
}

fn gate(rule: &CompiledRule, query: &EvaluationQuery) -> RuleGate {
    match rule.restrict_typ {
        // Free-only searches stop at the first paid rule, whatever its schedule.
        RestrictType::Paid if !query.want_paid => return RuleGate::Decide(true),
        RestrictType::Paid | RestrictType::Angled => return RuleGate::Skip,
        _ => {}
    }
    if !rule.in_season(query.checkin.date()) {
        return RuleGate::Skip;
    }
    if rule.restrict_typ == RestrictType::Permit && query.permit.exempts(rule) {
        return RuleGate::Skip;
    }
    RuleGate::Inspect
}

/// Returns `true` when the requested window is blocked by any of `rules`.
///
/// Rules are examined in order and the first decisive rule ends the
/// evaluation. A paid rule met during a free-only search (`want_paid == false`)
/// blocks the whole query, even when an earlier or later rule would not.
///
/// # Errors
/// - [`CurbError::InvalidQuery`] when the duration is not a positive number of hours.
/// - [`CurbError::DataIntegrity`] when an agenda hour cannot form a time of day.
/// - [`CurbError::RuleEvaluation`] when anchoring an interval overflows the calendar.
pub fn on_restriction(rules: &[CompiledRule], query: &EvaluationQuery) -> Result<bool> {
    let window = Window::new(query)?;

    for rule in rules {
        match gate(rule, query) {
            RuleGate::Skip => continue,
            RuleGate::Decide(blocked) => {
                debug!(code = %rule.code, blocked, "paid rule ends free-only search");
                return Ok(blocked);
            }
            RuleGate::Inspect => {
                if rule_blocks(rule, &window)? {
                    debug!(code = %rule.code, checkin = %query.checkin, "window blocked");
                    return Ok(true);
                }
            }
        }
    }

    Ok(false)
}

/// Longest agenda walk: the checkin day plus one full week.
const MAX_WALK_DAYS: u64 = 8;

/// The requested window in absolute time.
struct Window {
    checkin: NaiveDateTime,
    checkout: NaiveDateTime,
    duration: TimeDelta,
    /// Days of the agenda to walk, counting the checkin day.
    days: u64,
}

impl Window {
    fn new(query: &EvaluationQuery) -> Result<Self> {
        let duration = query.duration()?;
        let checkout = query.checkout()?;
        let start_hour = f64::from(query.checkin.num_seconds_from_midnight()) / 3600.0;
        let days = ((start_hour + query.duration_hours) / 24.0).ceil().max(1.0) as u64;
        // Past the first eight days every weekday fragment has already been
        // seen fully covered, and later copies cannot overlap more.
        let days = days.min(MAX_WALK_DAYS);
        Ok(Self {
            checkin: query.checkin,
            checkout,
            duration,
            days,
        })
    }
}

fn rule_blocks(rule: &CompiledRule, window: &Window) -> Result<bool> {
    let limit = max_parking(rule)?;
    let isodow = window.checkin.weekday().number_from_monday();
    let date = window.checkin.date();

    for offset in 0..window.days {
        let schedule = rule.agenda.day(next_weekday(isodow, offset));
        for interval in schedule.intervals() {
            let (start, stop) = anchor(rule, date, offset, interval)?;

            let overlap_start = start.max(window.checkin);
            let overlap_end = stop.min(window.checkout);
            if overlap_start >= overlap_end {
                continue;
            }
            trace!(code = %rule.code, %start, %stop, "window overlaps interval");

            let Some(limit) = limit else {
                return Ok(true);
            };
            if exceeds_limit(window, start, stop, overlap_start, overlap_end, limit) {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Duration-limit policy for a window overlapping `[start, stop)`.
fn exceeds_limit(
    window: &Window,
    start: NaiveDateTime,
    stop: NaiveDateTime,
    overlap_start: NaiveDateTime,
    overlap_end: NaiveDateTime,
    limit: TimeDelta,
) -> bool {
    // Stay runs past the end of the restricted interval.
    if window.checkout > stop && stop - overlap_start > limit {
        return true;
    }
    // Stay begins before the restricted interval.
    if window.checkin < start && overlap_end - start > limit {
        return true;
    }
    // Stay entirely inside the interval.
    window.checkin >= start && window.checkout <= stop && window.duration > limit
}

fn max_parking(rule: &CompiledRule) -> Result<Option<TimeDelta>> {
    let Some(minutes) = rule.time_max_parking else {
        return Ok(None);
    };
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(CurbError::RuleEvaluation {
            code: rule.code.clone(),
            cause: format!("invalid time_max_parking {}", minutes),
        });
    }
    hours_to_delta(minutes / 60.0)
        .map(Some)
        .ok_or_else(|| CurbError::RuleEvaluation {
            code: rule.code.clone(),
            cause: format!("time_max_parking {} is out of range", minutes),
        })
}

/// Anchor an agenda interval to the absolute day `offset` days after `date`.
pub(crate) fn anchor(
    rule: &CompiledRule,
    date: NaiveDate,
    offset: u64,
    interval: &HourInterval,
) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let day = date
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| CurbError::RuleEvaluation {
            code: rule.code.clone(),
            cause: format!("date {} + {} days is out of range", date, offset),
        })?;
    let start = at_hour(rule, day, interval.start)?;
    let stop = at_hour(rule, day, interval.end)?;
    Ok((start, stop))
}

/// `day` at `hour` o'clock, where 24 means the following midnight.
fn at_hour(rule: &CompiledRule, day: NaiveDate, hour: f64) -> Result<NaiveDateTime> {
    let integrity = || CurbError::DataIntegrity {
        code: rule.code.clone(),
    };
    if !hour.is_finite() || !(0.0..=24.0).contains(&hour) {
        return Err(integrity());
    }

    let minutes = (hour * 60.0).round() as u32;
    if minutes == 24 * 60 {
        return day
            .checked_add_days(Days::new(1))
            .and_then(|next| next.and_hms_opt(0, 0, 0))
            .ok_or_else(|| CurbError::RuleEvaluation {
                code: rule.code.clone(),
                cause: format!("day after {} is out of range", day),
            });
    }
    let time = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).ok_or_else(integrity)?;
    Ok(day.and_time(time))
}

/// Convert fractional hours to a [`TimeDelta`] with millisecond precision.
pub(crate) fn hours_to_delta(hours: f64) -> Option<TimeDelta> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}
