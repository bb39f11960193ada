//! Regulation records: raw sign rows as stored, and compiled weekly rules.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CurbError;
use crate::season::{self, SeasonDate};

/// Kind of restriction a regulation imposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RestrictType {
    #[default]
    None,
    Paid,
    Angled,
    Permit,
    Other,
}

impl From<Option<String>> for RestrictType {
    fn from(s: Option<String>) -> Self {
        match s.as_deref().map(str::trim) {
            None | Some("") | Some("none") => RestrictType::None,
            Some("paid") => RestrictType::Paid,
            Some("angled") => RestrictType::Angled,
            Some("permit") => RestrictType::Permit,
            Some(_) => RestrictType::Other,
        }
    }
}

impl From<RestrictType> for Option<String> {
    fn from(t: RestrictType) -> Self {
        let s = match t {
            RestrictType::None => return None,
            RestrictType::Paid => "paid",
            RestrictType::Angled => "angled",
            RestrictType::Permit => "permit",
            RestrictType::Other => "other",
        };
        Some(s.to_string())
    }
}

/// A half-open range of hours `[start, end)` within a single day, `0..=24`.
///
/// Serialized as a two-element array, e.g. `[9.5, 10.5]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct HourInterval {
    pub start: f64,
    pub end: f64,
}

impl HourInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn all_day() -> Self {
        Self::new(0.0, 24.0)
    }
}

impl From<[f64; 2]> for HourInterval {
    fn from([start, end]: [f64; 2]) -> Self {
        Self { start, end }
    }
}

impl From<HourInterval> for [f64; 2] {
    fn from(i: HourInterval) -> Self {
        [i.start, i.end]
    }
}

/// Restrictions posted for one weekday.
#[derive(Debug, Clone, PartialEq)]
pub enum DaySchedule {
    /// Nothing posted for this weekday. Distinct from an all-day restriction.
    Unrestricted,
    Restricted(Vec<HourInterval>),
}

impl DaySchedule {
    /// Intervals in effect, empty when unrestricted.
    pub fn intervals(&self) -> &[HourInterval] {
        match self {
            DaySchedule::Unrestricted => &[],
            DaySchedule::Restricted(intervals) => intervals,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, DaySchedule::Unrestricted)
    }
}

/// ISO weekday reached `offset` days after `isodow` (1 = Monday .. 7 = Sunday).
pub fn next_weekday(isodow: u32, offset: u64) -> u32 {
    ((u64::from(isodow) + 6 + offset) % 7) as u32 + 1
}

type WireAgenda = BTreeMap<String, Vec<Option<HourInterval>>>;

/// Weekly schedule of a compiled rule: one [`DaySchedule`] per ISO weekday.
///
/// On the wire this is an object keyed `"1"` (Monday) to `"7"` (Sunday), each
/// holding a list of `[start, end]` pairs. An unrestricted day is `[null]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireAgenda", into = "WireAgenda")]
pub struct Agenda {
    days: [DaySchedule; 7],
}

impl Agenda {
    /// An agenda with no restriction on any weekday.
    pub fn unrestricted() -> Self {
        Self {
            days: std::array::from_fn(|_| DaySchedule::Unrestricted),
        }
    }

    /// Build an agenda from per-weekday buckets, Monday first.
    /// Empty buckets become [`DaySchedule::Unrestricted`].
    pub fn from_buckets(buckets: [Vec<HourInterval>; 7]) -> Self {
        Self {
            days: buckets.map(|intervals| {
                if intervals.is_empty() {
                    DaySchedule::Unrestricted
                } else {
                    DaySchedule::Restricted(intervals)
                }
            }),
        }
    }

    /// Schedule for an ISO weekday. Values past 7 wrap around the week.
    pub fn day(&self, isodow: u32) -> &DaySchedule {
        &self.days[((isodow + 6) % 7) as usize]
    }

    /// `(isodow, schedule)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &DaySchedule)> {
        self.days.iter().enumerate().map(|(i, d)| (i as u32 + 1, d))
    }
}

impl Default for Agenda {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl TryFrom<WireAgenda> for Agenda {
    type Error = CurbError;

    fn try_from(mut wire: WireAgenda) -> Result<Self, Self::Error> {
        let mut buckets: [Vec<HourInterval>; 7] = Default::default();
        for (idx, bucket) in buckets.iter_mut().enumerate() {
            let key = (idx + 1).to_string();
            let entries = wire
                .remove(&key)
                .ok_or(CurbError::MissingWeekday(idx as u32 + 1))?;
            bucket.extend(entries.into_iter().flatten());
        }
        Ok(Self::from_buckets(buckets))
    }
}

impl From<Agenda> for WireAgenda {
    fn from(agenda: Agenda) -> Self {
        agenda
            .days
            .into_iter()
            .enumerate()
            .map(|(idx, day)| {
                let entries = match day {
                    DaySchedule::Unrestricted => vec![None],
                    DaySchedule::Restricted(intervals) => {
                        intervals.into_iter().map(Some).collect()
                    }
                };
                ((idx + 1).to_string(), entries)
            })
            .collect()
    }
}

/// One regulation-sign record as stored, before compilation.
///
/// Several rows may share a `code` when a sign posts different hours on
/// different weekdays.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRuleRow {
    pub code: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default)]
    pub season_start: Option<SeasonDate>,
    #[serde(default)]
    pub season_end: Option<SeasonDate>,
    /// Maximum continuous parking in minutes. `None` means unlimited.
    #[serde(default)]
    pub time_max_parking: Option<f64>,
    #[serde(default)]
    pub time_start: Option<f64>,
    #[serde(default)]
    pub time_end: Option<f64>,
    #[serde(default)]
    pub time_duration: Option<f64>,
    #[serde(default, alias = "lun", deserialize_with = "flag")]
    pub monday: bool,
    #[serde(default, alias = "mar", deserialize_with = "flag")]
    pub tuesday: bool,
    #[serde(default, alias = "mer", deserialize_with = "flag")]
    pub wednesday: bool,
    #[serde(default, alias = "jeu", deserialize_with = "flag")]
    pub thursday: bool,
    #[serde(default, alias = "ven", deserialize_with = "flag")]
    pub friday: bool,
    #[serde(default, alias = "sam", deserialize_with = "flag")]
    pub saturday: bool,
    #[serde(default, alias = "dim", deserialize_with = "flag")]
    pub sunday: bool,
    #[serde(default, deserialize_with = "flag")]
    pub daily: bool,
    #[serde(default)]
    pub special_days: Option<String>,
    #[serde(default)]
    pub restrict_typ: RestrictType,
    #[serde(default, deserialize_with = "permit_number")]
    pub permit_no: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub metered: bool,
}

impl RawRuleRow {
    /// Weekday flags, Monday first.
    pub fn weekdays(&self) -> [bool; 7] {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
            self.sunday,
        ]
    }

    /// Set the flag for an ISO weekday (1 = Monday).
    pub fn set_weekday(&mut self, isodow: u32, value: bool) {
        match next_weekday(isodow, 0) {
            1 => self.monday = value,
            2 => self.tuesday = value,
            3 => self.wednesday = value,
            4 => self.thursday = value,
            5 => self.friday = value,
            6 => self.saturday = value,
            _ => self.sunday = value,
        }
    }

    /// Duration in hours, falling back to `time_end - time_start` (crossing
    /// midnight when the end is not after the start).
    pub fn duration_hours(&self) -> Option<f64> {
        if let Some(duration) = self.time_duration {
            return Some(duration);
        }
        let (start, end) = (self.time_start?, self.time_end?);
        Some(if end > start { end - start } else { end + 24.0 - start })
    }
}

/// A regulation code with all of its rows merged into one weekly agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRule {
    pub code: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default)]
    pub season_start: Option<SeasonDate>,
    #[serde(default)]
    pub season_end: Option<SeasonDate>,
    /// Maximum continuous parking in minutes. `None` means unlimited.
    #[serde(default)]
    pub time_max_parking: Option<f64>,
    pub agenda: Agenda,
    #[serde(default)]
    pub special_days: Option<String>,
    #[serde(default)]
    pub restrict_typ: RestrictType,
    #[serde(default, deserialize_with = "permit_number")]
    pub permit_no: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub metered: bool,
}

impl CompiledRule {
    /// Whether the rule's season window covers `date`.
    pub fn in_season(&self, date: NaiveDate) -> bool {
        season::in_season(self.season_start, self.season_end, date)
    }

    /// Paid-parking rule, either typed `paid` or flagged as metered.
    pub fn is_paid(&self) -> bool {
        self.metered || self.restrict_typ == RestrictType::Paid
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseFlag {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Weekday and daily flags come as booleans, `1`/`1.0`, or null in store exports.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LooseFlag>::deserialize(deserializer)? {
        None => false,
        Some(LooseFlag::Bool(b)) => b,
        Some(LooseFlag::Number(n)) => n != 0.0,
        Some(LooseFlag::Text(s)) => matches!(s.trim(), "1" | "true" | "t" | "yes"),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LoosePermit {
    Integer(i64),
    Text(String),
}

/// Permit numbers are compared as text, whatever type the store used.
fn permit_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<LoosePermit>::deserialize(deserializer)?.map(|p| match p {
            LoosePermit::Integer(n) => n.to_string(),
            LoosePermit::Text(s) => s,
        }),
    )
}
