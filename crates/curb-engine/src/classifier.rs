//! Classify a slot's paid status at a given moment.

use chrono::{Datelike, NaiveDateTime};
use tracing::debug;

use crate::error::Result;
use crate::evaluator::anchor;
use crate::rule::{CompiledRule, RestrictType};

/// Returns [`RestrictType::Paid`] when `checkin` falls strictly inside an
/// in-season interval of a paid or metered rule, [`RestrictType::None`] otherwise.
///
/// Only the checkin's own weekday is scanned: an interval anchored on a later
/// day cannot start before `checkin`.
///
/// # Errors
/// Propagates [`crate::CurbError::DataIntegrity`] and
/// [`crate::CurbError::RuleEvaluation`] from interval anchoring.
pub fn classify(rules: &[CompiledRule], checkin: NaiveDateTime) -> Result<RestrictType> {
    let date = checkin.date();
    let isodow = checkin.weekday().number_from_monday();

    for rule in rules.iter().filter(|r| r.is_paid()) {
        if !rule.in_season(date) {
            continue;
        }
        for interval in rule.agenda.day(isodow).intervals() {
            let (start, stop) = anchor(rule, date, 0, interval)?;
            if start < checkin && checkin < stop {
                debug!(code = %rule.code, %checkin, "slot is paid");
                return Ok(RestrictType::Paid);
            }
        }
    }

    Ok(RestrictType::None)
}
