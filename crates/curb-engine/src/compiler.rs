//! Compile raw regulation rows into weekly agendas.
//!
//! Rows sharing a `code` are merged into a single [`CompiledRule`]. Spans that
//! run past midnight are split into per-weekday fragments up front, so the
//! evaluator can scan one day at a time without re-deriving multi-day spans.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{CurbError, Result};
use crate::rule::{next_weekday, Agenda, CompiledRule, HourInterval, RawRuleRow};
use crate::split::split_time_range;

/// Group rows by `code` and compile each group into a [`CompiledRule`].
///
/// Groups are returned in order of first appearance. Descriptive fields
/// (season, limits, type, permit) are taken from the first row of each group.
///
/// # Errors
/// Returns [`CurbError::DataIntegrity`] when a row's `time_start` lies outside
/// `0..=24`, or when it has neither a duration nor an end time to derive one from.
pub fn compile_rules(rows: &[RawRuleRow]) -> Result<Vec<CompiledRule>> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&RawRuleRow>> = HashMap::new();

    for row in rows {
        let code = row.code.as_str();
        groups
            .entry(code)
            .or_insert_with(|| {
                order.push(code);
                Vec::new()
            })
            .push(row);
    }

    let compiled = order
        .into_iter()
        .map(|code| compile_group(&groups[code]))
        .collect::<Result<Vec<_>>>()?;

    debug!(rows = rows.len(), rules = compiled.len(), "compiled regulation rows");
    Ok(compiled)
}

fn compile_group(rows: &[&RawRuleRow]) -> Result<CompiledRule> {
    let head = rows[0];
    let mut buckets: [Vec<HourInterval>; 7] = Default::default();

    for row in rows {
        if row.daily && row.time_start.is_none() {
            for bucket in buckets.iter_mut() {
                *bucket = vec![HourInterval::all_day()];
            }
            continue;
        }

        let Some(start) = row.time_start else {
            continue;
        };
        if !start.is_finite() || !(0.0..=24.0).contains(&start) {
            return Err(CurbError::DataIntegrity {
                code: row.code.clone(),
            });
        }
        let duration = row.duration_hours().ok_or_else(|| CurbError::DataIntegrity {
            code: row.code.clone(),
        })?;

        let flags = row.weekdays();
        for isodow in 1..=7u32 {
            if row.daily || flags[isodow as usize - 1] {
                place_span(&mut buckets, isodow, start, duration);
            }
        }
    }

    Ok(CompiledRule {
        code: head.code.clone(),
        description: head.description.clone(),
        season_start: head.season_start,
        season_end: head.season_end,
        time_max_parking: head.time_max_parking,
        agenda: Agenda::from_buckets(buckets),
        special_days: head.special_days.clone(),
        restrict_typ: head.restrict_typ,
        permit_no: head.permit_no.clone(),
        metered: head.metered,
    })
}

/// Fold a span starting on `isodow` at `start` hours into the weekday buckets.
fn place_span(buckets: &mut [Vec<HourInterval>; 7], isodow: u32, start: f64, duration: f64) {
    let split = split_time_range(start, duration);
    let bucket = |day: u32| (day - 1) as usize;

    if split.first_day_hours > 0.0 {
        buckets[bucket(isodow)].push(HourInterval::new(start, start + split.first_day_hours));
    }
    for offset in 1..=u64::from(split.whole_days) {
        buckets[bucket(next_weekday(isodow, offset))].push(HourInterval::all_day());
    }
    if split.last_day_hours > 0.0 {
        let last = next_weekday(isodow, u64::from(split.whole_days) + 1);
        buckets[bucket(last)].push(HourInterval::new(0.0, split.last_day_hours));
    }
}
