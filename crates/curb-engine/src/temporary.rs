//! Temporary restrictions: absolute, non-recurring windows such as snow
//! removal operations announced by the city.
//!
//! The window is compiled into a weekly agenda with the same splitter as
//! posted signs, so it can be appended to a slot's rules and evaluated like
//! any other regulation while it is active.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::compiler::compile_rules;
use crate::error::{CurbError, Result};
use crate::evaluator::EvaluationQuery;
use crate::rule::{CompiledRule, RawRuleRow, RestrictType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryRestriction {
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    pub rule: CompiledRule,
}

impl TemporaryRestriction {
    /// Compile `[start, finish)` into a rule typed [`RestrictType::Other`].
    ///
    /// # Errors
    /// Returns [`CurbError::InvalidQuery`] when `finish` is not after `start`.
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        start: NaiveDateTime,
        finish: NaiveDateTime,
    ) -> Result<Self> {
        if finish <= start {
            return Err(CurbError::InvalidQuery(format!(
                "temporary restriction ends ({}) before it starts ({})",
                finish, start
            )));
        }

        let span = finish - start;
        let mut row = RawRuleRow {
            code: code.into(),
            description: description.into(),
            time_start: Some(f64::from(start.num_seconds_from_midnight()) / 3600.0),
            time_duration: Some(span.num_milliseconds() as f64 / 3_600_000.0),
            restrict_typ: RestrictType::Other,
            ..RawRuleRow::default()
        };
        row.set_weekday(start.weekday().number_from_monday(), true);

        let rule = compile_rules(std::slice::from_ref(&row))?
            .pop()
            .ok_or_else(|| CurbError::DataIntegrity { code: row.code })?;

        Ok(Self {
            start,
            finish,
            rule,
        })
    }

    /// Whether `[start, finish)` overlaps `[window_start, window_end)`.
    pub fn is_active(&self, window_start: NaiveDateTime, window_end: NaiveDateTime) -> bool {
        self.start < window_end && window_start < self.finish
    }
}

/// Rules of the temporary restrictions in effect during the query window,
/// ready to be appended to a slot's posted rules.
pub fn active_rules(
    temporaries: &[TemporaryRestriction],
    query: &EvaluationQuery,
) -> Result<Vec<CompiledRule>> {
    let checkout = query.checkout()?;
    Ok(temporaries
        .iter()
        .filter(|t| t.is_active(query.checkin, checkout))
        .map(|t| t.rule.clone())
        .collect())
}
