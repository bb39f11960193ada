//! Slot listing: filter blocked slots and annotate the rest with paid status.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::error::Result;
use crate::evaluator::{on_restriction, EvaluationQuery};
use crate::rule::{CompiledRule, RestrictType};

/// A parking location and the regulations posted on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: i64,
    pub rules: Vec<CompiledRule>,
    /// Paid status at the requested checkin, filled by [`annotate`].
    #[serde(default)]
    pub restrict_typ: RestrictType,
}

/// Populate `restrict_typ` with the slot's paid status at `checkin`.
pub fn annotate(mut slot: Slot, checkin: NaiveDateTime) -> Result<Slot> {
    slot.restrict_typ = classify(&slot.rules, checkin)?;
    Ok(slot)
}

/// Keep the slots whose regulations allow `query`, in input order, each
/// annotated with its paid status at checkin.
///
/// # Errors
/// The first evaluation error aborts the listing.
pub fn available_slots(slots: Vec<Slot>, query: &EvaluationQuery) -> Result<Vec<Slot>> {
    let mut available = Vec::with_capacity(slots.len());
    for slot in slots {
        if on_restriction(&slot.rules, query)? {
            continue;
        }
        available.push(annotate(slot, query.checkin)?);
    }
    Ok(available)
}
