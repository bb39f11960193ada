//! # curb-engine
//!
//! Deterministic compilation and evaluation of curbside parking regulations.
//!
//! Posted signs are stored as one row per weekday group. The engine merges the
//! rows of a regulation code into a weekly agenda, then answers two questions
//! for a slot: is a requested stay `[checkin, checkin + duration)` allowed, and
//! is the slot paid right now. Every function is pure; callers own all inputs.
//!
//! ## Modules
//!
//! - [`split`] — hour offset + duration → first day, whole days, last day
//! - [`season`] — yearly season windows, including year wraparound
//! - [`rule`] — raw sign rows, compiled rules and their JSON form
//! - [`compiler`] — raw rows → weekly agendas
//! - [`evaluator`] — does a requested window collide with a slot's rules
//! - [`classifier`] — paid status of a slot at a point in time
//! - [`slots`] — filter and annotate slot listings
//! - [`temporary`] — absolute restriction windows (snow removal)
//! - [`error`] — Error types

pub mod classifier;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod rule;
pub mod season;
pub mod slots;
pub mod split;
pub mod temporary;

pub use classifier::classify;
pub use compiler::compile_rules;
pub use error::CurbError;
pub use evaluator::{on_restriction, parse_checkin, EvaluationQuery, Permit};
pub use rule::{Agenda, CompiledRule, DaySchedule, HourInterval, RawRuleRow, RestrictType};
pub use season::{season_matches, SeasonDate};
pub use slots::{available_slots, Slot};
pub use split::{split_time_range, DaySplit};
pub use temporary::TemporaryRestriction;
