//! Error types for curb-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurbError {
    /// An agenda interval could not be turned into a valid time of day.
    #[error("Data integrity error on {code}, please review rules")]
    DataIntegrity { code: String },

    /// Any other failure while anchoring or comparing interval times.
    #[error("Evaluation error on {code}: {cause}")]
    RuleEvaluation { code: String, cause: String },

    /// A stored agenda lacks one of the seven ISO weekdays.
    #[error("Agenda is missing weekday {0}")]
    MissingWeekday(u32),

    #[error("Invalid season date: {0}")]
    InvalidSeason(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, CurbError>;
