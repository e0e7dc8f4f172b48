//! FILENAME: core/crosstab-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrossTabError {
    #[error("Duplicate statistic display name: {0}")]
    DuplicateStatistic(String),

    #[error("Group node has no detail left (already pruned): {0}")]
    MissingDetail(String),

    #[error("Decimal places out of range: {0}")]
    InvalidDigits(f64),

    #[error("Member index {index} is outside the {len} records evaluated")]
    MemberOutOfRange { index: usize, len: usize },
}

/// Returned by a custom format callable that cannot format the value it got.
/// The evaluator turns it into the `"format error"` sentinel.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("format failed: {0}")]
pub struct FormatFailure(pub String);
