use thiserror::Error;

/// Errors produced by usage computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("billing window end precedes start")]
    InvalidWindow,

    #[error("timeline points out of order at index {0}")]
    UnorderedTimeline(usize),

    #[error("arithmetic overflow while integrating usage")]
    Overflow,
}

pub type BillingResult<T> = Result<T, BillingError>;
