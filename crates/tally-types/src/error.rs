use thiserror::Error;

/// Reasons a single holding adjustment cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdjustError {
    #[error("arithmetic overflow while adjusting quantity")]
    Overflow,

    #[error("adjustment would exceed capacity")]
    OverCapacity,

    #[error("adjustment would drive quantity below zero")]
    Negative,
}
