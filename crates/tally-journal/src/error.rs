use thiserror::Error;

/// Errors produced by journal operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type JournalResult<T> = Result<T, JournalError>;
