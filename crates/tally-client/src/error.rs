use tally_types::CommissionEntry;
use thiserror::Error;

/// Errors surfaced by the commission coordinator and ledger clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The ledger rejected the commission; the offending provisions are
    /// attached. Not retried.
    #[error("commission rejected: {} provision(s) over quota", .0.len())]
    Rejected(Vec<CommissionEntry>),

    /// Transient: the ledger could not be reached. The serial, if any, stays
    /// journaled for recovery.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger reported a conflicting or unknown outcome for a serial.
    #[error("resolution conflict for serial {0}")]
    Conflict(u64),

    #[error("ledger error: {0}")]
    Ledger(#[from] tally_ledger::LedgerError),

    #[error("journal error: {0}")]
    Journal(String),
}

impl From<tally_journal::JournalError> for CoordinatorError {
    fn from(e: tally_journal::JournalError) -> Self {
        Self::Journal(e.to_string())
    }
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
