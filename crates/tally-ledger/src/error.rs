use tally_types::CommissionEntry;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("entity {0} already exists with a different owner or key")]
    EntityExists(String),

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("unknown holder: {0}")]
    UnknownHolder(String),

    #[error("invalid limits: capacity={capacity}, import={import_limit}, export={export_limit}")]
    InvalidLimits {
        capacity: i64,
        import_limit: i64,
        export_limit: i64,
    },

    #[error("commission rejected: {} provision(s) violate holding bounds", .0.len())]
    Rejected(Vec<CommissionEntry>),

    #[error("serial {0} already in use")]
    SerialInUse(u64),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

pub type LedgerResult<T> = Result<T, LedgerError>;
