use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::holder::Holder;

/// One provision line of a commission: adjust `holder` by `quantity`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionEntry {
    pub holder: Holder,
    pub quantity: i64,
}

impl CommissionEntry {
    pub fn new(holder: Holder, quantity: i64) -> Self {
        Self { holder, quantity }
    }
}

/// Lifecycle of a commission. Once terminal, a commission never changes
/// state again; re-resolving with the same outcome is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissionStatus {
    Provisional,
    Accepted,
    Rejected,
}

impl CommissionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Provisional)
    }
}

/// Caller-facing knobs for issuing a commission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionOptions {
    /// Permit the commission to exceed declared capacity.
    pub force: bool,
    /// Finalize immediately at issue time; no separate resolve step.
    pub auto_accept: bool,
    /// Free-form label recorded with the commission.
    pub name: String,
}

/// A provisional, serial-numbered change to one or more holdings.
///
/// `sub` entries claw back a previous provisional allocation (quantity is
/// decremented by the listed amount); `add` entries allocate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub serial: u64,
    pub name: String,
    pub force: bool,
    pub auto_accept: bool,
    pub sub: Vec<CommissionEntry>,
    pub add: Vec<CommissionEntry>,
    pub issued_at: DateTime<Utc>,
    pub status: CommissionStatus,
}

/// Outcome of a batch resolve call.
///
/// A serial present in both the accept and reject inputs, unknown to the
/// ledger, or already terminal with a different outcome lands in `failed`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub accepted: Vec<u64>,
    pub rejected: Vec<u64>,
    pub failed: Vec<u64>,
}

/// Journal entry for a serial that was issued but not yet confirmed terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSerialRecord {
    pub serial: u64,
    pub issued_at: DateTime<Utc>,
}
