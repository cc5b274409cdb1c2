//! Commission coordination for Tally clients.
//!
//! Every resource-mutating service goes through a [`CommissionCoordinator`]:
//! reserve a commission against the quota ledger, perform the local side
//! effect, then resolve the serial accept or reject. Issued serials are
//! journaled durably before the caller trusts them, and [`recover`] replays
//! the journal after a crash so no serial is left permanently unresolved.
//!
//! [`recover`]: CommissionCoordinator::recover

pub mod client;
pub mod coordinator;
pub mod error;

pub use client::{InProcessClient, LedgerClient};
pub use coordinator::{CommissionCoordinator, CoordinatorConfig, RecoveryReport};
pub use error::{CoordinatorError, CoordinatorResult};
