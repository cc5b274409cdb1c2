//! Durable pending-serial journal for Tally.
//!
//! Every commission serial a coordinator issues is recorded here before the
//! caller trusts it, and cleared only after the ledger confirms the serial is
//! terminal. Losing this journal is the only way a commission can be left
//! permanently unresolved, so appends are fsynced by default.

pub mod error;
pub mod log;

pub use error::{JournalError, JournalResult};
pub use log::{JournalConfig, PendingSerialLog, SyncMode};
