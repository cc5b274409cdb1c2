//! Foundation types for the Tally resource-accounting ledger.
//!
//! This crate provides the core quota and commissioning types used throughout
//! the Tally system. Every other Tally crate depends on `tally-types`.
//!
//! # Key Types
//!
//! - [`Holder`] — Accountable entity+resource+key triple
//! - [`Holding`] — Quota state (quantity, capacity, import/export limits)
//! - [`Commission`] — Provisional, serial-numbered change to one or more holdings
//! - [`Resolution`] — Outcome of a batch accept/reject call
//! - [`TimelinePoint`] — Allocation-level sample for time-weighted billing

pub mod commission;
pub mod error;
pub mod holder;
pub mod holding;
pub mod timeline;

pub use commission::{
    Commission, CommissionEntry, CommissionOptions, CommissionStatus, PendingSerialRecord,
    Resolution,
};
pub use error::AdjustError;
pub use holder::{Holder, DEFAULT_KEY};
pub use holding::Holding;
pub use timeline::TimelinePoint;
