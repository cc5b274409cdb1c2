//! Quota ledger for Tally.
//!
//! This crate is the heart of the accounting core. It provides:
//! - `QuotaReader` / `QuotaWriter` trait boundaries
//! - `InMemoryQuotaLedger` implementation for tests and embedding
//! - `SerialAllocator` issuing strictly increasing commission serials
//! - Two-phase commission semantics: provisional apply, then accept/reject
//!
//! All quantities are exact signed integers; arithmetic is checked and
//! overflow is treated as a rejection, never wraparound.

pub mod error;
pub mod memory;
pub mod serial;
pub mod traits;
pub mod usage;

pub use error::LedgerError;
pub use memory::InMemoryQuotaLedger;
pub use serial::SerialAllocator;
pub use traits::{QuotaReader, QuotaWriter};
pub use usage::ResourceUsage;
