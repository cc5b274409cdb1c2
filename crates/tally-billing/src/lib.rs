//! Time-weighted usage computation for Tally.
//!
//! Treats an allocation timeline as a right-continuous step function and
//! integrates it over a billing window with exact integer arithmetic.
//! Averages are rational values, never floats, so results are reproducible
//! across platforms.

pub mod biller;
pub mod error;
pub mod ratio;

pub use biller::{compute_usage, UsageRecord};
pub use error::{BillingError, BillingResult};
pub use ratio::Ratio;
