use serde::{Deserialize, Serialize};

use crate::error::AdjustError;

/// Quota state for a single [`crate::Holder`].
///
/// All fields are exact signed integers; the ledger never uses floating
/// point. Invariant: `0 <= quantity <= capacity` unless a forced commission
/// overrode it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: i64,
    pub capacity: i64,
    pub import_limit: i64,
    pub export_limit: i64,
}

impl Holding {
    pub fn new(quantity: i64, capacity: i64, import_limit: i64, export_limit: i64) -> Self {
        Self {
            quantity,
            capacity,
            import_limit,
            export_limit,
        }
    }

    /// An empty holding with the given declared limits.
    pub fn with_limits(capacity: i64, import_limit: i64, export_limit: i64) -> Self {
        Self::new(0, capacity, import_limit, export_limit)
    }

    /// Compute the quantity after applying `delta`, enforcing the holding
    /// invariant unless `force` is set. Overflow is always an error.
    pub fn adjusted(&self, delta: i64, force: bool) -> Result<i64, AdjustError> {
        let next = self
            .quantity
            .checked_add(delta)
            .ok_or(AdjustError::Overflow)?;
        if !force {
            if next < 0 {
                return Err(AdjustError::Negative);
            }
            if next > self.capacity {
                return Err(AdjustError::OverCapacity);
            }
        }
        Ok(next)
    }

    /// Whether the invariant currently holds.
    pub fn within_bounds(&self) -> bool {
        0 <= self.quantity && self.quantity <= self.capacity
    }
}
