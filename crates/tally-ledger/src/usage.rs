use serde::{Deserialize, Serialize};

/// Per-resource usage snapshot for one entity.
///
/// `usage` is the committed quantity; `pending` is the net delta of
/// commissions still provisional against the entity's holdings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub usage: i64,
    pub pending: i64,
}
