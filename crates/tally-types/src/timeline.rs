use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sample of the allocation step function for a (target, resource) pair.
///
/// Timelines are ordered by `issue_time` ascending. The allocation level set
/// by a point holds from that point until the next one (right-continuous).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub issue_time: DateTime<Utc>,
    pub target: String,
    pub resource: String,
    pub name: String,
    /// Allocation level in effect from this point onward.
    pub allocated: i64,
}

impl TimelinePoint {
    pub fn new(
        issue_time: DateTime<Utc>,
        target: impl Into<String>,
        resource: impl Into<String>,
        name: impl Into<String>,
        allocated: i64,
    ) -> Self {
        Self {
            issue_time,
            target: target.into(),
            resource: resource.into(),
            name: name.into(),
            allocated,
        }
    }
}
