use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tally_types::TimelinePoint;

use crate::error::{BillingError, BillingResult};
use crate::ratio::Ratio;

/// One usage line produced by [`compute_usage`].
///
/// The aggregate record carries `name == "total"`; detail records carry the
/// name of the point whose allocation level was integrated over the
/// interval ending at `end_time`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub target: String,
    pub name: String,
    pub resource: String,
    pub end_time: DateTime<Utc>,
    /// Allocation level for detail records; `total / elapsed_seconds` for
    /// the aggregate. Exact, never floating.
    pub average: Ratio,
    /// Unit-seconds consumed over the interval (or the whole window).
    pub total: i128,
}

/// Integrate an allocation timeline over the window `(after, before]`.
///
/// The timeline is a right-continuous step function: between consecutive
/// points `(t0, u0)` and `(t1, u1)` the contribution is `u0 * (t1 - t0)`
/// seconds-weighted — the value held during the interval, not the new one.
/// Points at or before `after` only establish the carried starting level;
/// if there is none, the level before the first in-window point is zero.
/// A synthetic trailing point at `before` closes the last open interval.
///
/// Returns the aggregate record, preceded by one record per consumed
/// interval when `details` is set. An empty timeline yields an empty result.
pub fn compute_usage(
    timeline: &[TimelinePoint],
    after: DateTime<Utc>,
    before: DateTime<Utc>,
    details: bool,
) -> BillingResult<Vec<UsageRecord>> {
    if before < after {
        return Err(BillingError::InvalidWindow);
    }
    if timeline.is_empty() {
        return Ok(Vec::new());
    }
    for (index, pair) in timeline.windows(2).enumerate() {
        if pair[1].issue_time < pair[0].issue_time {
            return Err(BillingError::UnorderedTimeline(index + 1));
        }
    }

    let target = timeline[0].target.clone();
    let resource = timeline[0].resource.clone();

    let mut records = Vec::new();
    let mut total: i128 = 0;
    let mut cursor = after;
    // Allocation level in effect at `cursor`, and the point that set it.
    let mut level: Option<(i64, String)> = None;
    let mut last_issue_time: Option<DateTime<Utc>> = None;

    for point in timeline {
        if point.issue_time <= after {
            level = Some((point.allocated, point.name.clone()));
            last_issue_time = Some(point.issue_time);
            continue;
        }
        if point.issue_time > before {
            break;
        }

        let contribution = integrate(&level, cursor, point.issue_time)?;
        if details && point.issue_time > cursor {
            records.push(interval_record(
                &target,
                &resource,
                &level,
                point.issue_time,
                contribution,
            ));
        }
        total = total
            .checked_add(contribution)
            .ok_or(BillingError::Overflow)?;
        cursor = point.issue_time;
        level = Some((point.allocated, point.name.clone()));
        last_issue_time = Some(point.issue_time);
    }

    // Synthetic trailing point closes the last open interval.
    if cursor < before {
        let contribution = integrate(&level, cursor, before)?;
        if details {
            records.push(interval_record(
                &target, &resource, &level, before, contribution,
            ));
        }
        total = total
            .checked_add(contribution)
            .ok_or(BillingError::Overflow)?;
    }

    let elapsed = (before - after).num_seconds() as i128;
    records.push(UsageRecord {
        target,
        name: "total".into(),
        resource,
        end_time: last_issue_time.unwrap_or(after),
        average: Ratio::new(total, elapsed),
        total,
    });
    debug!(total, elapsed, "usage computed");
    Ok(records)
}

fn integrate(
    level: &Option<(i64, String)>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> BillingResult<i128> {
    let value = level.as_ref().map(|(v, _)| *v).unwrap_or(0) as i128;
    let seconds = (to - from).num_seconds() as i128;
    value.checked_mul(seconds).ok_or(BillingError::Overflow)
}

fn interval_record(
    target: &str,
    resource: &str,
    level: &Option<(i64, String)>,
    end_time: DateTime<Utc>,
    contribution: i128,
) -> UsageRecord {
    let (value, name) = match level {
        Some((v, n)) => (*v, n.clone()),
        None => (0, String::new()),
    };
    UsageRecord {
        target: target.to_string(),
        name,
        resource: resource.to_string(),
        end_time,
        average: Ratio::from_integer(value as i128),
        total: contribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn point(seconds: i64, allocated: i64, name: &str) -> TimelinePoint {
        TimelinePoint::new(t(seconds), "user-1", "diskspace", name, allocated)
    }

    fn total_of(records: &[UsageRecord]) -> i128 {
        records.last().unwrap().total
    }

    #[test]
    fn empty_timeline_is_empty_result() {
        let records = compute_usage(&[], t(0), t(100), true).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn value_held_during_interval_is_integrated() {
        // Level is 0 until the point at t=10 sets it to 5.
        let timeline = vec![point(10, 5, "alloc")];
        let records = compute_usage(&timeline, t(0), t(100), false).unwrap();
        assert_eq!(records.len(), 1);

        let aggregate = &records[0];
        assert_eq!(aggregate.name, "total");
        assert_eq!(aggregate.total, 5 * 90);
        assert_eq!(aggregate.average, Ratio::new(450, 100));
        assert_eq!(aggregate.end_time, t(10));
    }

    #[test]
    fn points_before_window_establish_carried_level() {
        let timeline = vec![point(-50, 4, "old"), point(200, 9, "late")];
        let records = compute_usage(&timeline, t(0), t(100), false).unwrap();
        // Level 4 carried over the whole window; the late point is ignored.
        assert_eq!(total_of(&records), 4 * 100);
    }

    #[test]
    fn point_exactly_at_window_start_only_sets_level() {
        let timeline = vec![point(0, 7, "at-start")];
        let records = compute_usage(&timeline, t(0), t(10), false).unwrap();
        assert_eq!(total_of(&records), 7 * 10);
        assert_eq!(records[0].end_time, t(0));
    }

    #[test]
    fn details_emit_one_record_per_interval() {
        let timeline = vec![point(10, 5, "grow"), point(40, 2, "shrink")];
        let records = compute_usage(&timeline, t(0), t(100), true).unwrap();

        // Intervals: (0,10] at level 0, (10,40] at 5, (40,100] at 2, then total.
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].name, "");
        assert_eq!(records[0].total, 0);
        assert_eq!(records[1].name, "grow");
        assert_eq!(records[1].total, 5 * 30);
        assert_eq!(records[1].end_time, t(40));
        assert_eq!(records[2].name, "shrink");
        assert_eq!(records[2].total, 2 * 60);
        assert_eq!(records[2].end_time, t(100));
        assert_eq!(records[3].name, "total");
        assert_eq!(records[3].total, 150 + 120);
    }

    #[test]
    fn point_at_window_end_closes_final_interval() {
        let timeline = vec![point(0, 3, "start"), point(100, 8, "end")];
        let records = compute_usage(&timeline, t(0), t(100), false).unwrap();
        // The level 8 never accrues: it starts exactly at `before`.
        assert_eq!(total_of(&records), 3 * 100);
        assert_eq!(records[0].end_time, t(100));
    }

    #[test]
    fn zero_length_window_has_zero_usage() {
        let timeline = vec![point(-5, 6, "old")];
        let records = compute_usage(&timeline, t(0), t(0), false).unwrap();
        assert_eq!(total_of(&records), 0);
        assert_eq!(records[0].average, Ratio::zero());
    }

    #[test]
    fn inverted_window_is_an_error() {
        let timeline = vec![point(0, 1, "p")];
        let error = compute_usage(&timeline, t(10), t(0), false).unwrap_err();
        assert_eq!(error, BillingError::InvalidWindow);
    }

    #[test]
    fn unordered_timeline_is_an_error() {
        let timeline = vec![point(10, 1, "a"), point(5, 2, "b")];
        let error = compute_usage(&timeline, t(0), t(100), false).unwrap_err();
        assert_eq!(error, BillingError::UnorderedTimeline(1));
    }

    #[test]
    fn extreme_levels_stay_exact() {
        let timeline = vec![point(-1, i64::MAX, "huge")];
        let before = t(i32::MAX as i64);
        let records = compute_usage(&timeline, t(0), before, false).unwrap();
        assert_eq!(total_of(&records), i64::MAX as i128 * i32::MAX as i128);
    }

    #[test]
    fn usage_is_additive_across_adjacent_windows() {
        let timeline = vec![point(10, 5, "a"), point(30, 2, "b"), point(70, 9, "c")];
        let whole = total_of(&compute_usage(&timeline, t(0), t(100), false).unwrap());
        let first = total_of(&compute_usage(&timeline, t(0), t(50), false).unwrap());
        let second = total_of(&compute_usage(&timeline, t(50), t(100), false).unwrap());
        assert_eq!(whole, first + second);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_timeline() -> impl Strategy<Value = Vec<TimelinePoint>> {
            prop::collection::vec((0i64..1000, -100i64..1000), 1..12).prop_map(|mut raw| {
                raw.sort_by_key(|(at, _)| *at);
                raw.into_iter()
                    .enumerate()
                    .map(|(i, (at, level))| point(at, level, &format!("p{i}")))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn additivity_over_any_split(
                timeline in arb_timeline(),
                split in 0i64..1000,
            ) {
                let whole =
                    total_of(&compute_usage(&timeline, t(0), t(1000), false).unwrap());
                let first =
                    total_of(&compute_usage(&timeline, t(0), t(split), false).unwrap());
                let second =
                    total_of(&compute_usage(&timeline, t(split), t(1000), false).unwrap());
                prop_assert_eq!(whole, first + second);
            }

            #[test]
            fn detail_totals_sum_to_aggregate(timeline in arb_timeline()) {
                let records = compute_usage(&timeline, t(0), t(1000), true).unwrap();
                let (aggregate, intervals) = records.split_last().unwrap();
                let sum: i128 = intervals.iter().map(|r| r.total).sum();
                prop_assert_eq!(aggregate.total, sum);
            }
        }
    }
}
