use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::calendar;
use crate::config::RolloutConfig;
use crate::models::{Event, EventStatus, MetricsSnapshot};

/// Returns `(completed, scheduled)`. Excluded events count toward neither.
pub fn count_by_status(events: &[Event]) -> (u32, u32) {
    events
        .iter()
        .fold((0, 0), |(completed, scheduled), event| match event.status {
            EventStatus::Done => (completed + 1, scheduled),
            EventStatus::Scheduled => (completed, scheduled + 1),
            EventStatus::Excluded => (completed, scheduled),
        })
}

/// Work not yet represented in the table. Never negative.
pub fn pending(completed: u32, scheduled: u32, target_total: u32) -> u32 {
    target_total.saturating_sub(completed.saturating_add(scheduled))
}

/// Calendar days since the rollout started, floored at 1.
pub fn elapsed_days(start: NaiveDate, reference: NaiveDate) -> i64 {
    (reference - start).num_days().max(1)
}

/// Business days in `[reference, end)`. Signed: callers decide how to treat
/// a reference date already past the end.
pub fn business_days_remaining(reference: NaiveDate, end: NaiveDate) -> i64 {
    calendar::business_days_between(reference, end)
}

/// Completed upgrades per calendar day.
pub fn current_pace(completed: u32, elapsed_days: i64) -> f64 {
    f64::from(completed) / elapsed_days.max(1) as f64
}

/// Upgrades per business day needed to clear `pending` in time.
///
/// With no runway left (`remaining_business_days <= 0`) the value is 0 by
/// convention; there is no pace that could still meet the deadline.
pub fn required_pace(pending: u32, remaining_business_days: i64) -> f64 {
    if remaining_business_days > 0 {
        f64::from(pending) / remaining_business_days as f64
    } else {
        0.0
    }
}

pub fn projected_total(completed: u32, current_pace: f64, remaining_business_days: i64) -> f64 {
    f64::from(completed) + current_pace * remaining_business_days as f64
}

/// Pace over each look-back window: DONE events dated on or after
/// `reference - window`, divided by the window length. A zero-length window
/// yields 0.
pub fn trailing_pace(
    events: &[Event],
    windows: &[u32],
    reference: NaiveDate,
) -> BTreeMap<u32, f64> {
    windows
        .iter()
        .map(|&window| {
            if window == 0 {
                return (window, 0.0);
            }
            let cutoff = reference - Duration::days(i64::from(window));
            let done = events
                .iter()
                .filter(|event| event.status == EventStatus::Done && event.date >= cutoff)
                .count();
            (window, done as f64 / f64::from(window))
        })
        .collect()
}

pub fn compute_snapshot(events: &[Event], config: &RolloutConfig) -> MetricsSnapshot {
    let (completed, scheduled) = count_by_status(events);
    let pending_count = pending(completed, scheduled, config.target_total);
    let elapsed = elapsed_days(config.rollout_start, config.reference_date);
    let remaining = business_days_remaining(config.reference_date, config.support_end);
    let runway = remaining.max(0);

    let pace = current_pace(completed, elapsed);
    let required = required_pace(pending_count, runway);

    debug!(
        completed,
        scheduled,
        pending = pending_count,
        elapsed,
        remaining,
        "computed rollout metrics"
    );

    MetricsSnapshot {
        completed_count: completed,
        scheduled_count: scheduled,
        pending_count,
        elapsed_calendar_days: elapsed,
        remaining_business_days: remaining,
        current_pace: pace,
        required_pace: required,
        pace_delta: pace - required,
        projected_total_at_current_pace: projected_total(completed, pace, runway),
        trailing_paces: trailing_pace(events, &config.trailing_windows, config.reference_date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn events_on(reference: NaiveDate, days_ago: &[i64], status: EventStatus) -> Vec<Event> {
        days_ago
            .iter()
            .map(|days| Event::new(reference - Duration::days(*days), status))
            .collect()
    }

    fn repeat(count: usize, status: EventStatus) -> Vec<Event> {
        vec![Event::new(date(2025, 7, 10), status); count]
    }

    #[test]
    fn counts_ignore_excluded_events() {
        let mut events = repeat(3, EventStatus::Done);
        events.extend(repeat(2, EventStatus::Scheduled));
        events.extend(repeat(4, EventStatus::Excluded));

        let (completed, scheduled) = count_by_status(&events);
        assert_eq!((completed, scheduled), (3, 2));
        assert!((completed + scheduled) as usize <= events.len());
    }

    #[test]
    fn pending_for_default_target() {
        assert_eq!(pending(100, 50, 346), 196);
    }

    #[test]
    fn pending_never_goes_negative() {
        assert_eq!(pending(300, 100, 346), 0);
        assert_eq!(pending(u32::MAX, u32::MAX, 10), 0);
        assert_eq!(pending(0, 0, 0), 0);
    }

    #[test]
    fn elapsed_days_is_floored_at_one() {
        let start = date(2025, 7, 7);
        assert_eq!(elapsed_days(start, start), 1);
        assert_eq!(elapsed_days(start, date(2025, 7, 1)), 1);
        assert_eq!(elapsed_days(start, date(2025, 7, 17)), 10);
    }

    #[test]
    fn pace_on_first_day_equals_completed_count() {
        let start = date(2025, 7, 7);
        let elapsed = elapsed_days(start, start);
        assert_eq!(current_pace(12, elapsed), 12.0);
    }

    #[test]
    fn pace_is_zero_without_completions() {
        for elapsed in [1, 2, 30, 365] {
            assert_eq!(current_pace(0, elapsed), 0.0);
        }
    }

    #[test]
    fn required_pace_is_zero_without_runway() {
        assert_eq!(required_pace(50, 0), 0.0);
        assert_eq!(required_pace(50, -3), 0.0);
        assert_eq!(required_pace(50, 10), 5.0);
    }

    #[test]
    fn projected_total_extends_current_pace() {
        assert_eq!(projected_total(40, 2.5, 10), 65.0);
        assert_eq!(projected_total(40, 0.0, 10), 40.0);
    }

    #[test]
    fn remaining_days_over_a_week_is_five() {
        assert_eq!(
            business_days_remaining(date(2025, 7, 9), date(2025, 7, 16)),
            5
        );
        assert_eq!(
            business_days_remaining(date(2025, 10, 20), date(2025, 10, 14)),
            -4
        );
    }

    #[test]
    fn trailing_windows_are_independent() {
        let reference = date(2025, 8, 29);
        let mut events = events_on(reference, &[0, 3, 7, 10, 14, 20, 30], EventStatus::Done);
        events.extend(events_on(reference, &[1, 2], EventStatus::Scheduled));

        let paces = trailing_pace(&events, &[7, 14, 21], reference);
        assert_eq!(paces.len(), 3);
        assert!((paces[&7] - 3.0 / 7.0).abs() < 1e-9);
        assert!((paces[&14] - 5.0 / 14.0).abs() < 1e-9);
        assert!((paces[&21] - 6.0 / 21.0).abs() < 1e-9);
    }

    #[test]
    fn zero_length_window_yields_zero() {
        let reference = date(2025, 8, 29);
        let events = events_on(reference, &[0], EventStatus::Done);
        assert_eq!(trailing_pace(&events, &[0], reference)[&0], 0.0);
    }

    #[test]
    fn snapshot_combines_all_metrics() {
        let mut config = RolloutConfig::with_defaults(date(2025, 10, 6));
        config.trailing_windows = vec![7];

        let mut events = events_on(config.reference_date, &[1, 2, 3], EventStatus::Done);
        events.extend(repeat(97, EventStatus::Done));
        events.extend(repeat(50, EventStatus::Scheduled));
        events.extend(repeat(5, EventStatus::Excluded));

        let snapshot = compute_snapshot(&events, &config);
        assert_eq!(snapshot.completed_count, 100);
        assert_eq!(snapshot.scheduled_count, 50);
        assert_eq!(snapshot.pending_count, 196);
        assert_eq!(snapshot.elapsed_calendar_days, 91);
        assert_eq!(snapshot.remaining_business_days, 6);
        assert!((snapshot.current_pace - 100.0 / 91.0).abs() < 1e-9);
        assert!((snapshot.required_pace - 196.0 / 6.0).abs() < 1e-9);
        assert!(
            (snapshot.pace_delta - (snapshot.current_pace - snapshot.required_pace)).abs() < 1e-9
        );
        assert!(
            (snapshot.projected_total_at_current_pace - (100.0 + 6.0 * 100.0 / 91.0)).abs() < 1e-9
        );
        assert!((snapshot.trailing_paces[&7] - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn snapshot_after_support_end_degrades_to_zero_runway() {
        let config = RolloutConfig::with_defaults(date(2025, 10, 20));
        let events = repeat(10, EventStatus::Done);

        let snapshot = compute_snapshot(&events, &config);
        assert_eq!(snapshot.remaining_business_days, -4);
        assert_eq!(snapshot.required_pace, 0.0);
        assert_eq!(snapshot.projected_total_at_current_pace, 10.0);
    }
}
