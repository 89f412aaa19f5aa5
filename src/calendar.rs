//! Business-day arithmetic.
//!
//! A business day is Monday through Friday. No holiday calendar is applied.
//! Everything here is pure and works in constant time regardless of the
//! span involved.

use chrono::{Datelike, Days, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Returns `date` when it is a business day, otherwise the following Monday.
pub fn roll_forward(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.checked_add_days(Days::new(2)),
        Weekday::Sun => date.checked_add_days(Days::new(1)),
        _ => Some(date),
    }
}

/// Counts business days in the half-open interval `[begin, end)`.
///
/// When `end` precedes `begin` the count covers `(end, begin]` and is
/// negated, so callers can tell "already past the end" from "no runway".
pub fn business_days_between(begin: NaiveDate, end: NaiveDate) -> i64 {
    if end < begin {
        let shifted = count_forward(end, begin) - i64::from(is_business_day(end))
            + i64::from(is_business_day(begin));
        -shifted
    } else {
        count_forward(begin, end)
    }
}

fn count_forward(begin: NaiveDate, end: NaiveDate) -> i64 {
    let span = (end - begin).num_days();
    let full_weeks = span / 7;
    let remainder = (span % 7) as usize;

    // Any run of seven consecutive days holds exactly five business days.
    let tail = begin + chrono::Duration::days(full_weeks * 7);
    let tail_count = tail
        .iter_days()
        .take(remainder)
        .filter(|day| is_business_day(*day))
        .count() as i64;

    full_weeks * 5 + tail_count
}

/// Advances `date` by `n` business days. From a weekend date the following
/// Monday is the first business day reached. `None` when the result falls
/// outside the representable date range.
pub fn add_business_days(date: NaiveDate, n: u64) -> Option<NaiveDate> {
    if n == 0 {
        return Some(date);
    }

    let start = roll_forward(date)?;
    let steps = if start == date { n } else { n - 1 };
    let weekday = u64::from(start.weekday().num_days_from_monday());

    let weeks = steps / 5;
    let remainder = steps % 5;
    let weekend_hop = if weekday + remainder >= 5 { 2 } else { 0 };
    let calendar_days = weeks.checked_mul(7)?.checked_add(remainder + weekend_hop)?;

    start.checked_add_days(Days::new(calendar_days))
}
