//! Completion forecasts and what-if simulation.
//!
//! Every function here is a stateless projection of the metrics snapshot.
//! "No forecast possible" and "invalid input" are ordinary return values
//! (`None`, [`ExtraDaysResult::InvalidIncrement`]) so the dashboard can
//! render a neutral message.

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar;
use crate::config::RolloutConfig;
use crate::models::{ExtraDaysResult, ForecastSummary, MetricsSnapshot, ScenarioForecast};

/// Date on which `pending` upgrades are done at `pace` per business day.
///
/// `None` when the pace is zero, negative or not a number, or when the
/// resulting date is out of range.
pub fn forecast_completion_at_pace(
    pending: u32,
    pace: f64,
    reference: NaiveDate,
) -> Option<NaiveDate> {
    let days_needed = days_at_rate(f64::from(pending), pace)?;
    calendar::add_business_days(reference, days_needed)
}

/// How many business days of `increment` extra upgrades per day close the
/// gap between the pending work and what the current pace delivers before
/// the deadline.
///
/// The gap is checked first: when the current pace suffices the answer is
/// [`ExtraDaysResult::NoExtraEffort`] whatever the increment.
pub fn extra_pace_to_close_gap(
    completed: u32,
    current_pace: f64,
    remaining_business_days: i64,
    pending: u32,
    increment: f64,
    reference: NaiveDate,
) -> ExtraDaysResult {
    let capacity = f64::from(completed) + current_pace * remaining_business_days as f64;
    let gap = f64::from(pending) - (capacity - f64::from(completed));

    if gap <= 0.0 {
        return ExtraDaysResult::NoExtraEffort;
    }

    match days_at_rate(gap, increment) {
        Some(days) => ExtraDaysResult::ExtraDays {
            days,
            completion: calendar::add_business_days(reference, days),
        },
        None => ExtraDaysResult::InvalidIncrement,
    }
}

pub fn simulate_scenarios(
    pending: u32,
    reference: NaiveDate,
    throughputs: &[f64],
) -> Vec<ScenarioForecast> {
    throughputs
        .iter()
        .map(|&throughput| scenario(pending, throughput, reference))
        .collect()
}

pub fn build_summary(snapshot: &MetricsSnapshot, config: &RolloutConfig) -> ForecastSummary {
    let pending = snapshot.pending_count;
    let reference = config.reference_date;

    let trailing = snapshot
        .trailing_paces
        .iter()
        .map(|(&window, &pace)| (window, scenario(pending, pace, reference)))
        .collect();

    let extra_effort = extra_pace_to_close_gap(
        snapshot.completed_count,
        snapshot.current_pace,
        snapshot.remaining_business_days.max(0),
        pending,
        config.extra_increment,
        reference,
    );
    debug!(
        ?extra_effort,
        increment = config.extra_increment,
        "simulated extra effort"
    );

    ForecastSummary {
        reference_date: reference,
        at_current_pace: scenario(pending, snapshot.current_pace, reference),
        trailing,
        presets: simulate_scenarios(pending, reference, &config.scenario_presets),
        custom: scenario(pending, config.custom_throughput, reference),
        extra_increment: config.extra_increment,
        extra_effort,
    }
}

fn scenario(pending: u32, throughput: f64, reference: NaiveDate) -> ScenarioForecast {
    ScenarioForecast {
        throughput,
        completion: forecast_completion_at_pace(pending, throughput, reference),
    }
}

/// `ceil(amount / rate)` as a day count, or `None` for a non-positive rate
/// or a quotient too large to represent.
fn days_at_rate(amount: f64, rate: f64) -> Option<u64> {
    if rate.is_nan() || rate <= 0.0 {
        return None;
    }
    let days = (amount / rate).ceil();
    if !days.is_finite() || days >= u64::MAX as f64 {
        return None;
    }
    Some(days.max(0.0) as u64)
}
