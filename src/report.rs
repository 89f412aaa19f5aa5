use std::fmt::Write;

use chrono::NaiveDate;

use crate::config::RolloutConfig;
use crate::models::{EventTable, ExtraDaysResult, ForecastSummary, MetricsSnapshot};

const BAR_WIDTH: usize = 40;

pub fn describe_completion(completion: Option<NaiveDate>) -> String {
    match completion {
        Some(date) => date.to_string(),
        None => "no forecast".to_string(),
    }
}

pub fn describe_extra_effort(result: &ExtraDaysResult, increment: f64) -> String {
    match result {
        ExtraDaysResult::NoExtraEffort => {
            "No extra effort needed: the current pace covers the pending work.".to_string()
        }
        ExtraDaysResult::InvalidIncrement => {
            "Enter an increment greater than zero to simulate extra effort.".to_string()
        }
        ExtraDaysResult::ExtraDays { days, completion } => format!(
            "With +{increment:.2}/business day, {days} business days close the gap (until {}).",
            describe_completion(*completion)
        ),
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled.clamp(1, BAR_WIDTH))
}

pub fn build_report(
    config: &RolloutConfig,
    table: &EventTable,
    snapshot: &MetricsSnapshot,
    summary: &ForecastSummary,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Rollout Progress Dashboard");
    let _ = writeln!(
        output,
        "As of {} (rollout started {}, support ends {})",
        config.reference_date, config.rollout_start, config.support_end
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Status");
    let _ = writeln!(output, "- Completed: {}", snapshot.completed_count);
    let _ = writeln!(output, "- Scheduled: {}", snapshot.scheduled_count);
    let _ = writeln!(
        output,
        "- Pending (not yet in the sheet): {}",
        snapshot.pending_count
    );
    let _ = writeln!(
        output,
        "Pending = {} - (Completed + Scheduled)",
        config.target_total
    );
    if table.dropped_rows > 0 || table.unrecognized_status > 0 {
        let _ = writeln!(
            output,
            "Skipped {} rows without a valid date; {} rows had an unrecognised status.",
            table.dropped_rows, table.unrecognized_status
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Pace");
    let _ = writeln!(
        output,
        "- Calendar days since start: {}",
        snapshot.elapsed_calendar_days
    );
    let _ = writeln!(
        output,
        "- Business days until support ends: {}",
        snapshot.remaining_business_days
    );
    let _ = writeln!(
        output,
        "- Current pace: {:.2}/calendar day",
        snapshot.current_pace
    );
    let _ = writeln!(
        output,
        "- Required pace: {:.2}/business day ({:+.2} vs current)",
        snapshot.required_pace, snapshot.pace_delta
    );
    let _ = writeln!(
        output,
        "- Expected total at current pace: {}",
        snapshot.projected_total_at_current_pace.floor()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Completion Forecast");
    match summary.at_current_pace.completion {
        Some(date) => {
            let _ = writeln!(output, "Forecast completion at the current pace: {date}");
        }
        None => {
            let _ = writeln!(
                output,
                "Current pace is zero; no completion date can be forecast."
            );
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Recent Pace");
    let _ = writeln!(output, "| Window | Pace | Completion at this pace |");
    let _ = writeln!(output, "|---|---|---|");
    for (window, forecast) in summary.trailing.iter() {
        let _ = writeln!(
            output,
            "| Last {} days | {:.2}/day | {} |",
            window,
            forecast.throughput,
            describe_completion(forecast.completion)
        );
    }
    let _ = writeln!(output);

    let distribution = [
        ("Completed", snapshot.completed_count),
        ("Scheduled", snapshot.scheduled_count),
        ("Pending", snapshot.pending_count),
    ];
    let largest = distribution
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);
    let _ = writeln!(output, "## Overall Progress");
    let _ = writeln!(output, "```text");
    for (label, count) in distribution {
        let _ = writeln!(
            output,
            "{:<10} {:>5} {}",
            label,
            count,
            bar(f64::from(count), f64::from(largest))
        );
    }
    let _ = writeln!(output, "```");
    let _ = writeln!(output);

    let fastest = snapshot.current_pace.max(snapshot.required_pace);
    let _ = writeln!(output, "## Daily Pace Comparison");
    let _ = writeln!(output, "```text");
    let _ = writeln!(
        output,
        "{:<10} {:>5.2} {}",
        "Current",
        snapshot.current_pace,
        bar(snapshot.current_pace, fastest)
    );
    let _ = writeln!(
        output,
        "{:<10} {:>5.2} {}",
        "Required",
        snapshot.required_pace,
        bar(snapshot.required_pace, fastest)
    );
    let _ = writeln!(output, "```");
    let _ = writeln!(output);

    let _ = writeln!(output, "## Extra Effort Simulation");
    let _ = writeln!(
        output,
        "{}",
        describe_extra_effort(&summary.extra_effort, summary.extra_increment)
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Scenarios");
    if summary.presets.is_empty() {
        let _ = writeln!(output, "No preset scenarios configured.");
    } else {
        for scenario in summary.presets.iter() {
            let _ = writeln!(
                output,
                "- {} upgrades/business day: {}",
                scenario.throughput,
                describe_completion(scenario.completion)
            );
        }
    }
    let _ = writeln!(
        output,
        "- Custom, {} upgrades/business day: {}",
        summary.custom.throughput,
        describe_completion(summary.custom.completion)
    );

    output
}
