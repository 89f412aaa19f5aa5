use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// Upgrade finished ("SIM" in the source sheet).
    Done,
    /// Upgrade booked but not yet finished ("NÃO").
    Scheduled,
    /// Anything else; counted nowhere.
    Excluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub date: NaiveDate,
    pub status: EventStatus,
}

impl Event {
    pub fn new(date: NaiveDate, status: EventStatus) -> Self {
        Self { date, status }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventTable {
    pub events: Vec<Event>,
    pub dropped_rows: usize,
    pub unrecognized_status: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub completed_count: u32,
    pub scheduled_count: u32,
    pub pending_count: u32,
    pub elapsed_calendar_days: i64,
    /// Raw signed count; negative once the reference date is past the end.
    pub remaining_business_days: i64,
    pub current_pace: f64,
    pub required_pace: f64,
    pub pace_delta: f64,
    pub projected_total_at_current_pace: f64,
    pub trailing_paces: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioForecast {
    pub throughput: f64,
    /// `None` when no completion date can be derived at this throughput.
    pub completion: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtraDaysResult {
    /// Current pace already covers the pending work.
    NoExtraEffort,
    /// The increment was zero, negative or not a number.
    InvalidIncrement,
    ExtraDays {
        days: u64,
        completion: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub reference_date: NaiveDate,
    pub at_current_pace: ScenarioForecast,
    pub trailing: Vec<(u32, ScenarioForecast)>,
    pub presets: Vec<ScenarioForecast>,
    pub custom: ScenarioForecast,
    pub extra_increment: f64,
    pub extra_effort: ExtraDaysResult,
}
