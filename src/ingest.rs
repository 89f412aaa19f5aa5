//! Event table normalisation.
//!
//! Turns a CSV export of the rollout sheet into [`Event`]s. Rows whose date
//! cannot be parsed are dropped; status strings are reduced to
//! [`EventStatus`] here so nothing downstream ever re-reads raw text.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::models::{Event, EventStatus, EventTable};

pub const DEFAULT_DATE_COLUMN: &str = "Data";
pub const DEFAULT_STATUS_COLUMN: &str = "Concluido";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

#[derive(Debug, Clone)]
pub struct ColumnNames {
    pub date: String,
    pub status: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: DEFAULT_DATE_COLUMN.to_string(),
            status: DEFAULT_STATUS_COLUMN.to_string(),
        }
    }
}

pub fn parse_status(raw: &str) -> EventStatus {
    match raw.trim().to_uppercase().as_str() {
        "SIM" => EventStatus::Done,
        "NÃO" | "NAO" => EventStatus::Scheduled,
        _ => EventStatus::Excluded,
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
}

pub fn load_csv(path: &Path, columns: &ColumnNames) -> Result<EventTable, IngestError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let table = read_events(file, columns)?;
    info!(
        path = %path.display(),
        events = table.events.len(),
        dropped = table.dropped_rows,
        "loaded rollout events"
    );
    Ok(table)
}

pub fn read_events<R: Read>(input: R, columns: &ColumnNames) -> Result<EventTable, IngestError> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    collect_events(reader, columns)
}

fn collect_events<R: Read>(
    mut reader: csv::Reader<R>,
    columns: &ColumnNames,
) -> Result<EventTable, IngestError> {
    let headers = reader.headers()?.clone();
    let date_idx = column_index(&headers, &columns.date)?;
    let status_idx = column_index(&headers, &columns.status)?;

    let mut table = EventTable::default();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let raw_date = record.get(date_idx).unwrap_or_default();

        let Some(date) = parse_date(raw_date) else {
            debug!(
                row = row + 1,
                value = raw_date,
                "dropping row with unparseable date"
            );
            table.dropped_rows += 1;
            continue;
        };

        let status = parse_status(record.get(status_idx).unwrap_or_default());
        if status == EventStatus::Excluded {
            table.unrecognized_status += 1;
        }
        table.events.push(Event::new(date, status));
    }

    if table.unrecognized_status > 0 {
        warn!(
            rows = table.unrecognized_status,
            "rows with a status other than SIM/NÃO are excluded from all counts"
        );
    }

    Ok(table)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn statuses_are_normalised_case_and_whitespace_insensitively() {
        assert_eq!(parse_status("SIM"), EventStatus::Done);
        assert_eq!(parse_status("  sim "), EventStatus::Done);
        assert_eq!(parse_status("NÃO"), EventStatus::Scheduled);
        assert_eq!(parse_status("não"), EventStatus::Scheduled);
        assert_eq!(parse_status("nao"), EventStatus::Scheduled);
        assert_eq!(parse_status("talvez"), EventStatus::Excluded);
        assert_eq!(parse_status(""), EventStatus::Excluded);
    }

    #[test]
    fn dates_accept_iso_and_day_first_formats() {
        assert_eq!(parse_date("2025-07-08"), Some(date(2025, 7, 8)));
        assert_eq!(parse_date("2025-07-08 14:30:00"), Some(date(2025, 7, 8)));
        assert_eq!(parse_date("2025-07-08T09:00:00"), Some(date(2025, 7, 8)));
        assert_eq!(parse_date("08/07/2025"), Some(date(2025, 7, 8)));
        assert_eq!(parse_date(" 08/07/2025 10:15:00 "), Some(date(2025, 7, 8)));
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2025-02-30"), None);
    }

    #[test]
    fn reads_events_and_drops_bad_dates() {
        let csv = "Nome,Data,Concluido\n\
                   Ana,2025-07-08,SIM\n\
                   Bruno,09/07/2025,Não\n\
                   Carla,,SIM\n\
                   Davi,amanhã,NÃO\n\
                   Eva,2025-07-10,cancelado\n";

        let table = read_events(csv.as_bytes(), &ColumnNames::default()).unwrap();
        assert_eq!(
            table.events,
            vec![
                Event::new(date(2025, 7, 8), EventStatus::Done),
                Event::new(date(2025, 7, 9), EventStatus::Scheduled),
                Event::new(date(2025, 7, 10), EventStatus::Excluded),
            ]
        );
        assert_eq!(table.dropped_rows, 2);
        assert_eq!(table.unrecognized_status, 1);
    }

    #[test]
    fn short_rows_are_dropped_not_fatal() {
        let csv = "Data,Concluido\n2025-07-08,SIM\n2025-07-09\n";
        let table = read_events(csv.as_bytes(), &ColumnNames::default()).unwrap();
        assert_eq!(table.events.len(), 2);
        assert_eq!(table.events[1].status, EventStatus::Excluded);

        let csv = "Concluido,Data\nSIM\n";
        let table = read_events(csv.as_bytes(), &ColumnNames::default()).unwrap();
        assert!(table.events.is_empty());
        assert_eq!(table.dropped_rows, 1);
    }

    #[test]
    fn custom_column_names_are_honoured() {
        let csv = "when, done\n2025-07-08,SIM\n";
        let columns = ColumnNames {
            date: "when".to_string(),
            status: "done".to_string(),
        };
        let table = read_events(csv.as_bytes(), &columns).unwrap();
        assert_eq!(
            table.events,
            vec![Event::new(date(2025, 7, 8), EventStatus::Done)]
        );
    }

    #[test]
    fn loads_from_disk_and_reports_missing_files() {
        let file_name = format!("rollout-events-{}.csv", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(&path, "Data,Concluido\n2025-07-08,SIM\n2025-07-09,NÃO\n").unwrap();
        let table = load_csv(&path, &ColumnNames::default()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(table.events.len(), 2);

        let err = load_csv(&path, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, IngestError::Csv(_)));
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "Data,Status\n2025-07-08,SIM\n";
        let err = read_events(csv.as_bytes(), &ColumnNames::default()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn(ref name) if name == "Concluido"
        ));
    }
}
