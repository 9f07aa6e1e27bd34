// src/io/reporting.rs

use crate::error::Result;
use crate::simulation::engine::DayRecord;
use serde::{Serialize, Serializer};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Number formatting of the daily report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFormat {
    pub delimiter: u8,
    /// Write `12,50` instead of `12.50`.
    pub decimal_comma: bool,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            decimal_comma: true,
        }
    }
}

/// Two-decimal number written with the report's decimal separator.
#[derive(Debug, Clone, Copy)]
struct Number {
    value: f64,
    decimal_comma: bool,
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let text = format!("{:.2}", self.value);
        if self.decimal_comma {
            serializer.serialize_str(&text.replace('.', ","))
        } else {
            serializer.serialize_str(&text)
        }
    }
}

/// One CSV row; field names make up the header.
#[derive(Debug, Serialize)]
struct ReportRow {
    day: usize,
    demand: Number,
    objective: Number,
    reposition: Number,
    stock: Number,
    fault: Number,
    shortfall: Number,
    profit: Number,
    cumulative_profit: Number,
    worst_scenario: Option<usize>,
}

impl ReportRow {
    fn new(record: &DayRecord, format: ReportFormat) -> Self {
        let number = |value| Number {
            value,
            decimal_comma: format.decimal_comma,
        };
        Self {
            day: record.day,
            demand: number(record.demand),
            objective: number(record.objective),
            reposition: number(record.reposition),
            stock: number(record.stock),
            fault: number(record.fault),
            shortfall: number(record.shortfall),
            profit: number(record.profit),
            cumulative_profit: number(record.cumulative_profit),
            worst_scenario: record.worst_scenario,
        }
    }
}

/// Writes one row per committed day to `file_path`.
///
/// # Arguments
/// * `file_path` - Destination, e.g. `output/inventory_scenario_robust.csv`.
/// * `data` - The controller's history.
/// * `format` - Delimiter and decimal separator.
pub fn write_planning_log<P: AsRef<Path>>(
    file_path: P,
    data: &[DayRecord],
    format: ReportFormat,
) -> Result<()> {
    let file = std::fs::File::create(file_path.as_ref())?;
    write_records(file, data, format)?;
    info!(
        rows = data.len(),
        path = %file_path.as_ref().display(),
        "exported daily report"
    );
    Ok(())
}

pub fn write_records<W: Write>(writer: W, data: &[DayRecord], format: ReportFormat) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(format.delimiter)
        .from_writer(writer);

    for record in data {
        wtr.serialize(ReportRow::new(record, format))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: usize, worst: Option<usize>) -> DayRecord {
        DayRecord {
            day,
            demand: 4.0,
            objective: 1234.5,
            reposition: 5.0,
            stock: 10.0,
            fault: 0.0,
            closing_stock: 6.0,
            shortfall: -2.25,
            profit: 300.0,
            cumulative_profit: 300.0,
            worst_scenario: worst,
            trajectory: None,
        }
    }

    #[test]
    fn writes_semicolon_rows_with_decimal_comma() {
        let mut out = Vec::new();
        write_records(&mut out, &[record(0, Some(3))], ReportFormat::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "day;demand;objective;reposition;stock;fault;shortfall;profit;cumulative_profit;worst_scenario"
        );
        assert_eq!(
            lines[1],
            "0;4,00;1234,50;5,00;10,00;0,00;-2,25;300,00;300,00;3"
        );
    }

    #[test]
    fn plain_decimal_point_and_empty_scenario() {
        let mut out = Vec::new();
        let format = ReportFormat {
            delimiter: b',',
            decimal_comma: false,
        };
        write_records(&mut out, &[record(7, None)], format).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("7,4.00,1234.50"));
        assert!(text.lines().nth(1).unwrap().ends_with("300.00,"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_planning_log(&path, &[record(0, None), record(1, None)], ReportFormat::default())
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
