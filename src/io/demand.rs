// src/io/demand.rs

use crate::error::{PlannerError, Result};
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// One realized sales observation.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandRecord {
    pub date: NaiveDate,
    pub demand: f64,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Sales")]
    sales: f64,
}

/// Historical demand, ordered by date and addressed by zero-based day.
#[derive(Debug, Clone, Default)]
pub struct DemandSource {
    records: Vec<DemandRecord>,
}

impl DemandSource {
    pub fn new(mut records: Vec<DemandRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self { records }
    }

    /// Builds a source from plain daily values, dated consecutively.
    pub fn from_demands<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let start = NaiveDate::default();
        let records = values
            .into_iter()
            .enumerate()
            .map(|(i, demand)| DemandRecord {
                date: start + Duration::days(i as i64),
                demand: demand.max(0.0),
            })
            .collect();
        Self { records }
    }

    /// Reads a `Date,Sales` CSV file (dates as `dd/mm/yyyy`).
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let source = Self::from_reader(file)?;
        info!(
            path = %path.as_ref().display(),
            days = source.len(),
            "loaded demand history"
        );
        Ok(source)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();
        for row in rdr.deserialize::<RawRow>() {
            let row = row?;
            let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|source| {
                PlannerError::Date {
                    value: row.date.clone(),
                    source,
                }
            })?;
            let demand = if row.sales < 0.0 {
                warn!(%date, sales = row.sales, "negative sales clamped to zero");
                0.0
            } else {
                row.sales
            };
            records.push(DemandRecord { date, demand });
        }
        Ok(Self::new(records))
    }

    /// Realized demand of `day`; days outside the history count as zero.
    pub fn demand(&self, day: usize) -> f64 {
        self.records.get(day).map_or(0.0, |r| r.demand)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DemandRecord] {
        &self.records
    }

    pub fn max_demand(&self) -> f64 {
        self.records.iter().map(|r| r.demand).fold(0.0, f64::max)
    }

    /// Stock covering the realized demand of `coverage_days` days from `initial_day`.
    pub fn initial_stock(&self, initial_day: usize, coverage_days: usize) -> f64 {
        (initial_day..initial_day + coverage_days)
            .map(|d| self.demand(d))
            .sum()
    }
}

/// Every day has the same demand. Useful for step-response checks.
pub fn generate_constant_demand(days: usize, value: f64) -> Vec<f64> {
    vec![value.max(0.0); days]
}

/// Normally distributed daily demand, clamped at zero.
///
/// # Arguments
/// * `days` - Length of the series.
/// * `mean` - Average daily sales.
/// * `std_dev` - Day-to-day volatility.
pub fn generate_normal_demand<R: Rng + ?Sized>(
    days: usize,
    mean: f64,
    std_dev: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let normal = Normal::new(mean, std_dev)
        .map_err(|e| PlannerError::config("std_dev", e.to_string()))?;
    Ok((0..days).map(|_| normal.sample(rng).max(0.0)).collect())
}

/// `low` for the first `switch_day` days, then `high`.
pub fn generate_step_demand(days: usize, switch_day: usize, low: f64, high: f64) -> Vec<f64> {
    (0..days)
        .map(|d| if d < switch_day { low } else { high })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn out_of_range_day_yields_zero() {
        let source = DemandSource::from_demands([4.0, 5.0]);
        assert_eq!(source.demand(1), 5.0);
        assert_eq!(source.demand(2), 0.0);
        assert_eq!(source.demand(usize::MAX), 0.0);
    }

    #[test]
    fn csv_rows_are_sorted_by_date() {
        let data = "Date,Sales\n03/01/2020,7\n01/01/2020,3\n02/01/2020, 5\n";
        let source = DemandSource::from_reader(data.as_bytes()).unwrap();
        let demands: Vec<f64> = source.records().iter().map(|r| r.demand).collect();
        assert_eq!(demands, vec![3.0, 5.0, 7.0]);
        assert_eq!(source.max_demand(), 7.0);
    }

    #[test]
    fn bad_date_is_reported() {
        let data = "Date,Sales\n2020-01-01,7\n";
        let err = DemandSource::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, PlannerError::Date { .. }));
    }

    #[test]
    fn initial_stock_sums_coverage_window() {
        let source = DemandSource::from_demands([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(source.initial_stock(1, 3), 9.0);
        assert_eq!(source.initial_stock(4, 3), 5.0);
    }

    #[test]
    fn generators_never_go_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = generate_normal_demand(200, 1.0, 5.0, &mut rng).unwrap();
        assert!(normal.iter().all(|&d| d >= 0.0));
        assert_eq!(generate_step_demand(4, 2, 4.0, 8.0), vec![4.0, 4.0, 8.0, 8.0]);
        assert_eq!(generate_constant_demand(2, 3.0), vec![3.0, 3.0]);
    }
}
