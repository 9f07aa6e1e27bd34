// src/simulation/config.rs

use crate::error::{PlannerError, Result};
use serde::Deserialize;
use std::ops::Range;
use std::path::Path;

/// Which model the controller builds every planning day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningMode {
    Deterministic,
    IntervalRobust,
    ScenarioRobust,
}

impl PlanningMode {
    pub const ALL: [PlanningMode; 3] = [
        PlanningMode::Deterministic,
        PlanningMode::IntervalRobust,
        PlanningMode::ScenarioRobust,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlanningMode::Deterministic => "deterministic",
            PlanningMode::IntervalRobust => "interval_robust",
            PlanningMode::ScenarioRobust => "scenario_robust",
        }
    }
}

/// Sense of the per sub-period budget constraint of the interval model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BudgetSense {
    #[serde(rename = "le")]
    AtMost,
    #[serde(rename = "ge")]
    AtLeast,
    #[serde(rename = "eq")]
    Exactly,
}

/// Process-wide planning parameters, fixed before a run starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// First planning day (zero-based index into the demand series).
    pub initial_day: usize,
    /// Number of days the rolling loop commits decisions for.
    pub planning_days: usize,
    /// Look-ahead length of every day's model.
    pub horizon: usize,
    /// Periodic review: orders may be placed every `reposition_interval` days.
    pub reposition_interval: usize,
    /// An order placed on day `r` enters the stock-flow balance of day
    /// `r + lead_time - 1`; 1 means same-day availability.
    pub lead_time: usize,
    /// Explicit starting stock. When absent the stock covers the realized
    /// demand of the first `initial_stock_days` days.
    pub initial_stock: Option<f64>,
    pub initial_stock_days: usize,

    pub unit_price: f64,
    pub unit_cost: f64,
    pub holding_cost: f64,
    pub shortage_cost: f64,

    /// Relative forecast error per sqrt(day) of lead.
    pub uncertainty_rate: f64,
    /// Robustness budget of every robust sub-period.
    pub pessimism: f64,
    pub robust_interval: usize,
    pub robust_constraint_sense: BudgetSense,
    pub robust_constraint_multiplier: f64,

    pub scenario_count: usize,
    pub seed: u64,
    /// Size of the scenario sampling pool; `None` uses rayon's default.
    pub worker_threads: Option<usize>,
    /// Keep every day's planned stock/fault/reposition path in the history.
    pub record_trajectories: bool,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            initial_day: 0,
            planning_days: 30,
            horizon: 30,
            reposition_interval: 5,
            lead_time: 2,
            initial_stock: None,
            initial_stock_days: 4,
            unit_price: 100.0,
            unit_cost: 40.0,
            holding_cost: 1.0,
            shortage_cost: 300.0,
            uncertainty_rate: 0.1,
            pessimism: 1.0,
            robust_interval: 7,
            robust_constraint_sense: BudgetSense::AtMost,
            robust_constraint_multiplier: 1.0,
            scenario_count: 10,
            seed: 0,
            worker_threads: None,
            record_trajectories: false,
        }
    }
}

impl PlanningConfig {
    /// Reads a TOML file; missing keys keep their default value.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PlanningConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("horizon", self.horizon),
            ("reposition_interval", self.reposition_interval),
            ("robust_interval", self.robust_interval),
            ("lead_time", self.lead_time),
            ("scenario_count", self.scenario_count),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(PlannerError::config(field, "must be at least 1"));
            }
        }

        let non_negative = [
            ("unit_price", self.unit_price),
            ("unit_cost", self.unit_cost),
            ("holding_cost", self.holding_cost),
            ("shortage_cost", self.shortage_cost),
            ("uncertainty_rate", self.uncertainty_rate),
            ("pessimism", self.pessimism),
            ("robust_constraint_multiplier", self.robust_constraint_multiplier),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PlannerError::config(
                    field,
                    format!("must be a finite non-negative number, got {value}"),
                ));
            }
        }

        if let Some(stock) = self.initial_stock {
            if !stock.is_finite() || stock < 0.0 {
                return Err(PlannerError::config(
                    "initial_stock",
                    format!("must be a finite non-negative number, got {stock}"),
                ));
            }
        }
        if self.worker_threads == Some(0) {
            return Err(PlannerError::config("worker_threads", "must be at least 1"));
        }
        Ok(())
    }

    /// Day after the last committed planning day.
    pub fn final_day(&self) -> usize {
        self.initial_day + self.planning_days
    }

    /// True for days on the periodic-review grid anchored at `initial_day`.
    pub fn is_reposition_day(&self, day: usize) -> bool {
        day >= self.initial_day && (day - self.initial_day) % self.reposition_interval == 0
    }

    /// Review-grid days inside `[from, to)`.
    pub fn reposition_days(&self, from: usize, to: usize) -> Vec<usize> {
        (from..to).filter(|&d| self.is_reposition_day(d)).collect()
    }

    /// Splits `[origin, origin + horizon)` into robust sub-periods of
    /// `robust_interval` days. The last one is cut at the horizon end.
    pub fn robust_periods(&self, origin: usize) -> Vec<Range<usize>> {
        let end = origin + self.horizon;
        (origin..end)
            .step_by(self.robust_interval)
            .map(|start| start..(start + self.robust_interval).min(end))
            .collect()
    }

    /// Day whose order feeds the stock-flow balance of `day`.
    ///
    /// `None` when that order would have been placed before day 0.
    pub fn order_day_for(&self, day: usize) -> Option<usize> {
        (day + 1).checked_sub(self.lead_time)
    }
}
