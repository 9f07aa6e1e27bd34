// src/simulation/state.rs

use crate::simulation::config::PlanningConfig;

/// Result of moving committed stock across one night.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub arriving: f64,
    /// Stock at the start of the next day, never negative.
    pub stock: f64,
    /// Negative overflow when demand exceeded what was on hand, else 0.
    pub shortfall: f64,
}

/// Committed history of one run. Only the controller writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningState {
    pub current_day: usize,
    pub initial_day: usize,
    pub final_day: usize,
    /// Stock at the start of each day; filled up to `current_day`.
    pub stock_by_day: Vec<f64>,
    /// Orders placed on each day (absolute index, zero off the review grid).
    pub committed_repositions: Vec<f64>,
    /// Realized shortfall recorded when entering each day.
    pub realized_shortfall: Vec<f64>,
}

impl PlanningState {
    pub fn new(config: &PlanningConfig, initial_stock: f64) -> Self {
        let final_day = config.final_day();
        let mut stock_by_day = vec![0.0; final_day + 1];
        stock_by_day[config.initial_day] = initial_stock;
        Self {
            current_day: config.initial_day,
            initial_day: config.initial_day,
            final_day,
            stock_by_day,
            committed_repositions: vec![0.0; final_day + 1],
            realized_shortfall: vec![0.0; final_day + 1],
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_day >= self.final_day
    }

    pub fn stock_at(&self, day: usize) -> f64 {
        self.stock_by_day.get(day).copied().unwrap_or(0.0)
    }

    pub fn reposition_at(&self, day: usize) -> f64 {
        self.committed_repositions.get(day).copied().unwrap_or(0.0)
    }

    pub fn commit_reposition(&mut self, day: usize, quantity: f64) {
        if let Some(slot) = self.committed_repositions.get_mut(day) {
            *slot = quantity.max(0.0);
        }
    }

    /// Applies the realized demand of the current day and moves to the next.
    ///
    /// `stock(t+1) = max(0, stock(t) - demand(t) + order(t + 1 - lead_time))`;
    /// a negative pre-clamp value is kept as the realized shortfall.
    pub fn advance(&mut self, config: &PlanningConfig, realized_demand: f64) -> Transition {
        let today = self.current_day;
        let next = today + 1;
        let arriving = config
            .order_day_for(today)
            .filter(|&d| d >= self.initial_day)
            .map_or(0.0, |d| self.reposition_at(d));

        let raw = self.stock_at(today) - realized_demand + arriving;
        let (stock, shortfall) = if raw < 0.0 { (0.0, raw) } else { (raw, 0.0) };

        if next < self.stock_by_day.len() {
            self.stock_by_day[next] = stock;
            self.realized_shortfall[next] = shortfall;
        }
        self.current_day = next;

        Transition {
            arriving,
            stock,
            shortfall,
        }
    }
}
