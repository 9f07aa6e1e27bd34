// src/strategy/traits.rs

use crate::error::Result;
use crate::model::forecast::ForecastPoint;
use crate::model::lp::LinearModel;
use crate::model::scenario::Scenario;
use crate::simulation::config::PlanningMode;
use std::fmt::Debug;

/// Everything a builder needs to know about the day being planned.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Planning origin; first day of the horizon.
    pub origin: usize,
    /// Committed stock at the start of `origin`.
    pub initial_stock: f64,
    /// Orders already committed, indexed by absolute day.
    pub committed_repositions: &'a [f64],
    /// One point per horizon day, starting at `origin`.
    pub forecast: &'a [ForecastPoint],
    /// Sampled scenarios; empty unless the builder asks for them.
    pub scenarios: &'a [Scenario],
}

impl BuildContext<'_> {
    pub fn committed(&self, day: usize) -> f64 {
        self.committed_repositions.get(day).copied().unwrap_or(0.0)
    }
}

/// Builds one planning day's decision problem.
pub trait ModelBuilder: Debug {
    fn mode(&self) -> PlanningMode;

    /// Whether the controller must sample scenarios before calling [`build`](Self::build).
    fn needs_scenarios(&self) -> bool {
        false
    }

    /// Whether the point forecast should carry a random perturbation.
    fn perturbs_forecast(&self) -> bool {
        false
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<LinearModel>;
}
