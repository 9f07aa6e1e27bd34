// src/strategy/mod.rs

pub mod common;
pub mod implementations;
pub mod minimax;
pub mod traits;

use crate::simulation::config::{PlanningConfig, PlanningMode};
use implementations::{DeterministicBuilder, IntervalRobustBuilder};
use minimax::ScenarioRobustBuilder;
use traits::ModelBuilder;

/// The builder that implements `mode`.
pub fn builder_for(mode: PlanningMode, config: &PlanningConfig) -> Box<dyn ModelBuilder> {
    match mode {
        PlanningMode::Deterministic => Box::new(DeterministicBuilder::new(config.clone())),
        PlanningMode::IntervalRobust => Box::new(IntervalRobustBuilder::new(config.clone())),
        PlanningMode::ScenarioRobust => Box::new(ScenarioRobustBuilder::new(config.clone())),
    }
}
