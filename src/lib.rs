//! Rolling-horizon replenishment planning for one product at one location.
//!
//! Every planning day a linear model of the coming horizon is built and
//! solved, only that day's order is committed, and the realized demand moves
//! the committed stock forward. Three models are available: a deterministic
//! one, an interval model with a budget of uncertainty, and a minimax model
//! over sampled demand scenarios.

pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod simulation;
pub mod solver;
pub mod strategy;

pub use error::{PlannerError, Result};
pub use simulation::config::{PlanningConfig, PlanningMode};
pub use simulation::engine::RollingHorizonController;
