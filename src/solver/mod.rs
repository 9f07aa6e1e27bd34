// src/solver/mod.rs

//! Seam between the planner and the numeric LP solver.

pub mod good_lp_backend;

use crate::model::lp::{LinearModel, VarHandle, VarKey};
use thiserror::Error;

pub use good_lp_backend::GoodLpSolver;

/// Why a model could not be solved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveFailure {
    #[error("model is infeasible")]
    Infeasible,
    #[error("model is unbounded")]
    Unbounded,
    #[error("numerical failure: {0}")]
    Numerical(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
}

/// Optimal point of one model; values are indexed by [`VarHandle`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub status: SolveStatus,
    pub objective_value: f64,
    pub values: Vec<f64>,
}

impl Solution {
    pub fn value(&self, handle: VarHandle) -> f64 {
        self.values.get(handle.index()).copied().unwrap_or(0.0)
    }

    /// Value of the variable registered under `key`, if the model has one.
    pub fn value_of(&self, model: &LinearModel, key: VarKey) -> Option<f64> {
        model.lookup(key).map(|h| self.value(h))
    }
}

/// A blocking LP backend. One call solves one model.
pub trait SolverAdapter: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    fn solve(&self, model: &LinearModel) -> Result<Solution, SolveFailure>;
}
