// src/solver/good_lp_backend.rs

//! [`SolverAdapter`] backed by `good_lp` and its pure-Rust `minilp` solver.

use good_lp::solvers::minilp::minilp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution as _,
    SolverModel, Variable,
};
use tracing::debug;

use super::{SolveFailure, SolveStatus, Solution, SolverAdapter};
use crate::model::lp::{ConstraintSense, LinearModel, ObjectiveSense};

#[derive(Debug, Default, Clone)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl SolverAdapter for GoodLpSolver {
    fn name(&self) -> &'static str {
        "minilp"
    }

    fn solve(&self, model: &LinearModel) -> Result<Solution, SolveFailure> {
        if model.variables().is_empty() {
            return Ok(Solution {
                status: SolveStatus::Optimal,
                objective_value: 0.0,
                values: vec![],
            });
        }

        let mut vars = ProblemVariables::new();
        let columns: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| {
                let mut def = variable();
                if v.lower.is_finite() {
                    def = def.min(v.lower);
                }
                if v.upper.is_finite() {
                    def = def.max(v.upper);
                }
                vars.add(def)
            })
            .collect();

        let objective: Expression = model
            .variables()
            .iter()
            .zip(&columns)
            .map(|(v, x)| v.objective * *x)
            .sum();

        let unsolved = match model.sense() {
            ObjectiveSense::Maximize => vars.maximise(&objective),
            ObjectiveSense::Minimize => vars.minimise(&objective),
        };
        let mut problem = unsolved.using(minilp);

        for c in model.constraints() {
            let lhs: Expression = c
                .terms
                .iter()
                .map(|(h, coef)| *coef * columns[h.index()])
                .sum();
            let rhs = c.rhs;
            problem = match c.sense {
                ConstraintSense::Equal => problem.with(constraint!(lhs == rhs)),
                ConstraintSense::LessEqual => problem.with(constraint!(lhs <= rhs)),
                ConstraintSense::GreaterEqual => problem.with(constraint!(lhs >= rhs)),
            };
        }

        debug!(
            variables = columns.len(),
            constraints = model.constraints().len(),
            "solving model"
        );

        let solved = problem.solve().map_err(|e| match e {
            ResolutionError::Infeasible => SolveFailure::Infeasible,
            ResolutionError::Unbounded => SolveFailure::Unbounded,
            other => SolveFailure::Numerical(other.to_string()),
        })?;

        let values: Vec<f64> = columns.iter().map(|x| solved.value(*x)).collect();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SolveFailure::Numerical("non-finite variable value".into()));
        }

        Ok(Solution {
            status: SolveStatus::Optimal,
            objective_value: model.objective_at(&values),
            values,
        })
    }
}
