// src/strategy/implementations.rs

use crate::error::Result;
use crate::model::lp::{ConstraintSense, LinearModel, ObjectiveSense, VarKey, VariableKind};
use crate::simulation::config::{BudgetSense, PlanningConfig, PlanningMode};
use crate::solver::Solution;
use crate::strategy::common::{
    add_initial_stock_constraint, add_reposition_variables, add_stock_flow_constraint,
    add_stock_variables, fault_key, stock_key, DemandTerm,
};
use crate::strategy::traits::{BuildContext, ModelBuilder};
use tracing::debug;

// =========================================================================
// 1. Deterministic Builder
// =========================================================================

/// Plans against a single point forecast.
///
/// Demand variables are pinned to the forecast, so the only real decisions
/// are the orders on review days.
#[derive(Debug, Clone)]
pub struct DeterministicBuilder {
    config: PlanningConfig,
}

impl DeterministicBuilder {
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }
}

impl ModelBuilder for DeterministicBuilder {
    fn mode(&self) -> PlanningMode {
        PlanningMode::Deterministic
    }

    fn perturbs_forecast(&self) -> bool {
        true
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<LinearModel> {
        let cfg = &self.config;
        let mut model = LinearModel::new(ObjectiveSense::Maximize);

        let mut demand = Vec::with_capacity(ctx.forecast.len());
        for point in ctx.forecast {
            let d = model.add_variable(
                VarKey::daily(VariableKind::Demand, point.day),
                point.value,
                point.value,
                cfg.unit_price,
            );
            demand.push((point.day, d));
            model.add_variable(fault_key(point.day, None), 0.0, point.value, -cfg.shortage_cost);
        }
        add_stock_variables(&mut model, cfg, ctx.origin, None, -cfg.holding_cost);
        add_reposition_variables(&mut model, cfg, ctx.origin, f64::INFINITY, -cfg.unit_cost);

        add_initial_stock_constraint(&mut model, ctx.origin, None, ctx.initial_stock);
        for (day, d) in demand {
            add_stock_flow_constraint(&mut model, cfg, ctx, day, None, DemandTerm::Variable(d));
        }

        debug!(
            day = ctx.origin,
            variables = model.variables().len(),
            constraints = model.constraints().len(),
            "built deterministic model"
        );
        Ok(model)
    }
}

// =========================================================================
// 2. Interval-Robust Builder (budget of uncertainty)
// =========================================================================

/// Plans against the worst demand deviation a budgeted interval allows.
///
/// Inside a robust sub-period `p` the adversary picks `y(t)` in `[0, 1]`
/// with `multiplier * sum(y)` compared with the pessimism budget `G` using
/// the configured sense, and moves demand by `deviation(t) * y(t)`. The
/// inner worst case `max sum(deviation(t) * y(t))` is replaced by its dual
///
/// ```text
/// min G * pi(p) + sum(gamma(t))
/// s.t. multiplier * pi(p) + gamma(t) >= deviation(t),  gamma(t) >= 0
/// ```
///
/// with `pi(p) >= 0` for an upper budget, `<= 0` for a lower one and free
/// for an exact one. The dual value is charged twice: once as revenue lost
/// at `unit_price`, and once as a stock cover every closing stock of the
/// sub-period has to hold, where the uncovered part (`exposure`) costs
/// `shortage_cost`. Demand itself stays at the nominal mean.
#[derive(Debug, Clone)]
pub struct IntervalRobustBuilder {
    config: PlanningConfig,
}

impl IntervalRobustBuilder {
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }

    fn budget_dual_bounds(&self) -> (f64, f64) {
        match self.config.robust_constraint_sense {
            BudgetSense::AtMost => (0.0, f64::INFINITY),
            BudgetSense::AtLeast => (f64::NEG_INFINITY, 0.0),
            BudgetSense::Exactly => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

impl ModelBuilder for IntervalRobustBuilder {
    fn mode(&self) -> PlanningMode {
        PlanningMode::IntervalRobust
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<LinearModel> {
        let cfg = &self.config;
        let mut model = LinearModel::new(ObjectiveSense::Maximize);

        let mut demand = Vec::with_capacity(ctx.forecast.len());
        for point in ctx.forecast {
            let d = model.add_variable(
                VarKey::daily(VariableKind::Demand, point.day),
                point.mean,
                point.mean,
                cfg.unit_price,
            );
            demand.push((point.day, d));
            model.add_variable(fault_key(point.day, None), 0.0, point.mean, -cfg.shortage_cost);
        }
        add_stock_variables(&mut model, cfg, ctx.origin, None, -cfg.holding_cost);
        add_reposition_variables(&mut model, cfg, ctx.origin, f64::INFINITY, -cfg.unit_cost);

        add_initial_stock_constraint(&mut model, ctx.origin, None, ctx.initial_stock);
        for &(day, d) in &demand {
            add_stock_flow_constraint(&mut model, cfg, ctx, day, None, DemandTerm::Variable(d));
        }

        let (pi_lower, pi_upper) = self.budget_dual_bounds();
        for period in cfg.robust_periods(ctx.origin) {
            let start = period.start;
            let budget = period_budget(cfg, period.len());
            let pi = model.add_variable(
                VarKey::daily(VariableKind::BudgetDual, start),
                pi_lower,
                pi_upper,
                -cfg.unit_price * budget,
            );
            let exposure = model.add_variable(
                VarKey::daily(VariableKind::Exposure, start),
                0.0,
                f64::INFINITY,
                -cfg.shortage_cost,
            );

            // Cover of day t: G * pi + gamma over the sub-period up to t.
            let mut cover = vec![(pi, -budget)];
            for t in period {
                let deviation = ctx
                    .forecast
                    .iter()
                    .find(|point| point.day == t)
                    .map_or(0.0, |point| point.deviation);
                let gamma = model.add_variable(
                    VarKey::daily(VariableKind::DeviationDual, t),
                    0.0,
                    f64::INFINITY,
                    -cfg.unit_price,
                );
                model.add_constraint(
                    format!("robust_dual_{t}"),
                    vec![(pi, cfg.robust_constraint_multiplier), (gamma, 1.0)],
                    ConstraintSense::GreaterEqual,
                    deviation,
                );
                cover.push((gamma, -1.0));

                if let Some(closing) = model.lookup(stock_key(t + 1, None)) {
                    let mut terms = cover.clone();
                    terms.push((closing, 1.0));
                    terms.push((exposure, 1.0));
                    model.add_constraint(
                        format!("robust_cover_{t}"),
                        terms,
                        ConstraintSense::GreaterEqual,
                        0.0,
                    );
                }
            }
        }

        debug!(
            day = ctx.origin,
            variables = model.variables().len(),
            constraints = model.constraints().len(),
            "built interval-robust model"
        );
        Ok(model)
    }
}

/// Budget of one sub-period. `y <= 1` caps what the adversary can spend,
/// which keeps lower and exact budgets feasible on a short trailing period.
fn period_budget(config: &PlanningConfig, days: usize) -> f64 {
    config
        .pessimism
        .min(config.robust_constraint_multiplier * days as f64)
}

/// Worst-case demand excess the solved interval model protects against in
/// the sub-period starting at `start`, i.e. the dual value `G * pi + sum(gamma)`.
pub fn protected_deviation(
    model: &LinearModel,
    solution: &Solution,
    config: &PlanningConfig,
    start: usize,
    days: usize,
) -> Option<f64> {
    let budget = period_budget(config, days);
    let pi = solution.value_of(model, VarKey::daily(VariableKind::BudgetDual, start))?;
    let gamma: f64 = (start..start + days)
        .filter_map(|t| solution.value_of(model, VarKey::daily(VariableKind::DeviationDual, t)))
        .sum();
    Some(budget * pi + gamma)
}
