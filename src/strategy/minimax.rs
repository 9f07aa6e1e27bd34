// src/strategy/minimax.rs

//! Scenario-sampling minimax model and worst-case scenario selection.

use crate::error::{PlannerError, Result};
use crate::model::lp::{ConstraintSense, LinearModel, ObjectiveSense, VarKey, VariableKind};
use crate::model::scenario::Scenario;
use crate::simulation::config::{PlanningConfig, PlanningMode};
use crate::solver::Solution;
use crate::strategy::common::{
    add_initial_stock_constraint, add_reposition_variables, add_stock_flow_constraint,
    add_stock_variables, fault_key, stock_key, DemandTerm,
};
use crate::strategy::traits::{BuildContext, ModelBuilder};
use tracing::debug;

/// Maximizes the worst profit over all sampled scenarios.
///
/// Orders are shared, stock and fault are per scenario. Each scenario's
/// profit is captured by a free aggregator written as a plus/minus pair, and
/// a shared epigraph pair is held below every aggregator.
#[derive(Debug, Clone)]
pub struct ScenarioRobustBuilder {
    config: PlanningConfig,
}

impl ScenarioRobustBuilder {
    pub fn new(config: PlanningConfig) -> Self {
        Self { config }
    }
}

impl ModelBuilder for ScenarioRobustBuilder {
    fn mode(&self) -> PlanningMode {
        PlanningMode::ScenarioRobust
    }

    fn needs_scenarios(&self) -> bool {
        true
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<LinearModel> {
        let cfg = &self.config;
        if ctx.scenarios.is_empty() {
            return Err(PlannerError::config(
                "scenario_count",
                "scenario-robust model needs at least one scenario",
            ));
        }
        let mut model = LinearModel::new(ObjectiveSense::Maximize);
        let horizon = ctx.origin..ctx.origin + cfg.horizon;

        // A single order has to last one review interval in any scenario.
        let max_forecast = ctx
            .scenarios
            .iter()
            .map(|s| s.max_forecast)
            .fold(0.0, f64::max);
        let orders = add_reposition_variables(
            &mut model,
            cfg,
            ctx.origin,
            max_forecast * cfg.reposition_interval as f64,
            0.0,
        );

        let epi_plus = model.add_variable(
            VarKey::global(VariableKind::EpigraphPlus),
            0.0,
            f64::INFINITY,
            1.0,
        );
        let epi_minus = model.add_variable(
            VarKey::global(VariableKind::EpigraphMinus),
            0.0,
            f64::INFINITY,
            -1.0,
        );

        for scenario in ctx.scenarios {
            let k = Some(scenario.id);
            for t in horizon.clone() {
                model.add_variable(fault_key(t, k), 0.0, scenario.forecast_at(t), 0.0);
            }
            add_stock_variables(&mut model, cfg, ctx.origin, k, 0.0);
            add_initial_stock_constraint(&mut model, ctx.origin, k, ctx.initial_stock);
            for t in horizon.clone() {
                let demand = DemandTerm::Constant(scenario.forecast_at(t));
                add_stock_flow_constraint(&mut model, cfg, ctx, t, k, demand);
            }

            // cost+ - cost- + unit_cost*sum(r) + shortage*sum(f_k) + holding*sum(s_k)
            //   = price * sum(forecast_k)
            let cost_plus = model.add_variable(
                VarKey::per_scenario(VariableKind::ScenarioCostPlus, scenario.id),
                0.0,
                f64::INFINITY,
                0.0,
            );
            let cost_minus = model.add_variable(
                VarKey::per_scenario(VariableKind::ScenarioCostMinus, scenario.id),
                0.0,
                f64::INFINITY,
                0.0,
            );
            let mut terms = vec![(cost_plus, 1.0), (cost_minus, -1.0)];
            terms.extend(orders.iter().map(|&r| (r, cfg.unit_cost)));
            for t in horizon.clone() {
                if let Some(f) = model.lookup(fault_key(t, k)) {
                    terms.push((f, cfg.shortage_cost));
                }
            }
            for t in ctx.origin..=ctx.origin + cfg.horizon {
                if let Some(s) = model.lookup(stock_key(t, k)) {
                    terms.push((s, cfg.holding_cost));
                }
            }
            let revenue: f64 = horizon.clone().map(|t| scenario.forecast_at(t)).sum::<f64>()
                * cfg.unit_price;
            model.add_constraint(
                format!("scenario_cost_k{}", scenario.id),
                terms,
                ConstraintSense::Equal,
                revenue,
            );

            model.add_constraint(
                format!("epigraph_k{}", scenario.id),
                vec![
                    (epi_plus, 1.0),
                    (epi_minus, -1.0),
                    (cost_plus, -1.0),
                    (cost_minus, 1.0),
                ],
                ConstraintSense::LessEqual,
                0.0,
            );
        }

        debug!(
            day = ctx.origin,
            scenarios = ctx.scenarios.len(),
            variables = model.variables().len(),
            constraints = model.constraints().len(),
            "built scenario-robust model"
        );
        Ok(model)
    }
}

/// Aggregated profit of one scenario in a solved minimax model.
pub fn scenario_value(model: &LinearModel, solution: &Solution, scenario: usize) -> Option<f64> {
    let plus_key = VarKey::per_scenario(VariableKind::ScenarioCostPlus, scenario);
    let minus_key = VarKey::per_scenario(VariableKind::ScenarioCostMinus, scenario);
    let plus = solution.value_of(model, plus_key)?;
    let minus = solution.value_of(model, minus_key)?;
    Some(plus - minus)
}

/// Value of the shared epigraph variable in a solved minimax model.
pub fn epigraph_value(model: &LinearModel, solution: &Solution) -> Option<f64> {
    let plus = solution.value_of(model, VarKey::global(VariableKind::EpigraphPlus))?;
    let minus = solution.value_of(model, VarKey::global(VariableKind::EpigraphMinus))?;
    Some(plus - minus)
}

/// Finds the scenario whose aggregated profit is binding in the epigraph.
#[derive(Debug, Clone, Copy)]
pub struct WorstCaseSelector {
    /// Relative tolerance, scaled by `max(1, |epigraph|)`.
    pub tolerance: f64,
}

impl Default for WorstCaseSelector {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

impl WorstCaseSelector {
    /// First scenario, in enumeration order, matching the epigraph value.
    pub fn select<'s>(
        &self,
        model: &LinearModel,
        solution: &Solution,
        scenarios: &'s [Scenario],
    ) -> Option<&'s Scenario> {
        let epigraph = epigraph_value(model, solution)?;
        let tolerance = self.tolerance * epigraph.abs().max(1.0);
        scenarios.iter().find(|s| {
            scenario_value(model, solution, s.id)
                .map_or(false, |v| (v - epigraph).abs() <= tolerance)
        })
    }
}
