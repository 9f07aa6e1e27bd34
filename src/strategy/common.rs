// src/strategy/common.rs

//! LP pieces shared by every builder: stock chain, review-grid orders,
//! initial stock and the stock-flow balance.

use crate::model::lp::{ConstraintSense, LinearModel, VarHandle, VarKey, VariableKind};
use crate::simulation::config::PlanningConfig;
use crate::strategy::traits::BuildContext;

/// Right-hand side of a stock-flow balance.
#[derive(Debug, Clone, Copy)]
pub enum DemandTerm {
    /// Demand is a model variable (moved to the left with coefficient -1).
    Variable(VarHandle),
    /// Demand is a known number.
    Constant(f64),
}

pub fn stock_key(day: usize, scenario: Option<usize>) -> VarKey {
    keyed(VariableKind::Stock, day, scenario)
}

pub fn fault_key(day: usize, scenario: Option<usize>) -> VarKey {
    keyed(VariableKind::Fault, day, scenario)
}

fn keyed(kind: VariableKind, day: usize, scenario: Option<usize>) -> VarKey {
    match scenario {
        Some(k) => VarKey::scenario_daily(kind, day, k),
        None => VarKey::daily(kind, day),
    }
}

fn suffix(day: usize, scenario: Option<usize>) -> String {
    match scenario {
        Some(k) => format!("k{k}_{day}"),
        None => day.to_string(),
    }
}

/// Stock for every day of the horizon plus the closing day.
pub fn add_stock_variables(
    model: &mut LinearModel,
    config: &PlanningConfig,
    origin: usize,
    scenario: Option<usize>,
    objective: f64,
) {
    for day in origin..=origin + config.horizon {
        model.add_variable(stock_key(day, scenario), 0.0, f64::INFINITY, objective);
    }
}

/// One order variable per review-grid day inside the horizon.
pub fn add_reposition_variables(
    model: &mut LinearModel,
    config: &PlanningConfig,
    origin: usize,
    upper: f64,
    objective: f64,
) -> Vec<VarHandle> {
    config
        .reposition_days(origin, origin + config.horizon)
        .into_iter()
        .map(|day| {
            model.add_variable(
                VarKey::daily(VariableKind::Reposition, day),
                0.0,
                upper,
                objective,
            )
        })
        .collect()
}

/// Pins the first stock variable to the committed stock.
pub fn add_initial_stock_constraint(
    model: &mut LinearModel,
    origin: usize,
    scenario: Option<usize>,
    stock: f64,
) {
    if let Some(s0) = model.lookup(stock_key(origin, scenario)) {
        let name = match scenario {
            Some(k) => format!("initial_stock_k{k}"),
            None => "initial_stock".to_string(),
        };
        model.add_constraint(name, vec![(s0, 1.0)], ConstraintSense::Equal, stock);
    }
}

/// `stock(t) + fault(t) - stock(t+1) + reposition(t - lead_time + 1) = demand(t)`.
///
/// An order placed before the origin is already committed, so its value
/// moves to the right-hand side. Days off the review grid have no order term.
pub fn add_stock_flow_constraint(
    model: &mut LinearModel,
    config: &PlanningConfig,
    ctx: &BuildContext<'_>,
    day: usize,
    scenario: Option<usize>,
    demand: DemandTerm,
) {
    let mut terms = Vec::with_capacity(5);
    let mut rhs = 0.0;

    if let Some(s) = model.lookup(stock_key(day, scenario)) {
        terms.push((s, 1.0));
    }
    if let Some(f) = model.lookup(fault_key(day, scenario)) {
        terms.push((f, 1.0));
    }
    if let Some(next) = model.lookup(stock_key(day + 1, scenario)) {
        terms.push((next, -1.0));
    }

    if let Some(order_day) = config.order_day_for(day) {
        if order_day < ctx.origin {
            rhs -= ctx.committed(order_day);
        } else if let Some(r) = model.lookup(VarKey::daily(VariableKind::Reposition, order_day)) {
            terms.push((r, 1.0));
        }
    }

    match demand {
        DemandTerm::Variable(d) => terms.push((d, -1.0)),
        DemandTerm::Constant(value) => rhs += value,
    }

    model.add_constraint(
        format!("stock_flow_{}", suffix(day, scenario)),
        terms,
        ConstraintSense::Equal,
        rhs,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lp::ObjectiveSense;

    fn ctx(committed: &[f64]) -> BuildContext<'_> {
        BuildContext {
            origin: 3,
            initial_stock: 0.0,
            committed_repositions: committed,
            forecast: &[],
            scenarios: &[],
        }
    }

    #[test]
    fn committed_order_moves_to_rhs() {
        let config = PlanningConfig {
            horizon: 4,
            lead_time: 2,
            reposition_interval: 1,
            ..Default::default()
        };
        let committed = [0.0, 0.0, 7.0];
        let ctx = ctx(&committed);
        let mut model = LinearModel::new(ObjectiveSense::Maximize);
        add_stock_variables(&mut model, &config, 3, None, -1.0);
        add_reposition_variables(&mut model, &config, 3, f64::INFINITY, -40.0);

        // Day 3 is fed by the order of day 2, placed before the origin.
        add_stock_flow_constraint(&mut model, &config, &ctx, 3, None, DemandTerm::Constant(5.0));
        let c = model.constraint("stock_flow_3").unwrap();
        assert_eq!(c.rhs, -2.0);
        assert_eq!(c.terms.len(), 2);

        // Day 4 is fed by the order variable of day 3.
        add_stock_flow_constraint(&mut model, &config, &ctx, 4, None, DemandTerm::Constant(5.0));
        let c = model.constraint("stock_flow_4").unwrap();
        let r3 = model.lookup(VarKey::daily(VariableKind::Reposition, 3)).unwrap();
        assert!(c.terms.contains(&(r3, 1.0)));
        assert_eq!(c.rhs, 5.0);
    }

    #[test]
    fn scenario_variables_are_separate() {
        let config = PlanningConfig {
            horizon: 2,
            ..Default::default()
        };
        let mut model = LinearModel::new(ObjectiveSense::Maximize);
        add_stock_variables(&mut model, &config, 0, Some(0), -1.0);
        add_stock_variables(&mut model, &config, 0, Some(1), -1.0);
        add_initial_stock_constraint(&mut model, 0, Some(1), 9.0);

        assert_eq!(model.variables().len(), 6);
        assert!(model.constraint("initial_stock_k1").is_some());
        assert!(model.constraint("initial_stock").is_none());
    }
}
