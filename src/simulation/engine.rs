// src/simulation/engine.rs

use crate::error::{PlannerError, Result};
use crate::io::demand::DemandSource;
use crate::model::forecast::{ForecastModel, ForecastPoint};
use crate::model::lp::{LinearModel, VarKey, VariableKind};
use crate::model::scenario::{Scenario, ScenarioGenerator};
use crate::simulation::config::{PlanningConfig, PlanningMode};
use crate::simulation::state::{PlanningState, Transition};
use crate::solver::{Solution, SolverAdapter};
use crate::strategy::common::{fault_key, stock_key};
use crate::strategy::minimax::{epigraph_value, WorstCaseSelector};
use crate::strategy::traits::{BuildContext, ModelBuilder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

/// Planned values for one future day, as seen from a planning origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDay {
    pub day: usize,
    pub demand: f64,
    pub reposition: f64,
    pub stock: f64,
    pub fault: f64,
}

/// Model and optimal point of one planning day.
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub day: usize,
    pub model: LinearModel,
    pub solution: Solution,
    pub forecast: Vec<ForecastPoint>,
    /// Binding scenario of the minimax model.
    pub worst_case: Option<Scenario>,
}

impl DayPlan {
    /// Order the model wants to place on its origin day.
    pub fn reposition_decision(&self) -> f64 {
        self.solution
            .value_of(&self.model, VarKey::daily(VariableKind::Reposition, self.day))
            .unwrap_or(0.0)
            .max(0.0)
    }

    /// Planned fault of the origin day.
    pub fn planned_fault(&self) -> f64 {
        let scenario = self.worst_case.as_ref().map(|s| s.id);
        self.solution
            .value_of(&self.model, fault_key(self.day, scenario))
            .unwrap_or(0.0)
    }

    /// Stock, fault and orders over the built horizon. For the minimax model
    /// the worst-case scenario's path is reported.
    pub fn trajectory(&self) -> Vec<PlannedDay> {
        let scenario = self.worst_case.as_ref().map(|s| s.id);
        let value = |key: VarKey| self.solution.value_of(&self.model, key).unwrap_or(0.0);
        self.forecast
            .iter()
            .map(|point| {
                let t = point.day;
                let demand = match &self.worst_case {
                    Some(s) => s.forecast_at(t),
                    None => value(VarKey::daily(VariableKind::Demand, t)),
                };
                PlannedDay {
                    day: t,
                    demand,
                    reposition: value(VarKey::daily(VariableKind::Reposition, t)),
                    stock: value(stock_key(t, scenario)),
                    fault: value(fault_key(t, scenario)),
                }
            })
            .collect()
    }
}

/// One committed planning day.
#[derive(Debug, Clone)]
pub struct DayRecord {
    pub day: usize,
    pub demand: f64,
    pub objective: f64,
    pub reposition: f64,
    /// Committed stock at the start of the day.
    pub stock: f64,
    /// Fault the model planned for this day.
    pub fault: f64,
    pub closing_stock: f64,
    /// Realized shortfall when closing the day (negative or zero).
    pub shortfall: f64,
    pub profit: f64,
    pub cumulative_profit: f64,
    pub worst_scenario: Option<usize>,
    pub trajectory: Option<Vec<PlannedDay>>,
}

/// Rolling-horizon loop: plan, commit today's order, realize demand, advance.
pub struct RollingHorizonController<'a> {
    config: PlanningConfig,
    demand: &'a DemandSource,
    forecast: ForecastModel<'a>,
    generator: Option<ScenarioGenerator<'a>>,
    builder: Box<dyn ModelBuilder>,
    solver: Box<dyn SolverAdapter>,
    selector: WorstCaseSelector,

    pub state: PlanningState,
    pub history: Vec<DayRecord>,
}

impl<'a> RollingHorizonController<'a> {
    pub fn new(
        config: PlanningConfig,
        demand: &'a DemandSource,
        builder: Box<dyn ModelBuilder>,
        solver: Box<dyn SolverAdapter>,
    ) -> Result<Self> {
        config.validate()?;

        let forecast = ForecastModel::new(demand, &config);
        let generator = if builder.needs_scenarios() {
            Some(ScenarioGenerator::new(forecast.clone(), &config)?)
        } else {
            None
        };
        let initial_stock = config
            .initial_stock
            .unwrap_or_else(|| demand.initial_stock(config.initial_day, config.initial_stock_days));
        let state = PlanningState::new(&config, initial_stock);

        info!(
            mode = builder.mode().label(),
            solver = solver.name(),
            initial_day = config.initial_day,
            final_day = config.final_day(),
            initial_stock,
            "planner ready"
        );

        Ok(Self {
            config,
            demand,
            forecast,
            generator,
            builder,
            solver,
            selector: WorstCaseSelector::default(),
            state,
            history: Vec::new(),
        })
    }

    pub fn mode(&self) -> PlanningMode {
        self.builder.mode()
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// Runs every remaining day. On error the history keeps the days
    /// committed before the failing one.
    pub fn run(&mut self) -> Result<()> {
        while !self.state.is_finished() {
            self.step()?;
        }
        info!(
            mode = self.mode().label(),
            days = self.history.len(),
            profit = self.total_profit(),
            "run complete"
        );
        Ok(())
    }

    /// Builds and solves the model of the current day without committing it.
    pub fn plan_current_day(&self) -> Result<DayPlan> {
        self.plan_day(self.state.current_day)
    }

    fn plan_day(&self, day: usize) -> Result<DayPlan> {
        let forecast = if self.builder.perturbs_forecast() {
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(day as u64));
            self.forecast.sampled(day, &mut rng)
        } else {
            self.forecast.nominal(day)
        };
        let scenarios = match &self.generator {
            Some(generator) => generator.generate(day, self.config.scenario_count)?,
            None => Vec::new(),
        };

        let ctx = BuildContext {
            origin: day,
            initial_stock: self.state.stock_at(day),
            committed_repositions: &self.state.committed_repositions,
            forecast: &forecast,
            scenarios: &scenarios,
        };
        let model = self.builder.build(&ctx)?;

        let solution = self.solver.solve(&model).map_err(|kind| {
            error!(day, %kind, "solver failed, aborting run");
            PlannerError::Solver { day, kind }
        })?;

        let worst_case = if self.builder.needs_scenarios() {
            match self.selector.select(&model, &solution, &scenarios) {
                Some(s) => Some(s.clone()),
                None => {
                    return Err(PlannerError::WorstCaseNotFound {
                        day,
                        epigraph: epigraph_value(&model, &solution).unwrap_or(f64::NAN),
                    })
                }
            }
        } else {
            None
        };

        Ok(DayPlan {
            day,
            model,
            solution,
            forecast,
            worst_case,
        })
    }

    /// Plans and commits the current day.
    pub fn step(&mut self) -> Result<&DayRecord> {
        let day = self.state.current_day;
        let plan = self.plan_day(day)?;

        let reposition = if self.config.is_reposition_day(day) {
            plan.reposition_decision()
        } else {
            0.0
        };
        self.state.commit_reposition(day, reposition);

        let opening_stock = self.state.stock_at(day);
        let realized = self.demand.demand(day);
        let transition = self.state.advance(&self.config, realized);
        if transition.shortfall < 0.0 {
            warn!(day, shortfall = transition.shortfall, "demand exceeded available stock");
        }

        let profit = self.realized_profit(realized, reposition, &transition);
        let cumulative_profit = self.total_profit() + profit;

        info!(
            day,
            reposition,
            stock = opening_stock,
            objective = plan.solution.objective_value,
            "committed day"
        );

        self.history.push(DayRecord {
            day,
            demand: realized,
            objective: plan.solution.objective_value,
            reposition,
            stock: opening_stock,
            fault: plan.planned_fault(),
            closing_stock: transition.stock,
            shortfall: transition.shortfall,
            profit,
            cumulative_profit,
            worst_scenario: plan.worst_case.as_ref().map(|s| s.id),
            trajectory: self.config.record_trajectories.then(|| plan.trajectory()),
        });
        Ok(&self.history[self.history.len() - 1])
    }

    fn realized_profit(
        &self,
        realized: f64,
        reposition: f64,
        transition: &Transition,
    ) -> f64 {
        let unmet = -transition.shortfall;
        let served = realized - unmet;
        self.config.unit_price * served
            - self.config.unit_cost * reposition
            - self.config.holding_cost * transition.stock
            - self.config.shortage_cost * unmet
    }

    pub fn total_profit(&self) -> f64 {
        self.history.last().map_or(0.0, |r| r.cumulative_profit)
    }

    pub fn total_shortfall(&self) -> f64 {
        self.history.iter().map(|r| r.shortfall).sum()
    }

    pub fn total_ordered(&self) -> f64 {
        self.history.iter().map(|r| r.reposition).sum()
    }
}
