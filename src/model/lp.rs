// src/model/lp.rs

//! Solver-independent linear model.
//!
//! Variables live in an arena and are addressed by [`VarHandle`]. A hash
//! index keyed by `(kind, day, scenario)` replaces name-based lookups, so
//! builders and the controller never parse variable names.

use std::collections::HashMap;
use std::fmt;

/// Position of a variable in its model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarHandle(usize);

impl VarHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Demand,
    Reposition,
    Stock,
    Fault,
    /// Budget multiplier of the inner worst-case problem, one per robust sub-period.
    BudgetDual,
    /// Per-day multiplier of the inner worst-case problem.
    DeviationDual,
    /// Worst-case demand excess left uncovered in a robust sub-period.
    Exposure,
    ScenarioCostPlus,
    ScenarioCostMinus,
    EpigraphPlus,
    EpigraphMinus,
}

impl VariableKind {
    fn prefix(self) -> &'static str {
        match self {
            VariableKind::Demand => "d",
            VariableKind::Reposition => "r",
            VariableKind::Stock => "s",
            VariableKind::Fault => "f",
            VariableKind::BudgetDual => "pi",
            VariableKind::DeviationDual => "gamma",
            VariableKind::Exposure => "e",
            VariableKind::ScenarioCostPlus => "cplus",
            VariableKind::ScenarioCostMinus => "cminus",
            VariableKind::EpigraphPlus => "zplus",
            VariableKind::EpigraphMinus => "zminus",
        }
    }
}

/// Lookup key of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarKey {
    pub kind: VariableKind,
    pub day: Option<usize>,
    pub scenario: Option<usize>,
}

impl VarKey {
    pub fn daily(kind: VariableKind, day: usize) -> Self {
        Self {
            kind,
            day: Some(day),
            scenario: None,
        }
    }

    pub fn scenario_daily(kind: VariableKind, day: usize, scenario: usize) -> Self {
        Self {
            kind,
            day: Some(day),
            scenario: Some(scenario),
        }
    }

    pub fn per_scenario(kind: VariableKind, scenario: usize) -> Self {
        Self {
            kind,
            day: None,
            scenario: Some(scenario),
        }
    }

    pub fn global(kind: VariableKind) -> Self {
        Self {
            kind,
            day: None,
            scenario: None,
        }
    }
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.prefix())?;
        if let Some(s) = self.scenario {
            write!(f, "_k{s}")?;
        }
        if let Some(d) = self.day {
            write!(f, "_{d}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionVariable {
    pub handle: VarHandle,
    pub key: VarKey,
    pub lower: f64,
    /// `f64::INFINITY` when unbounded above.
    pub upper: f64,
    pub objective: f64,
}

impl DecisionVariable {
    pub fn kind(&self) -> VariableKind {
        self.key.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    Equal,
    LessEqual,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(VarHandle, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Left-hand side evaluated at `values` (indexed by handle).
    pub fn lhs_at(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(h, c)| c * values.get(h.index()).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs_at(values);
        match self.sense {
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= tolerance,
            ConstraintSense::LessEqual => lhs <= self.rhs + tolerance,
            ConstraintSense::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

/// One planning day's LP, built fresh and consumed by a single solve.
#[derive(Debug, Clone)]
pub struct LinearModel {
    sense: ObjectiveSense,
    variables: Vec<DecisionVariable>,
    constraints: Vec<LinearConstraint>,
    index: HashMap<VarKey, VarHandle>,
}

impl LinearModel {
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            sense,
            variables: Vec::new(),
            constraints: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds a variable. A key that already exists keeps its first handle.
    pub fn add_variable(
        &mut self,
        key: VarKey,
        lower: f64,
        upper: f64,
        objective: f64,
    ) -> VarHandle {
        if let Some(&existing) = self.index.get(&key) {
            return existing;
        }
        let handle = VarHandle(self.variables.len());
        self.variables.push(DecisionVariable {
            handle,
            key,
            lower,
            upper,
            objective,
        });
        self.index.insert(key, handle);
        handle
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(VarHandle, f64)>,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            terms,
            sense,
            rhs,
        });
    }

    pub fn lookup(&self, key: VarKey) -> Option<VarHandle> {
        self.index.get(&key).copied()
    }

    pub fn variable(&self, handle: VarHandle) -> &DecisionVariable {
        &self.variables[handle.index()]
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn variables(&self) -> &[DecisionVariable] {
        &self.variables
    }

    pub fn variables_of(&self, kind: VariableKind) -> impl Iterator<Item = &DecisionVariable> {
        self.variables.iter().filter(move |v| v.kind() == kind)
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn objective_at(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .map(|v| v.objective * values.get(v.handle.index()).copied().unwrap_or(0.0))
            .sum()
    }
}
