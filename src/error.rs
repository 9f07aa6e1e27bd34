// src/error.rs

use crate::solver::SolveFailure;
use thiserror::Error;

/// Everything that can stop a planning run.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("invalid value for {field}: {reason}")]
    Config { field: &'static str, reason: String },

    /// The day index is the planning origin whose model could not be solved.
    #[error("solver failed on day {day}: {kind}")]
    Solver { day: usize, kind: SolveFailure },

    #[error("no scenario matches epigraph value {epigraph} on day {day}")]
    WorstCaseNotFound { day: usize, epigraph: f64 },

    #[error("invalid date '{value}' in demand file: {source}")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl PlannerError {
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
