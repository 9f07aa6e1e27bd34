// src/model/scenario.rs

use crate::error::{PlannerError, Result};
use crate::model::forecast::ForecastModel;
use crate::simulation::config::PlanningConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use rayon::prelude::*;
use std::ops::Range;

/// One sampled demand path over a planning horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub id: usize,
    pub origin_day: usize,
    /// Risk direction per horizon day, `risk[i]` belongs to `origin_day + i`.
    pub risk: Vec<f64>,
    pub forecast: Vec<f64>,
    pub max_forecast: f64,
}

impl Scenario {
    /// Forecast of an absolute day; zero outside the horizon.
    pub fn forecast_at(&self, day: usize) -> f64 {
        day.checked_sub(self.origin_day)
            .and_then(|i| self.forecast.get(i))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn total_forecast(&self) -> f64 {
        self.forecast.iter().sum()
    }
}

/// Samples budgeted demand scenarios around the nominal forecast.
pub struct ScenarioGenerator<'a> {
    forecast: ForecastModel<'a>,
    periods_len: usize,
    budget: f64,
    seed: u64,
    pool: rayon::ThreadPool,
}

impl<'a> ScenarioGenerator<'a> {
    pub fn new(forecast: ForecastModel<'a>, config: &PlanningConfig) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = config.worker_threads {
            builder = builder.num_threads(threads);
        }
        Ok(Self {
            forecast,
            periods_len: config.robust_interval,
            budget: config.pessimism,
            seed: config.seed,
            pool: builder.build()?,
        })
    }

    /// Draws `count` independent scenarios for planning origin `origin`.
    ///
    /// Each scenario owns an RNG seeded from `(seed, origin, id)`, so the
    /// result does not depend on how the pool schedules the work.
    pub fn generate(&self, origin: usize, count: usize) -> Result<Vec<Scenario>> {
        if count == 0 {
            return Err(PlannerError::config("scenario_count", "must be at least 1"));
        }
        let points = self.forecast.nominal(origin);
        let periods = self.periods(points.len());
        let seed_base = self.seed ^ ((origin as u64) << 32);

        let scenarios = self.pool.install(|| {
            (0..count)
                .into_par_iter()
                .map(|id| {
                    let mut rng = StdRng::seed_from_u64(seed_base.wrapping_add(id as u64));
                    let risk = budgeted_risk(&periods, points.len(), self.budget, &mut rng);
                    let forecast: Vec<f64> = points
                        .iter()
                        .zip(&risk)
                        .map(|(p, y)| (p.mean + p.deviation * y).max(0.0))
                        .collect();
                    let max_forecast = forecast.iter().copied().fold(0.0, f64::max);
                    Scenario {
                        id,
                        origin_day: origin,
                        risk,
                        forecast,
                        max_forecast,
                    }
                })
                .collect::<Vec<_>>()
        });
        Ok(scenarios)
    }

    /// Sub-periods as offsets into the horizon.
    fn periods(&self, len: usize) -> Vec<Range<usize>> {
        (0..len)
            .step_by(self.periods_len)
            .map(|start| start..(start + self.periods_len).min(len))
            .collect()
    }
}

/// Uniform(-1, 1) draws per day, rescaled so every sub-period's absolute
/// sum equals `budget`.
fn budgeted_risk(periods: &[Range<usize>], len: usize, budget: f64, rng: &mut StdRng) -> Vec<f64> {
    let unit = Uniform::new(-1.0, 1.0);
    let mut risk = vec![0.0; len];
    if budget == 0.0 {
        return risk;
    }
    for period in periods {
        let mut total: f64 = 0.0;
        // An all-zero draw cannot be rescaled; it has probability zero but redraw anyway.
        while total == 0.0 {
            for y in &mut risk[period.clone()] {
                *y = unit.sample(rng);
            }
            total = risk[period.clone()].iter().map(|y: &f64| y.abs()).sum();
        }
        let scale = budget / total;
        for y in &mut risk[period.clone()] {
            *y *= scale;
        }
    }
    risk
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::demand::DemandSource;

    fn config() -> PlanningConfig {
        PlanningConfig {
            horizon: 10,
            robust_interval: 3,
            pessimism: 1.5,
            uncertainty_rate: 0.2,
            worker_threads: Some(2),
            seed: 11,
            ..Default::default()
        }
    }

    #[test]
    fn every_sub_period_spends_the_whole_budget() {
        let source = DemandSource::from_demands(vec![10.0; 20]);
        let cfg = config();
        let generator = ScenarioGenerator::new(ForecastModel::new(&source, &cfg), &cfg).unwrap();
        let scenarios = generator.generate(4, 6).unwrap();

        assert_eq!(scenarios.len(), 6);
        for scenario in &scenarios {
            assert_eq!(scenario.risk.len(), 10);
            for period in [0..3, 3..6, 6..9, 9..10] {
                let spent: f64 = scenario.risk[period].iter().map(|y| y.abs()).sum();
                assert!((spent - 1.5).abs() < 1e-9, "spent {spent}");
            }
        }
    }

    #[test]
    fn forecasts_are_clamped_and_tracked() {
        let source = DemandSource::from_demands(vec![1.0; 20]);
        let cfg = PlanningConfig {
            uncertainty_rate: 5.0,
            pessimism: 3.0,
            ..config()
        };
        let generator = ScenarioGenerator::new(ForecastModel::new(&source, &cfg), &cfg).unwrap();
        for scenario in generator.generate(0, 8).unwrap() {
            assert!(scenario.forecast.iter().all(|&f| f >= 0.0));
            let max = scenario.forecast.iter().copied().fold(0.0, f64::max);
            assert_eq!(scenario.max_forecast, max);
            // No deviation on the origin day.
            assert_eq!(scenario.forecast_at(0), 1.0);
            assert_eq!(scenario.forecast_at(25), 0.0);
        }
    }

    #[test]
    fn generation_is_seeded_and_ids_are_ordered() {
        let source = DemandSource::from_demands(vec![10.0; 20]);
        let cfg = config();
        let generator = ScenarioGenerator::new(ForecastModel::new(&source, &cfg), &cfg).unwrap();

        let a = generator.generate(2, 5).unwrap();
        let b = generator.generate(2, 5).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iter().map(|s| s.id).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_ne!(a[0].risk, a[1].risk);
    }

    #[test]
    fn zero_budget_reproduces_the_mean() {
        let source = DemandSource::from_demands(vec![7.0; 20]);
        let cfg = PlanningConfig {
            pessimism: 0.0,
            ..config()
        };
        let generator = ScenarioGenerator::new(ForecastModel::new(&source, &cfg), &cfg).unwrap();
        let scenario = &generator.generate(0, 1).unwrap()[0];
        assert!(scenario.risk.iter().all(|&y| y == 0.0));
        assert!(scenario.forecast.iter().all(|&f| f == 7.0));
    }

    #[test]
    fn zero_count_is_rejected() {
        let source = DemandSource::from_demands(vec![7.0; 5]);
        let cfg = config();
        let generator = ScenarioGenerator::new(ForecastModel::new(&source, &cfg), &cfg).unwrap();
        assert!(generator.generate(0, 0).is_err());
    }
}
