// src/model/forecast.rs

use crate::io::demand::DemandSource;
use crate::simulation::config::PlanningConfig;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Demand estimate for `day` made on `origin_day`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub day: usize,
    pub origin_day: usize,
    pub mean: f64,
    /// Size of the uncertainty interval around `mean`.
    pub deviation: f64,
    /// Point forecast used by the deterministic model.
    pub value: f64,
}

/// Forecast error grows with the square root of the forecast lead.
pub fn deviation(realized: f64, uncertainty_rate: f64, origin_day: usize, day: usize) -> f64 {
    let lead = day.saturating_sub(origin_day) as f64;
    (realized * uncertainty_rate * lead.sqrt()).max(0.0)
}

/// Turns the demand history into per-day forecasts for a planning origin.
#[derive(Debug, Clone)]
pub struct ForecastModel<'a> {
    demand: &'a DemandSource,
    horizon: usize,
    uncertainty_rate: f64,
}

impl<'a> ForecastModel<'a> {
    pub fn new(demand: &'a DemandSource, config: &PlanningConfig) -> Self {
        Self {
            demand,
            horizon: config.horizon,
            uncertainty_rate: config.uncertainty_rate,
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Mean and deviation for every day in `[origin, origin + horizon)`;
    /// `value` equals the mean.
    pub fn nominal(&self, origin: usize) -> Vec<ForecastPoint> {
        (origin..origin + self.horizon)
            .map(|day| {
                let mean = self.demand.demand(day);
                ForecastPoint {
                    day,
                    origin_day: origin,
                    mean,
                    deviation: deviation(mean, self.uncertainty_rate, origin, day),
                    value: mean,
                }
            })
            .collect()
    }

    /// Like [`nominal`](Self::nominal) but `value` carries one normal draw
    /// per day with the day's deviation as standard deviation, clamped at zero.
    pub fn sampled<R: Rng + ?Sized>(&self, origin: usize, rng: &mut R) -> Vec<ForecastPoint> {
        self.nominal(origin)
            .into_iter()
            .map(|mut point| {
                // Normal::new only fails for a negative or non-finite sigma.
                if let Ok(noise) = Normal::new(0.0, point.deviation) {
                    if point.deviation > 0.0 {
                        point.value = (point.mean + noise.sample(rng)).max(0.0);
                    }
                }
                point
            })
            .collect()
    }
}
