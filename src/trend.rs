use crate::time::minutes_to_hhmm;
use serde::{Deserialize, Serialize};

/// Value predicted by the trend line at a future time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Minutes after the last observation.
    pub offset: i64,
    /// Wall-clock label (`HH:mm`), wrapped modulo 24 h.
    pub label: String,
    pub value: f64,
}

/// Ordinary least-squares line `value = slope * minute + intercept`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit a line through `(minute, value)` pairs.
    ///
    /// Returns `None` with fewer than two pairs. If every minute is identical the
    /// line is undefined and all fields are `NaN`.
    pub fn fit(pairs: &[(i64, f64)]) -> Option<Self> {
        let n_pairs = pairs.len();
        if n_pairs < 2 {
            return None;
        }
        let n = n_pairs as f64;
        let x_mean = pairs.iter().map(|&(x, _)| x as f64).sum::<f64>() / n;
        let y_mean = pairs.iter().map(|&(_, y)| y).sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for &(x, y) in pairs {
            let dx = x as f64 - x_mean;
            sxx += dx * dx;
            sxy += dx * (y - y_mean);
        }
        if sxx == 0.0 {
            return Some(Self {
                slope: f64::NAN,
                intercept: f64::NAN,
                r_squared: f64::NAN,
            });
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        let mut fit = Self {
            slope,
            intercept,
            r_squared: f64::NAN,
        };
        fit.r_squared = fit.compute_r_squared(pairs, y_mean);
        Some(fit)
    }

    pub fn predict(&self, minute: i64) -> f64 {
        self.slope * minute as f64 + self.intercept
    }

    fn compute_r_squared(&self, pairs: &[(i64, f64)], y_mean: f64) -> f64 {
        let ss_res: f64 = pairs
            .iter()
            .map(|&(x, y)| (y - self.predict(x)).powi(2))
            .sum();
        let ss_tot: f64 = pairs.iter().map(|&(_, y)| (y - y_mean).powi(2)).sum();
        let r_squared = 1.0 - ss_res / ss_tot;
        if r_squared.is_finite() {
            r_squared
        } else {
            f64::NAN
        }
    }

    /// Evaluate the line at `last_minute + offset` for each offset.
    ///
    /// Non-finite predictions and minutes outside the `i64` range are dropped.
    pub fn forecast(&self, last_minute: i64, offsets: &[i64]) -> Vec<ForecastPoint> {
        offsets
            .iter()
            .filter_map(|&offset| {
                let minute = last_minute.checked_add(offset)?;
                let value = self.predict(minute);
                value.is_finite().then(|| ForecastPoint {
                    offset,
                    label: minutes_to_hhmm(minute),
                    value,
                })
            })
            .collect()
    }
}

/// Trend line of a channel and its forecasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n_pairs: usize,
    pub last_minute: Option<i64>,
    pub forecasts: Vec<ForecastPoint>,
    #[serde(skip)]
    pub fit: Option<LinearFit>,
}

/// Fit `(minute, value)` pairs, kept in input order, and forecast from the last pair.
pub fn fit_and_forecast(pairs: &[(i64, f64)], offsets: &[i64]) -> TrendResult {
    let last_minute = pairs.last().map(|&(minute, _)| minute);
    match (LinearFit::fit(pairs), last_minute) {
        (Some(fit), Some(last_minute)) => TrendResult {
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            n_pairs: pairs.len(),
            last_minute: Some(last_minute),
            forecasts: fit.forecast(last_minute, offsets),
            fit: Some(fit),
        },
        _ => TrendResult {
            slope: f64::NAN,
            intercept: f64::NAN,
            r_squared: f64::NAN,
            n_pairs: pairs.len(),
            last_minute,
            forecasts: Vec::new(),
            fit: None,
        },
    }
}
