use crate::trend::{ForecastPoint, LinearFit};
use serde::{Deserialize, Serialize};

/// Vertical extent of a forecast series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Short-horizon forecast of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
    /// `None` for an empty series; widened by one unit each way when flat.
    pub range: Option<ValueRange>,
}

impl ForecastSeries {
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            range: None,
        }
    }
}

pub fn build_forecast_series(fit: &LinearFit, last_minute: i64, offsets: &[i64]) -> ForecastSeries {
    let points = fit.forecast(last_minute, offsets);
    let range = compute_range(&points);
    ForecastSeries { points, range }
}

fn compute_range(points: &[ForecastPoint]) -> Option<ValueRange> {
    if points.is_empty() {
        return None;
    }
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Some(ValueRange {
            min: min - 1.0,
            max: max + 1.0,
        });
    }
    Some(ValueRange { min, max })
}
