//! Normality testing and threshold exceedance estimates.

use crate::stats::{compute_mean, compute_var, sorted};
use serde::{Deserialize, Serialize};
use statrs::distribution::ContinuousCDF;

pub const MIN_N_VALS: usize = 3;
/// Largest sample handed to the Shapiro-Wilk test; bigger channels are thinned.
pub const MAX_TEST_VALS: usize = 5000;

/// Outcome of a Shapiro-Wilk test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NormalityResult {
    pub statistic: f64,
    pub p_value: f64,
    pub is_normal: bool,
}

/// Shapiro-Wilk test of `vals` against normality at level `alpha`.
///
/// Returns `None` for fewer than [`MIN_N_VALS`] values. Channels longer than
/// [`MAX_TEST_VALS`] are tested on evenly spaced order statistics. When the
/// statistic is undefined (all values identical) the result is not normal and
/// carries `NaN`.
pub fn test_normality(vals: &[f64], alpha: f64) -> Option<NormalityResult> {
    if vals.len() < MIN_N_VALS {
        return None;
    }
    let test_vals = if vals.len() > MAX_TEST_VALS {
        thin_sorted(&sorted(vals), MAX_TEST_VALS)
    } else {
        vals.to_vec()
    };

    match ::normality::shapiro_wilk(test_vals) {
        Ok(result) if result.p_value.is_finite() => Some(NormalityResult {
            statistic: result.statistic,
            p_value: result.p_value,
            is_normal: result.p_value > alpha,
        }),
        _ => Some(NormalityResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
            is_normal: false,
        }),
    }
}

/// `n_keep` evenly spaced elements of `x`, first and last included.
fn thin_sorted(x: &[f64], n_keep: usize) -> Vec<f64> {
    let last = x.len() - 1;
    (0..n_keep).map(|i| x[i * last / (n_keep - 1)]).collect()
}

/// Probability that a channel exceeds a threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExceedanceEstimate {
    pub threshold: f64,
    /// Fraction of clean values strictly above the threshold (0 for an empty channel).
    pub empirical_prob: f64,
    /// `1 - Phi((threshold - mean) / std_dev)`, only when the channel looks normal.
    pub normal_prob: Option<f64>,
    pub normality: Option<NormalityResult>,
}

/// Estimate exceedance of `threshold` empirically and, if the values pass the
/// normality test at level `alpha`, analytically through `std_normal`.
pub fn estimate_exceedance<D>(
    vals: &[f64],
    threshold: f64,
    alpha: f64,
    std_normal: &D,
) -> ExceedanceEstimate
where
    D: ContinuousCDF<f64, f64>,
{
    let clean: Vec<f64> = vals.iter().copied().filter(|val| val.is_finite()).collect();

    let empirical_prob = if clean.is_empty() {
        0.0
    } else {
        clean.iter().filter(|&&val| val > threshold).count() as f64 / clean.len() as f64
    };

    let normality = test_normality(&clean, alpha);
    let normal_prob = match normality {
        Some(result) if result.is_normal => {
            let mean = compute_mean(&clean);
            let std_dev = compute_var(&clean).sqrt();
            if std_dev > 0.0 {
                let prob = std_normal.sf((threshold - mean) / std_dev);
                prob.is_finite().then_some(prob)
            } else {
                None
            }
        }
        _ => None,
    };

    ExceedanceEstimate {
        threshold,
        empirical_prob,
        normal_prob,
        normality,
    }
}
