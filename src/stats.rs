use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Descriptive statistics of a channel.
///
/// Every field is `NaN` when the channel is too short for it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatsSummary {
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std_dev: f64,
    pub skewness: f64,
}

/// Summarize raw values, discarding any that are not finite.
pub fn summarize(vals: &[f64]) -> StatsSummary {
    let clean: Vec<f64> = vals.iter().copied().filter(|val| val.is_finite()).collect();
    StatsSummary {
        mean: compute_mean(&clean),
        median: compute_median(&clean),
        mode: compute_mode(&clean),
        std_dev: compute_var(&clean).sqrt(),
        skewness: compute_skewness(&clean),
    }
}

pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

/// Sample variance (`n - 1` denominator).
pub fn compute_var(vals: &[f64]) -> f64 {
    let n_vals = vals.len();
    if n_vals < 2 {
        return f64::NAN;
    }
    let mean = compute_mean(vals);
    vals.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / (n_vals - 1) as f64
}

pub fn compute_median(vals: &[f64]) -> f64 {
    let n_vals = vals.len();
    if n_vals == 0 {
        return f64::NAN;
    }
    let sorted = sorted(vals);
    if n_vals % 2 == 0 {
        (sorted[n_vals / 2 - 1] + sorted[n_vals / 2]) / 2.0
    } else {
        sorted[n_vals / 2]
    }
}

/// Most frequent value; ties resolve to the smallest modal value.
pub fn compute_mode(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    let sorted = sorted(vals);

    let mut mode = sorted[0];
    let mut max_run = 0;
    let mut run = 0;
    for (idx, &val) in sorted.iter().enumerate() {
        if idx > 0 && val == sorted[idx - 1] {
            run += 1;
        } else {
            run = 1;
        }
        // Strict comparison keeps the earliest (smallest) value on ties.
        if run > max_run {
            max_run = run;
            mode = val;
        }
    }
    mode
}

/// Adjusted Fisher-Pearson sample skewness.
pub fn compute_skewness(vals: &[f64]) -> f64 {
    let n_vals = vals.len();
    if n_vals < 3 {
        return f64::NAN;
    }
    let mean = compute_mean(vals);
    let std_dev = compute_var(vals).sqrt();
    let diff_3_sum: f64 = vals.iter().map(|&val| (val - mean).powi(3)).sum();

    let n = n_vals as f64;
    let skewness = n * diff_3_sum / ((n - 1.0) * (n - 2.0) * std_dev.powi(3));
    if skewness.is_finite() {
        skewness
    } else {
        f64::NAN
    }
}

pub(crate) fn sorted(vals: &[f64]) -> Vec<f64> {
    let mut sorted = vals.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn empty_channel_is_all_nan() {
        let summary = summarize(&[]);
        assert!(summary.mean.is_nan());
        assert!(summary.median.is_nan());
        assert!(summary.mode.is_nan());
        assert!(summary.std_dev.is_nan());
        assert!(summary.skewness.is_nan());

        let summary = summarize(&[f64::NAN, f64::INFINITY]);
        assert!(summary.mean.is_nan());
        assert!(summary.mode.is_nan());
    }

    #[test]
    fn minimum_lengths_gate_each_statistic() {
        let summary = summarize(&[4.0]);
        assert_eq!(summary.mean, 4.0);
        assert_eq!(summary.median, 4.0);
        assert_eq!(summary.mode, 4.0);
        assert!(summary.std_dev.is_nan());
        assert!(summary.skewness.is_nan());

        let summary = summarize(&[4.0, 4.0]);
        assert_eq!(summary.mean, 4.0);
        assert_eq!(summary.std_dev, 0.0);
        assert!(summary.skewness.is_nan());
    }

    #[test]
    fn known_values() {
        let summary = summarize(&[1.0, 2.0, 3.0, 10.0]);
        assert!((summary.mean - 4.0).abs() < TOL);
        assert!((summary.median - 2.5).abs() < TOL);
        assert!((summary.std_dev - 4.082482904638630).abs() < 1e-9);
        assert!((summary.skewness - 1.763632614803888).abs() < 1e-9);
    }

    #[test]
    fn mode_prefers_most_frequent_then_smallest() {
        assert_eq!(compute_mode(&[3.0, 1.0, 3.0, 2.0]), 3.0);
        assert_eq!(compute_mode(&[5.0, 2.0, 5.0, 2.0, 9.0]), 2.0);
        assert_eq!(compute_mode(&[7.0, 6.0, 8.0]), 6.0);
    }

    #[test]
    fn constant_values_have_no_skewness() {
        let summary = summarize(&[2.0, 2.0, 2.0]);
        assert_eq!(summary.std_dev, 0.0);
        assert!(summary.skewness.is_nan());
    }

    #[test]
    fn non_finite_values_are_dropped() {
        let summary = summarize(&[1.0, f64::NAN, 3.0, f64::NEG_INFINITY]);
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.median, 2.0);
    }
}
