use crate::analysis::{ChannelReport, Report};
use crate::sample::Channel;

pub const PLACEHOLDER: &str = "--";

/// Format a statistic with two decimals, or the placeholder if unavailable.
pub fn format_stat(val: f64, unit: &str) -> String {
    if val.is_finite() {
        format!("{val:.2}{unit}")
    } else {
        PLACEHOLDER.to_string()
    }
}

/// Format a fraction as a percentage with two decimals.
pub fn format_percent(frac: f64) -> String {
    format_stat(100.0 * frac, "%")
}

/// Forecast horizon as `N h` for whole hours, `N min` otherwise.
pub fn format_horizon(minutes: i64) -> String {
    if minutes % 60 == 0 {
        format!("{} h", minutes / 60)
    } else {
        format!("{minutes} min")
    }
}

/// Legend lines of one channel.
pub fn legend(report: &ChannelReport) -> Vec<String> {
    let unit = report.channel.unit();
    let stats = &report.stats;
    let (fcst_label, fcst_value) = match &report.headline {
        Some(point) => (point.label.as_str(), point.value),
        None => (PLACEHOLDER, f64::NAN),
    };
    let exc = &report.exceedance;
    let normal_prob = match exc.normal_prob {
        Some(prob) => format_percent(prob),
        None => "distribution not normal".to_string(),
    };

    vec![
        format!("Mean: {}", format_stat(stats.mean, unit)),
        format!("Median: {}", format_stat(stats.median, unit)),
        format!("Mode: {}", format_stat(stats.mode, unit)),
        format!("Std Dev: {}", format_stat(stats.std_dev, "")),
        format!("Skewness: {}", format_stat(stats.skewness, "")),
        format!("Regression: {}", format_percent(report.trend.r_squared)),
        format!(
            "Forecast ({} - {fcst_label}): {}",
            format_horizon(report.headline_offset),
            format_stat(fcst_value, unit)
        ),
        format!(
            "P(> {}): {} observed, {normal_prob}",
            format_stat(exc.threshold, unit),
            format_percent(exc.empirical_prob),
        ),
    ]
}

/// Human-readable rendering of a whole report.
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    for (idx, channel) in Channel::ALL.iter().enumerate() {
        let Some(channel_report) = report.channel(*channel) else {
            continue;
        };
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(channel.name());
        out.push('\n');
        for line in legend(channel_report) {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out
}
