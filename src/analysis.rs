use crate::config::Config;
use crate::forecast::{ForecastSeries, build_forecast_series};
use crate::normality::{ExceedanceEstimate, estimate_exceedance};
use crate::sample::{Channel, Sample};
use crate::stats::{StatsSummary, summarize};
use crate::time::TimeNormalizer;
use crate::trend::{ForecastPoint, TrendResult, fit_and_forecast};
use anyhow::{Context, Result};
use serde::Serialize;
use statrs::distribution::Normal;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub channel: Channel,
    pub n_vals: usize,
    pub stats: StatsSummary,
    pub trend: TrendResult,
    pub headline_offset: i64,
    pub headline: Option<ForecastPoint>,
    pub series: ForecastSeries,
    pub exceedance: ExceedanceEstimate,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub n_samples: usize,
    pub channels: Vec<ChannelReport>,
}

impl Report {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelReport> {
        self.channels.iter().find(|report| report.channel == channel)
    }
}

pub struct Analyzer {
    cfg: Config,
    normalizer: TimeNormalizer,
    std_normal: Normal,
}

impl Analyzer {
    pub fn new(cfg: Config) -> Result<Self> {
        let zone = cfg.clock_zone().context("failed to resolve clock zone")?;
        let normalizer = TimeNormalizer::new(zone, cfg.time.strict_clock);
        Ok(Self {
            cfg,
            normalizer,
            std_normal: Normal::standard(),
        })
    }

    pub fn analyze(&self, samples: &[Sample]) -> Report {
        let minutes: Vec<Option<i64>> = samples
            .iter()
            .map(|sample| self.normalizer.normalize_minutes(sample))
            .collect();
        let n_unparsed = minutes.iter().filter(|minute| minute.is_none()).count();
        if n_unparsed > 0 {
            log::warn!("{n_unparsed} of {} timestamps could not be parsed", samples.len());
        }

        let channels = Channel::ALL
            .iter()
            .map(|&channel| self.analyze_channel(channel, samples, &minutes))
            .collect();

        Report {
            n_samples: samples.len(),
            channels,
        }
    }

    fn analyze_channel(
        &self,
        channel: Channel,
        samples: &[Sample],
        minutes: &[Option<i64>],
    ) -> ChannelReport {
        let vals = channel.values(samples);
        log::debug!("{} has {} clean values", channel.name(), vals.len());

        let pairs = collect_pairs(channel, samples, minutes);
        if pairs.windows(2).any(|pair| pair[1].0 < pair[0].0) {
            log::warn!("{} minutes are not monotonic in sample order", channel.name());
        }

        let fcst_cfg = &self.cfg.forecast;
        let trend = fit_and_forecast(&pairs, &[fcst_cfg.headline_offset]);
        let headline = trend.forecasts.first().cloned();

        let series = match (&trend.fit, trend.last_minute) {
            (Some(fit), Some(last_minute)) => {
                build_forecast_series(fit, last_minute, &fcst_cfg.series_offsets)
            }
            _ => ForecastSeries::empty(),
        };

        let exc_cfg = &self.cfg.exceedance;
        let exceedance =
            estimate_exceedance(&vals, exc_cfg.threshold, exc_cfg.alpha, &self.std_normal);
        if let Some(normality) = exceedance.normality {
            log::debug!("{} normality p-value: {}", channel.name(), normality.p_value);
        }

        ChannelReport {
            channel,
            n_vals: vals.len(),
            stats: summarize(&vals),
            trend,
            headline_offset: fcst_cfg.headline_offset,
            headline,
            series,
            exceedance,
        }
    }

    pub fn analyze_file<P: AsRef<Path>>(&self, file: P) -> Result<Report> {
        let file = file.as_ref();
        let samples = read_samples(file).with_context(|| format!("failed to read {file:?}"))?;
        Ok(self.analyze(&samples))
    }

    pub fn save_results<P: AsRef<Path>>(&self, report: &Report, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, report).context("failed to serialize report")?;
        Ok(())
    }
}

/// `(minute, value)` pairs of samples whose timestamp and value both parsed.
fn collect_pairs(channel: Channel, samples: &[Sample], minutes: &[Option<i64>]) -> Vec<(i64, f64)> {
    samples
        .iter()
        .zip(minutes)
        .filter_map(|(sample, &minute)| Some((minute?, channel.reading(sample)?.to_f64()?)))
        .collect()
}

pub fn read_samples<P: AsRef<Path>>(file: P) -> Result<Vec<Sample>> {
    let file = File::open(file.as_ref()).context("failed to open file")?;
    let reader = BufReader::new(file);
    let raw: Vec<serde_json::Value> =
        serde_json::from_reader(reader).context("failed to deserialize sample array")?;
    Ok(parse_samples(raw))
}

/// Convert each array element into a `Sample`, dropping the ones that are not objects.
fn parse_samples(raw: Vec<serde_json::Value>) -> Vec<Sample> {
    let n_raw = raw.len();
    let samples: Vec<Sample> = raw
        .into_iter()
        .filter_map(|val| serde_json::from_value(val).ok())
        .collect();
    if samples.len() < n_raw {
        log::warn!("dropped {} of {n_raw} malformed samples", n_raw - samples.len());
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{Reading, Timestamp};

    const TOL: f64 = 1e-9;

    fn sample(timestamp: &str, temperature: f64, humidity: Option<&str>) -> Sample {
        Sample {
            timestamp: Some(Timestamp::Label(timestamp.into())),
            temperature: Some(Reading::Number(temperature)),
            humidity: humidity.map(|text| Reading::Text(text.into())),
            ..Sample::default()
        }
    }

    fn analyzer() -> Analyzer {
        Analyzer::new(Config::default()).expect("failed to construct analyzer")
    }

    #[test]
    fn three_hour_scenario() {
        let samples = vec![
            sample("08:00", 20.0, Some("60")),
            sample("09:00", 22.0, Some("58")),
            sample("10:00", 24.0, Some("x")),
        ];
        let report = analyzer().analyze(&samples);
        assert_eq!(report.n_samples, 3);

        let temp = report.channel(Channel::Temperature).expect("temperature report");
        assert_eq!(temp.n_vals, 3);
        assert!((temp.stats.mean - 22.0).abs() < TOL);
        assert!((temp.trend.slope - 2.0 / 60.0).abs() < TOL);

        let headline = temp.headline.as_ref().expect("headline forecast");
        assert_eq!(headline.label, "11:00");
        assert!((headline.value - 26.0).abs() < TOL);
        assert_eq!(temp.series.points.len(), 5);
        let fit = temp.trend.fit.expect("fit should be kept");
        assert!((temp.series.points[0].value - fit.predict(610)).abs() < TOL);

        assert!((temp.exceedance.empirical_prob - 0.0).abs() < TOL);

        let hum = report.channel(Channel::Humidity).expect("humidity report");
        assert_eq!(hum.n_vals, 2);
        assert_eq!(hum.trend.n_pairs, 2);
        assert!((hum.trend.r_squared - 1.0).abs() < TOL);
        assert!(hum.stats.skewness.is_nan());
        assert!(hum.exceedance.normality.is_none());
    }

    #[test]
    fn pairs_need_both_timestamp_and_value() {
        let mut samples = vec![
            sample("08:00", 20.0, None),
            sample("bad", 21.0, None),
            sample("09:00", 22.0, None),
        ];
        samples[2].temperature = Some(Reading::Text("n/a".into()));

        let minutes: Vec<_> = samples
            .iter()
            .map(|sample| analyzer().normalizer.normalize_minutes(sample))
            .collect();
        let pairs = collect_pairs(Channel::Temperature, &samples, &minutes);
        assert_eq!(pairs, vec![(480, 20.0)]);

        let report = analyzer().analyze(&samples);
        let temp = report.channel(Channel::Temperature).expect("temperature report");
        assert_eq!(temp.n_vals, 2);
        assert!(temp.trend.r_squared.is_nan());
        assert!(temp.headline.is_none());
        assert_eq!(temp.series, ForecastSeries::empty());
    }

    #[test]
    fn malformed_elements_are_dropped() {
        let raw = serde_json::json!([
            {"timestamp": "08:00", "temperature": 20},
            {"timestamp": "08:00", "timestamp_TTL": "08:00", "temperature": 21},
            42,
            null,
            "09:00",
            {"timestamp": "09:00", "temperature": 22}
        ]);
        let raw = serde_json::from_value(raw).expect("failed to split array");
        let samples = parse_samples(raw);
        assert_eq!(samples.len(), 3);

        let report = analyzer().analyze(&samples);
        let temp = report.channel(Channel::Temperature).expect("temperature report");
        assert_eq!(temp.n_vals, 3);
        assert_eq!(temp.trend.n_pairs, 3);
    }

    #[test]
    fn snapshot_must_be_an_array() {
        let file = std::env::temp_dir().join("sensilyze-not-an-array.json");
        std::fs::write(&file, r#"{"timestamp": "08:00"}"#).expect("failed to write file");
        assert!(read_samples(&file).is_err());
        std::fs::remove_file(&file).ok();
    }

    #[test]
    fn empty_snapshot() {
        let report = analyzer().analyze(&[]);
        for channel in &report.channels {
            assert_eq!(channel.n_vals, 0);
            assert!(channel.stats.mean.is_nan());
            assert!(channel.headline.is_none());
            assert_eq!(channel.exceedance.empirical_prob, 0.0);
            assert!(channel.exceedance.normal_prob.is_none());
        }
    }

    #[test]
    fn report_serializes_nan_as_null() {
        let report = analyzer().analyze(&[sample("08:00", 20.0, None)]);
        let json = serde_json::to_value(&report).expect("failed to serialize report");
        let temp = &json["channels"][0];
        assert_eq!(temp["channel"], "temperature");
        assert_eq!(temp["stats"]["mean"], 20.0);
        assert!(temp["stats"]["std_dev"].is_null());
        assert!(temp["headline"].is_null());
    }
}
