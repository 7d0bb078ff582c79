use crate::time::{ClockZone, MINUTES_PER_DAY};
use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Analysis configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Timestamp interpretation.
    pub time: TimeConfig,
    /// Trend forecast horizons.
    pub forecast: ForecastConfig,
    /// Exceedance estimation.
    pub exceedance: ExceedanceConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeConfig {
    /// Reject `HH:mm` labels with hours >= 24 or minutes >= 60.
    pub strict_clock: bool,
    /// Offset from UTC used for epoch timestamps (system local time if absent).
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Minutes ahead of the last observation for the headline forecast.
    pub headline_offset: i64,
    /// Minutes ahead of the last observation for the forecast series.
    pub series_offsets: Vec<i64>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExceedanceConfig {
    /// Value whose exceedance probability is estimated.
    pub threshold: f64,
    /// Significance level of the normality test.
    pub alpha: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            strict_clock: true,
            utc_offset_minutes: None,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            headline_offset: 60,
            series_offsets: vec![10, 20, 30, 40, 50],
        }
    }
}

impl Default for ExceedanceConfig {
    fn default() -> Self {
        Self {
            threshold: 25.0,
            alpha: 0.05,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be a TOML document; every table and key is optional.
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Time zone used for epoch timestamps.
    pub fn clock_zone(&self) -> Result<ClockZone> {
        match self.time.utc_offset_minutes {
            None => Ok(ClockZone::Local),
            Some(offset) => {
                let offset = FixedOffset::east_opt(offset * 60)
                    .with_context(|| format!("invalid UTC offset of {offset} minutes"))?;
                Ok(ClockZone::Fixed(offset))
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(offset) = self.time.utc_offset_minutes {
            let max_offset = MINUTES_PER_DAY as i32 - 1;
            check_num(offset, -max_offset..=max_offset).context("invalid UTC offset")?;
        }

        check_num(self.forecast.headline_offset, 1..=MINUTES_PER_DAY)
            .context("invalid headline forecast offset")?;
        if self.forecast.series_offsets.is_empty() {
            bail!("forecast series offsets must not be empty");
        }
        for (idx, &offset) in self.forecast.series_offsets.iter().enumerate() {
            check_num(offset, 1..=MINUTES_PER_DAY)
                .with_context(|| format!("invalid forecast series offset {idx}"))?;
        }

        if !self.exceedance.threshold.is_finite() {
            bail!("exceedance threshold must be finite");
        }
        check_num(self.exceedance.alpha, 0.0..1.0).context("invalid significance level")?;
        if self.exceedance.alpha == 0.0 {
            bail!("significance level must be positive");
        }

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
