//! Sensor sample types.

use serde::{Deserialize, Serialize};

/// Timestamp of a sample as delivered by the data source.
///
/// Either a wall-clock label (`"HH:mm"`) or epoch seconds. Anything else is
/// kept as-is so that one malformed sample never fails the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(f64),
    Label(String),
    Other(serde_json::Value),
}

/// Raw value of a measured field: a number, a numeric-like string, or garbage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Reading {
    /// Coerce the reading to a finite number, if possible.
    pub fn to_f64(&self) -> Option<f64> {
        let val = match self {
            Reading::Number(val) => *val,
            Reading::Text(text) => text.trim().parse().ok()?,
            Reading::Other(_) => return None,
        };
        val.is_finite().then_some(val)
    }
}

/// One sensor reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    /// Legacy name of `timestamp`, used only when `timestamp` is absent.
    #[serde(default, rename = "timestamp_TTL", skip_serializing_if = "Option::is_none")]
    pub timestamp_ttl: Option<Timestamp>,
    #[serde(default)]
    pub temperature: Option<Reading>,
    #[serde(default)]
    pub humidity: Option<Reading>,
}

impl Sample {
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref().or(self.timestamp_ttl.as_ref())
    }
}

/// Measurement stream projected out of a sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Temperature,
    Humidity,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Temperature, Channel::Humidity];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Temperature => "Temperature",
            Channel::Humidity => "Humidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            Channel::Humidity => "%",
        }
    }

    pub fn reading<'a>(&self, sample: &'a Sample) -> Option<&'a Reading> {
        match self {
            Channel::Temperature => sample.temperature.as_ref(),
            Channel::Humidity => sample.humidity.as_ref(),
        }
    }

    /// Clean values of this channel, in sample order.
    pub fn values(&self, samples: &[Sample]) -> Vec<f64> {
        samples
            .iter()
            .filter_map(|sample| self.reading(sample)?.to_f64())
            .collect()
    }
}
