use crate::sample::{Sample, Timestamp};
use chrono::{DateTime, FixedOffset, Local, Timelike, Utc};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Time zone used to turn epoch seconds into a wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockZone {
    Local,
    Fixed(FixedOffset),
}

/// Converts sample timestamps into minutes since midnight.
#[derive(Debug, Clone, Copy)]
pub struct TimeNormalizer {
    zone: ClockZone,
    strict_clock: bool,
}

impl TimeNormalizer {
    pub fn new(zone: ClockZone, strict_clock: bool) -> Self {
        Self { zone, strict_clock }
    }

    /// Minutes since midnight of the sample, or `None` if its timestamp is unparseable.
    ///
    /// With a lenient clock, labels such as `"25:00"` are accepted as `h * 60 + m`
    /// and may fall outside `0..1440`.
    pub fn normalize_minutes(&self, sample: &Sample) -> Option<i64> {
        match sample.timestamp()? {
            Timestamp::Label(label) => parse_hhmm_to_minutes(label, self.strict_clock),
            Timestamp::Epoch(secs) => epoch_to_minutes(*secs, self.zone),
            Timestamp::Other(_) => None,
        }
    }
}

/// Parse an `H:mm` / `HH:mm` label (an extra `:ss` segment is ignored).
pub fn parse_hhmm_to_minutes(label: &str, strict_clock: bool) -> Option<i64> {
    let segs: Vec<&str> = label.trim().split(':').collect();
    if !(2..=3).contains(&segs.len()) {
        return None;
    }
    let mut nums = Vec::with_capacity(segs.len());
    for seg in segs {
        if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        nums.push(seg.parse::<i64>().ok()?);
    }

    let (hour, minute) = (nums[0], nums[1]);
    if strict_clock && (hour >= 24 || minute >= 60) {
        return None;
    }
    hour.checked_mul(60)?.checked_add(minute)
}

/// Format minutes as `HH:mm`, wrapping modulo 24 h.
pub fn minutes_to_hhmm(minutes: i64) -> String {
    let total = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Wall-clock minutes since midnight of an epoch-seconds instant.
pub fn epoch_to_minutes(secs: f64, zone: ClockZone) -> Option<i64> {
    if !secs.is_finite() || secs.abs() > i64::MAX as f64 {
        return None;
    }
    let utc = DateTime::<Utc>::from_timestamp(secs.floor() as i64, 0)?;
    let (hour, minute) = match zone {
        ClockZone::Local => {
            let time = utc.with_timezone(&Local);
            (time.hour(), time.minute())
        }
        ClockZone::Fixed(offset) => {
            let time = utc.with_timezone(&offset);
            (time.hour(), time.minute())
        }
    };
    Some((hour * 60 + minute) as i64)
}
