use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Format of the timestamps the weather API reports (`localtime`, hourly `time`).
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A multi-day hourly forecast, already converted out of the wire format.
///
/// All timestamps are naive local time as reported by the weather service for
/// the queried location; nothing in this crate converts between time zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    /// Local time at the forecast location when the snapshot was taken.
    pub local_time: NaiveDateTime,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Sunrise/sunset are `None` when the service omitted the astro block or
    /// reported a value that does not parse.
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub hours: Vec<HourSample>,
}

/// One hourly forecast record, aligned to an hour boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourSample {
    pub time: NaiveDateTime,
    pub temp_f: f64,
    pub will_rain: bool,
    pub will_snow: bool,
}

impl ForecastSnapshot {
    /// Find the hourly record whose timestamp exactly equals `target`.
    ///
    /// The target must align to an hour boundary present in the source data;
    /// there is no interpolation. A miss is a missing-data condition, not an
    /// error.
    pub fn sample_at(&self, target: NaiveDateTime) -> Option<&HourSample> {
        self.days.iter().flat_map(|day| day.hours.iter()).find(|hour| hour.time == target)
    }

    /// Whether `target` falls between sunrise and sunset (inclusive) on its
    /// day. `None` when the day is absent or has no usable astro data.
    pub fn daylight_at(&self, target: NaiveDateTime) -> Option<bool> {
        let day = self.days.iter().find(|day| day.date == target.date())?;
        let (sunrise, sunset) = (day.sunrise?, day.sunset?);
        let tod = target.time();
        Some(sunrise <= tod && tod <= sunset)
    }
}
