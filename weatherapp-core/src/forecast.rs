//! Reduction of the 3-hour forecast series to one sample per upcoming day.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{DailyForecast, ForecastPoint};

/// Number of upcoming days kept after normalization.
pub const FORECAST_DAYS: usize = 3;

/// Samples requested from the forecast endpoint (3 days at 8 samples/day).
pub const FORECAST_SAMPLE_COUNT: u32 = 24;

/// How two local dates are considered "the same day".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayMatching {
    /// Compare the day-of-month number only. The 15th of January and the
    /// 15th of February match.
    #[default]
    DayOfMonth,
    /// Compare the full local calendar date.
    CalendarDate,
}

impl DayMatching {
    fn same_day(self, a: NaiveDate, b: NaiveDate) -> bool {
        match self {
            DayMatching::DayOfMonth => a.day() == b.day(),
            DayMatching::CalendarDate => a == b,
        }
    }
}

/// Keep the first sample of each upcoming day, skipping today, capped at
/// [`FORECAST_DAYS`] entries. Days are derived in the time zone of `now`.
///
/// Input order is respected: the first sample seen for a day wins and the
/// output follows first appearance.
pub fn normalize_daily<Tz: TimeZone>(
    points: &[ForecastPoint],
    now: &DateTime<Tz>,
    matching: DayMatching,
) -> Vec<DailyForecast> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut accepted: Vec<(NaiveDate, &ForecastPoint)> = Vec::with_capacity(FORECAST_DAYS);

    for point in points {
        let day = point.timestamp.with_timezone(&tz).date_naive();

        if matching.same_day(day, today) {
            continue;
        }
        if accepted.iter().any(|(seen, _)| matching.same_day(*seen, day)) {
            continue;
        }
        accepted.push((day, point));
    }

    accepted.truncate(FORECAST_DAYS);

    debug!(
        samples = points.len(),
        days = accepted.len(),
        ?matching,
        "normalized forecast"
    );

    accepted.into_iter().map(|(_, p)| p.clone()).collect()
}
