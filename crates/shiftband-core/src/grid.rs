use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::band::{HOURS_PER_BAND, HourBand};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Horizontal placement inside a 12-hour band, both values in percent
/// of the band width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPosition {
    pub left_percent: f64,
    pub width_percent: f64,
}

impl GridPosition {
    pub fn left_css(&self) -> String {
        format!("{}%", self.left_percent)
    }

    pub fn width_css(&self) -> String {
        format!("{}%", self.width_percent)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationRule {
    /// Minute-of-day arithmetic that assumes at most one midnight crossing.
    #[default]
    SingleMidnight,
    /// Actual elapsed minutes, correct for multi-day spans.
    Elapsed,
}

impl DurationRule {
    pub fn minutes(self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        match self {
            DurationRule::SingleMidnight => duration_minutes(start, end),
            DurationRule::Elapsed => (end - start).num_minutes(),
        }
    }
}

impl FromStr for DurationRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single-midnight" | "legacy" => Ok(Self::SingleMidnight),
            "elapsed" | "exact" => Ok(Self::Elapsed),
            other => Err(anyhow!(
                "unknown duration rule: {other} (expected single-midnight or elapsed)"
            )),
        }
    }
}

fn minute_of_day(instant: DateTime<Utc>) -> i64 {
    i64::from(instant.hour()) * 60 + i64::from(instant.minute())
}

/// Same UTC date: difference of minute-of-day values. Different dates:
/// minutes to the next midnight plus minutes past midnight at `end`.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let start_minutes = minute_of_day(start);
    let end_minutes = minute_of_day(end);

    if start.date_naive() == end.date_naive() {
        end_minutes - start_minutes
    } else {
        (MINUTES_PER_DAY - start_minutes) + end_minutes
    }
}

pub fn position(start: DateTime<Utc>, end: DateTime<Utc>, band: HourBand) -> GridPosition {
    position_with(start, end, band, DurationRule::SingleMidnight)
}

#[tracing::instrument(level = "trace")]
pub fn position_with(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    band: HourBand,
    rule: DurationRule,
) -> GridPosition {
    let span = f64::from(HOURS_PER_BAND);
    let start_hour = f64::from(start.hour());
    let start_minute = f64::from(start.minute());
    let base_hour = f64::from(band.base_hour());

    let left = ((start_hour - base_hour) * 100.0) / span + (start_minute / 60.0) * (100.0 / span);

    let minutes = rule.minutes(start, end);
    if minutes <= 0 {
        warn!(
            start = %start,
            end = %end,
            minutes,
            "calendar item has non-positive duration"
        );
    }
    let width = (minutes as f64 / 60.0) * (100.0 / span);

    GridPosition {
        left_percent: left,
        width_percent: width,
    }
}

/// Picks the band from the start hour, the way a lone item placed without
/// a selected reference is laid out.
pub fn position_auto(start: DateTime<Utc>, end: DateTime<Utc>) -> (HourBand, GridPosition) {
    let band = HourBand::of(start);
    (band, position(start, end, band))
}
