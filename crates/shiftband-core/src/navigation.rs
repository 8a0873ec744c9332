use anyhow::anyhow;
use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use serde::Serialize;

use crate::band::REGULAR_START_HOUR;

/// Upper bound on dateline length, one leap year of days.
pub const MAX_DAYS: usize = 366;

pub fn truncate_to_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn truncate_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_day(instant) + Duration::hours(i64::from(instant.hour()))
}

pub fn truncate_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_hour(instant) + Duration::minutes(i64::from(instant.minute()))
}

pub fn shift_hours(reference: DateTime<Utc>, hours: i64) -> anyhow::Result<DateTime<Utc>> {
    Duration::try_hours(hours)
        .and_then(|delta| reference.checked_add_signed(delta))
        .ok_or_else(|| anyhow!("hour shift out of range: {hours:+}h from {reference}"))
}

/// `days` consecutive dates from the anchor's date, each at the start of
/// the regular band.
pub fn week_dates(anchor: DateTime<Utc>, days: usize) -> anyhow::Result<Vec<DateTime<Utc>>> {
    if days > MAX_DAYS {
        return Err(anyhow!("dateline length {days} exceeds {MAX_DAYS} days"));
    }

    let morning = truncate_to_day(anchor)
        .checked_add_signed(Duration::hours(i64::from(REGULAR_START_HOUR)))
        .ok_or_else(|| anyhow!("dateline out of range at {anchor}"))?;

    (0..days)
        .map(|offset| {
            Duration::try_days(offset as i64)
                .and_then(|delta| morning.checked_add_signed(delta))
                .ok_or_else(|| anyhow!("dateline out of range at {anchor} + {offset}d"))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dateline {
    pub anchor: DateTime<Utc>,
    pub dates: Vec<DateTime<Utc>>,
}

impl Dateline {
    pub const DEFAULT_DAYS: usize = 7;

    pub fn new(anchor: DateTime<Utc>, days: usize) -> anyhow::Result<Self> {
        Ok(Self {
            anchor,
            dates: week_dates(anchor, days)?,
        })
    }

    #[tracing::instrument(skip(self), fields(anchor = %self.anchor))]
    pub fn shift_weeks(&self, weeks: i64) -> anyhow::Result<Self> {
        let anchor = Duration::try_weeks(weeks)
            .and_then(|delta| self.anchor.checked_add_signed(delta))
            .ok_or_else(|| anyhow!("week shift out of range: {weeks:+} weeks from {}", self.anchor))?;
        Self::new(anchor, self.dates.len())
    }

    /// Date selected after navigating: the first day of the line.
    pub fn selected(&self) -> Option<DateTime<Utc>> {
        self.dates.first().copied()
    }
}
