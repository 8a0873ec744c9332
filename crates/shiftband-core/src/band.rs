use std::str::FromStr;

use anyhow::anyhow;
use chrono::{
  DateTime,
  Duration,
  NaiveTime,
  Timelike,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

use crate::window::TimeWindow;

pub const REGULAR_START_HOUR: u32 = 7;
pub const OVERTIME_START_HOUR: u32 =
  19;
pub const HOURS_PER_BAND: u32 = 12;

pub const REGULAR_HOURS: [u32; 12] = [
  7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
  17, 18
];
pub const OVERTIME_HOURS: [u32; 12] = [
  19, 20, 21, 22, 23, 0, 1, 2, 3, 4, 5,
  6
];

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum HourBand {
  Regular,
  Overtime
}

impl HourBand {
  #[must_use]
  pub fn of_hour(hour: u32) -> Self {
    if (REGULAR_START_HOUR
      ..OVERTIME_START_HOUR)
      .contains(&(hour % 24))
    {
      Self::Regular
    } else {
      Self::Overtime
    }
  }

  #[must_use]
  pub fn of(
    instant: DateTime<Utc>
  ) -> Self {
    Self::of_hour(instant.hour())
  }

  /// Band for the currently selected
  /// reference, `None` when nothing is
  /// selected yet.
  #[must_use]
  pub fn for_reference(
    reference: Option<DateTime<Utc>>
  ) -> Option<Self> {
    reference.map(Self::of)
  }

  #[must_use]
  pub const fn base_hour(self) -> u32 {
    match self {
      | Self::Regular => {
        REGULAR_START_HOUR
      }
      | Self::Overtime => {
        OVERTIME_START_HOUR
      }
    }
  }

  /// Clock hours in timeline display
  /// order.
  #[must_use]
  pub const fn hours(
    self
  ) -> &'static [u32; 12] {
    match self {
      | Self::Regular => &REGULAR_HOURS,
      | Self::Overtime => {
        &OVERTIME_HOURS
      }
    }
  }

  #[must_use]
  pub const fn as_str(
    self
  ) -> &'static str {
    match self {
      | Self::Regular => "regular",
      | Self::Overtime => "overtime"
    }
  }
}

impl std::fmt::Display for HourBand {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>
  ) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for HourBand {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "regular" | "day" => {
        Ok(Self::Regular)
      }
      | "overtime" | "night" => {
        Ok(Self::Overtime)
      }
      | other => Err(anyhow!(
        "unknown hour band: {other} \
         (expected regular or \
         overtime)"
      ))
    }
  }
}

/// Which evening an overtime window
/// hangs off when the reference falls
/// after midnight.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum OvertimeAnchor {
  /// 19:00 on the reference's own date
  /// through 07:00 the day after.
  #[default]
  ReferenceDate,
  /// 19:00 the day before through
  /// 07:00 on the reference date, for
  /// references before 07:00.
  PreviousEvening
}

impl FromStr for OvertimeAnchor {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "reference" | "reference-date" => {
        Ok(Self::ReferenceDate)
      }
      | "previous"
      | "previous-evening" => {
        Ok(Self::PreviousEvening)
      }
      | other => Err(anyhow!(
        "unknown overtime anchor: \
         {other} (expected reference \
         or previous)"
      ))
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct Classification {
  pub band:   HourBand,
  pub window: TimeWindow
}

#[must_use]
pub fn classify(
  reference: DateTime<Utc>
) -> Classification {
  classify_with_anchor(
    reference,
    OvertimeAnchor::default()
  )
}

#[tracing::instrument(level = "debug")]
#[must_use]
pub fn classify_with_anchor(
  reference: DateTime<Utc>,
  anchor: OvertimeAnchor
) -> Classification {
  let hour = reference.hour();
  let band = HourBand::of_hour(hour);
  let midnight = reference
    .date_naive()
    .and_time(NaiveTime::MIN)
    .and_utc();

  let window = match band {
    | HourBand::Regular => {
      TimeWindow::spanning(
        midnight
          + hours(REGULAR_START_HOUR),
        midnight
          + hours(OVERTIME_START_HOUR)
      )
    }
    | HourBand::Overtime
      if anchor
        == OvertimeAnchor::PreviousEvening
        && hour < REGULAR_START_HOUR =>
    {
      // 19:00 the day before; the first representable day has none.
      let from = midnight
        .checked_sub_signed(hours(
          24 - OVERTIME_START_HOUR
        ))
        .unwrap_or(
          DateTime::<Utc>::MIN_UTC
        );
      TimeWindow::spanning(
        from,
        midnight
          + hours(REGULAR_START_HOUR)
      )
    }
    | HourBand::Overtime => {
      // Saturates on the last representable day.
      let to = midnight
        .checked_add_signed(
          Duration::days(1)
            + hours(REGULAR_START_HOUR)
        )
        .unwrap_or(
          DateTime::<Utc>::MAX_UTC
        );
      TimeWindow::spanning(
        midnight
          + hours(OVERTIME_START_HOUR),
        to
      )
    }
  };

  debug!(
    %band,
    hour,
    from = %window.from(),
    to = %window.to(),
    "classified reference"
  );

  Classification {
    band,
    window
  }
}

fn hours(hour: u32) -> Duration {
  Duration::hours(i64::from(hour))
}
