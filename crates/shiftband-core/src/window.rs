use anyhow::anyhow;
use chrono::{
  DateTime,
  Duration,
  Utc
};
use serde::Serialize;

/// Half-open `[from, to)` range on the UTC timeline.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
)]
pub struct TimeWindow {
  from: DateTime<Utc>,
  to:   DateTime<Utc>
}

impl TimeWindow {
  pub fn new(
    from: DateTime<Utc>,
    to: DateTime<Utc>
  ) -> anyhow::Result<Self> {
    if from >= to {
      return Err(anyhow!(
        "time window must start before \
         it ends: {} >= {}",
        from.to_rfc3339(),
        to.to_rfc3339()
      ));
    }

    Ok(Self {
      from,
      to
    })
  }

  // Callers inside the crate build bounds from fixed hour offsets.
  pub(crate) fn spanning(
    from: DateTime<Utc>,
    to: DateTime<Utc>
  ) -> Self {
    debug_assert!(from < to);
    Self {
      from,
      to
    }
  }

  #[must_use]
  pub fn from(&self) -> DateTime<Utc> {
    self.from
  }

  #[must_use]
  pub fn to(&self) -> DateTime<Utc> {
    self.to
  }

  #[must_use]
  pub fn duration(&self) -> Duration {
    self.to - self.from
  }

  #[must_use]
  pub fn contains(
    &self,
    instant: DateTime<Utc>
  ) -> bool {
    self.from <= instant
      && instant < self.to
  }

  /// Strict overlap: a span ending exactly at `from` or starting
  /// exactly at `to` does not overlap.
  #[must_use]
  pub fn overlaps(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>
  ) -> bool {
    end > self.from && start < self.to
  }
}

impl std::fmt::Display for TimeWindow {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>
  ) -> std::fmt::Result {
    write!(
      f,
      "[{}, {})",
      self.from.to_rfc3339(),
      self.to.to_rfc3339()
    )
  }
}
