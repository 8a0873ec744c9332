use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Duration,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  Utc
};
use regex::Regex;

const COMPACT_UTC_FORMAT: &str =
  "%Y%m%dT%H%M%SZ";

fn relative_re() -> Option<&'static Regex>
{
  static RELATIVE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  RELATIVE
    .get_or_init(|| {
      Regex::new(
        r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[wdhm])$"
      )
      .ok()
    })
    .as_ref()
}

#[must_use]
pub fn format_instant(
  dt: DateTime<Utc>
) -> String {
  dt.format("%Y-%m-%d %H:%M").to_string()
}

#[must_use]
pub fn format_hour_label(
  hour: u32
) -> String {
  format!("{:02}:00", hour % 24)
}

fn midnight_of(
  date: NaiveDate
) -> DateTime<Utc> {
  date.and_time(NaiveTime::MIN).and_utc()
}

/// Parses a reference-date expression
/// into a UTC instant. Wall-clock forms
/// are read as UTC.
#[tracing::instrument(skip(now))]
pub fn parse_reference_expr(
  input: &str,
  now: DateTime<Utc>
) -> anyhow::Result<DateTime<Utc>> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "now" => return Ok(now),
    | "today" => {
      return Ok(midnight_of(
        now.date_naive()
      ));
    }
    | "tomorrow" => {
      return midnight_of(
        now.date_naive()
      )
      .checked_add_signed(
        Duration::days(1)
      )
      .ok_or_else(|| {
        anyhow!(
          "date offset out of range: \
           {input}"
        )
      });
    }
    | "yesterday" => {
      return midnight_of(
        now.date_naive()
      )
      .checked_sub_signed(
        Duration::days(1)
      )
      .ok_or_else(|| {
        anyhow!(
          "date offset out of range: \
           {input}"
        )
      });
    }
    | _ => {}
  }

  let rel_re =
    relative_re().ok_or_else(|| {
      anyhow!(
        "internal regex compile \
         failure"
      )
    })?;

  if let Some(caps) =
    rel_re.captures(token)
  {
    let sign = caps
      .name("sign")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative sign")
      })?;
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let unit = caps
      .name("unit")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative unit")
      })?;

    let duration = match unit {
      | "w" => Duration::try_weeks(num),
      | "d" => Duration::try_days(num),
      | "h" => Duration::try_hours(num),
      | "m" => Duration::try_minutes(num),
      | _ => {
        return Err(anyhow!(
          "unknown relative unit: \
           {unit}"
        ));
      }
    };

    let shifted = duration.and_then(|d| {
      if sign == "-" {
        now.checked_sub_signed(d)
      } else {
        now.checked_add_signed(d)
      }
    });
    return shifted.ok_or_else(|| {
      anyhow!(
        "date offset out of range: \
         {input}"
      )
    });
  }

  if let Ok(ndt) =
    NaiveDateTime::parse_from_str(
      token,
      COMPACT_UTC_FORMAT
    )
  {
    return Ok(ndt.and_utc());
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(dt.with_timezone(&Utc));
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Ok(midnight_of(date));
  }

  for fmt in [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S"
  ] {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return Ok(ndt.and_utc());
    }
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     now/today/tomorrow/yesterday, \
     +Nw/+Nd/+Nh/+Nm (or -), RFC3339, \
     YYYY-MM-DD, YYYY-MM-DDTHH:MM, \
     YYYY-MM-DD HH:MM, YYYYMMDDTHHMMSSZ"
  })
}
