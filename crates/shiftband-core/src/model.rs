use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub color: String,
}

/// A named track of items, usually one per technician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInstance {
    pub banner: String,

    #[serde(default)]
    pub items: Vec<CalendarItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDataCollection {
    #[serde(default)]
    pub calendar_data: Vec<CalendarInstance>,
}

impl CalendarItem {
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>, color: impl Into<String>) -> Self {
        Self {
            start_date,
            end_date,
            color: color.into(),
        }
    }
}

impl CalendarInstance {
    pub fn new(banner: impl Into<String>, items: Vec<CalendarItem>) -> Self {
        Self {
            banner: banner.into(),
            items,
        }
    }
}

impl CalendarDataCollection {
    pub fn new(calendar_data: Vec<CalendarInstance>) -> Self {
        Self { calendar_data }
    }

    pub fn item_count(&self) -> usize {
        self.calendar_data.iter().map(|instance| instance.items.len()).sum()
    }
}

pub fn total_items(collections: &[CalendarDataCollection]) -> usize {
    collections.iter().map(CalendarDataCollection::item_count).sum()
}

#[tracing::instrument(skip(raw), fields(bytes = raw.len()))]
pub fn parse_collections(raw: &str) -> anyhow::Result<Vec<CalendarDataCollection>> {
    let collections: Vec<CalendarDataCollection> =
        serde_json::from_str(raw).context("failed to parse calendar collections JSON")?;
    tracing::debug!(
        collections = collections.len(),
        items = total_items(&collections),
        "parsed calendar collections"
    );
    Ok(collections)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn parses_iso_strings_with_millis() {
        let raw = r#"[
            {
                "calendarData": [
                    {
                        "banner": "Johan Sne",
                        "items": [
                            {
                                "startDate": "2024-11-04T07:15:00.000Z",
                                "endDate": "2024-11-04T08:45:00.000Z",
                                "color": "bg-blue-400"
                            }
                        ]
                    }
                ]
            }
        ]"#;

        let parsed = parse_collections(raw).expect("parse collections");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].item_count(), 1);

        let item = &parsed[0].calendar_data[0].items[0];
        assert_eq!(
            item.start_date,
            Utc.with_ymd_and_hms(2024, 11, 4, 7, 15, 0).unwrap()
        );
        assert_eq!(item.color, "bg-blue-400");
    }

    #[test]
    fn serializes_camel_case_field_names() {
        let item = CalendarItem::new(
            Utc.with_ymd_and_hms(2024, 11, 4, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 4, 10, 0, 0).unwrap(),
            "bg-green-400",
        );
        let collection =
            CalendarDataCollection::new(vec![CalendarInstance::new("Ole Hansen", vec![item])]);

        let json = serde_json::to_value(&collection).expect("serialize");
        let first = &json["calendarData"][0];
        assert_eq!(first["banner"], "Ole Hansen");
        assert_eq!(first["items"][0]["startDate"], "2024-11-04T09:00:00Z");
        assert_eq!(first["items"][0]["endDate"], "2024-11-04T10:00:00Z");
    }

    #[test]
    fn missing_items_default_to_empty() {
        let parsed = parse_collections(r#"[{"calendarData":[{"banner":"Mads Jensen"}]}]"#)
            .expect("parse collections");
        assert_eq!(total_items(&parsed), 0);
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = parse_collections(
            r#"[{"calendarData":[{"banner":"x","items":[{"startDate":"yesterday","endDate":"2024-11-04T08:00:00Z","color":"c"}]}]}]"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse calendar collections JSON"));
    }
}
