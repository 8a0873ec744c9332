use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::band::{Classification, HourBand, OvertimeAnchor, classify_with_anchor};
use crate::config::Config;
use crate::filter::filter_by_window;
use crate::grid::{DurationRule, GridPosition, position_with};
use crate::model::{CalendarDataCollection, CalendarItem};
use crate::window::TimeWindow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlannerOptions {
    pub anchor: OvertimeAnchor,
    pub duration: DurationRule,
}

impl PlannerOptions {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            anchor: cfg.overtime_anchor()?,
            duration: cfg.duration_rule()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedItem {
    #[serde(flatten)]
    pub item: CalendarItem,
    pub position: GridPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub banner: String,
    pub items: Vec<PositionedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionGroup {
    pub sections: Vec<Section>,
}

/// Everything a calendar screen needs for one reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannerView {
    pub reference: DateTime<Utc>,
    pub band: HourBand,
    pub window: TimeWindow,
    pub hours: Vec<u32>,
    pub groups: Vec<SectionGroup>,
}

impl PlannerView {
    #[tracing::instrument(skip(collections), fields(collections = collections.len()))]
    pub fn compute(
        collections: &[CalendarDataCollection],
        reference: DateTime<Utc>,
        options: PlannerOptions,
    ) -> Self {
        let Classification { band, window } = classify_with_anchor(reference, options.anchor);
        let filtered = filter_by_window(collections, &window);

        let groups: Vec<SectionGroup> = filtered
            .into_iter()
            .map(|collection| SectionGroup {
                sections: collection
                    .calendar_data
                    .into_iter()
                    .map(|instance| Section {
                        banner: instance.banner,
                        items: instance
                            .items
                            .into_iter()
                            .map(|item| {
                                let position = position_with(
                                    item.start_date,
                                    item.end_date,
                                    band,
                                    options.duration,
                                );
                                PositionedItem { item, position }
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let view = Self {
            reference,
            band,
            window,
            hours: band.hours().to_vec(),
            groups,
        };

        info!(
            band = %view.band,
            window = %view.window,
            items = view.item_count(),
            "computed planner view"
        );

        view
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|group| &group.sections)
            .map(|section| section.items.len())
            .sum()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.groups.iter().flat_map(|group| group.sections.iter())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::model::CalendarInstance;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, day, hour, minute, 0).unwrap()
    }

    fn roster() -> Vec<CalendarDataCollection> {
        vec![
            CalendarDataCollection::new(vec![CalendarInstance::new(
                "Johan Sne",
                vec![
                    CalendarItem::new(at(4, 9, 23), at(4, 10, 34), "bg-red-400"),
                    CalendarItem::new(at(4, 21, 0), at(4, 23, 0), "bg-blue-400"),
                    CalendarItem::new(at(4, 23, 0), at(5, 2, 40), "bg-blue-600"),
                ],
            )]),
            CalendarDataCollection::new(vec![CalendarInstance::new(
                "Mads Jensen",
                vec![CalendarItem::new(at(4, 10, 0), at(4, 11, 0), "bg-yellow-400")],
            )]),
        ]
    }

    #[test]
    fn overtime_view_positions_against_evening_base() {
        let view = PlannerView::compute(&roster(), at(4, 21, 0), PlannerOptions::default());

        assert_eq!(view.band, HourBand::Overtime);
        assert_eq!(view.hours[0], 19);
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.item_count(), 2);

        let section = view.sections().next().expect("one section");
        assert_eq!(section.banner, "Johan Sne");
        let evening = section.items[0].position;
        assert!((evening.left_percent - 16.67).abs() < 0.01);
        assert!((evening.width_percent - 16.67).abs() < 0.01);
        let overnight = section.items[1].position;
        assert!((overnight.width_percent - 30.56).abs() < 0.01);
    }

    #[test]
    fn regular_view_keeps_both_technicians() {
        let view = PlannerView::compute(&roster(), at(4, 9, 23), PlannerOptions::default());

        assert_eq!(view.band, HourBand::Regular);
        assert_eq!(view.item_count(), 2);
        let banners: Vec<_> = view.sections().map(|s| s.banner.as_str()).collect();
        assert_eq!(banners, vec!["Johan Sne", "Mads Jensen"]);
    }

    #[test]
    fn empty_view_when_nothing_overlaps() {
        let view = PlannerView::compute(&roster(), at(12, 9, 0), PlannerOptions::default());
        assert!(view.is_empty());
        assert_eq!(view.hours.len(), 12);
    }

    #[test]
    fn serializes_flattened_items() {
        let view = PlannerView::compute(&roster(), at(4, 10, 0), PlannerOptions::default());
        let json = serde_json::to_value(&view).expect("serialize view");

        assert_eq!(json["band"], "regular");
        let first = &json["groups"][0]["sections"][0]["items"][0];
        assert_eq!(first["color"], "bg-red-400");
        assert!(first["position"]["leftPercent"].is_number());
        assert_eq!(json["window"]["from"], "2024-11-04T07:00:00Z");
    }
}
