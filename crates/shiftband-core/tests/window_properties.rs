use chrono::{DateTime, Duration, Timelike, Utc};
use proptest::prelude::*;
use shiftband_core::filter::item_overlaps;
use shiftband_core::{
    CalendarDataCollection, CalendarInstance, CalendarItem, HourBand, OvertimeAnchor, TimeWindow,
    classify, classify_with_anchor, filter_by_window, position,
};

// 1970 through 2100
fn instant() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800).prop_map(|secs| DateTime::from_timestamp(secs, 0).expect("in range"))
}

fn window_origin() -> DateTime<Utc> {
    DateTime::from_timestamp(1_730_703_600, 0).expect("2024-11-04T07:00Z")
}

// (start offset, duration) in minutes relative to a 12-hour window at origin
fn items() -> impl Strategy<Value = Vec<Vec<Vec<(i64, i64)>>>> {
    let item = (-900i64..1_620, 1i64..600);
    prop::collection::vec(
        prop::collection::vec(prop::collection::vec(item, 0..6), 0..4),
        0..5,
    )
}

fn build(raw: &[Vec<Vec<(i64, i64)>>]) -> Vec<CalendarDataCollection> {
    let origin = window_origin();
    raw.iter()
        .map(|instances| {
            CalendarDataCollection::new(
                instances
                    .iter()
                    .enumerate()
                    .map(|(idx, spans)| {
                        CalendarInstance::new(
                            format!("tech-{idx}"),
                            spans
                                .iter()
                                .map(|(offset, len)| {
                                    let start = origin + Duration::minutes(*offset);
                                    CalendarItem::new(start, start + Duration::minutes(*len), "bg-blue-400")
                                })
                                .collect(),
                        )
                    })
                    .collect(),
            )
        })
        .collect()
}

fn all_items(collections: &[CalendarDataCollection]) -> Vec<CalendarItem> {
    collections
        .iter()
        .flat_map(|c| &c.calendar_data)
        .flat_map(|i| i.items.iter().cloned())
        .collect()
}

proptest! {
    #[test]
    fn every_reference_gets_a_forward_window(reference in instant()) {
        for anchor in [OvertimeAnchor::ReferenceDate, OvertimeAnchor::PreviousEvening] {
            let result = classify_with_anchor(reference, anchor);
            prop_assert!(result.window.from() < result.window.to());
            prop_assert_eq!(result.window.duration(), Duration::hours(12));
            prop_assert_eq!(result.band, HourBand::of_hour(reference.hour()));
            prop_assert_eq!(result.window.from().hour(), result.band.base_hour());
        }
    }

    #[test]
    fn regular_and_anchored_windows_contain_reference(reference in instant()) {
        let result = classify(reference);
        if result.band == HourBand::Regular {
            prop_assert!(result.window.contains(reference));
        } else {
            let anchored = classify_with_anchor(reference, OvertimeAnchor::PreviousEvening);
            prop_assert!(anchored.window.contains(reference));
        }
    }

    #[test]
    fn filter_matches_overlap_predicate_exactly(raw in items()) {
        let collections = build(&raw);
        let window = TimeWindow::new(window_origin(), window_origin() + Duration::hours(12))
            .expect("valid window");

        let filtered = filter_by_window(&collections, &window);
        let kept = all_items(&filtered);
        let expected: Vec<CalendarItem> = all_items(&collections)
            .into_iter()
            .filter(|item| item.end_date > window.from() && item.start_date < window.to())
            .collect();

        prop_assert!(kept.iter().all(|item| item_overlaps(item, &window)));
        prop_assert_eq!(kept, expected);
        prop_assert!(filtered.iter().all(|c| !c.calendar_data.is_empty()));
        prop_assert!(filtered
            .iter()
            .flat_map(|c| &c.calendar_data)
            .all(|i| !i.items.is_empty()));
    }

    #[test]
    fn filter_is_idempotent(raw in items()) {
        let collections = build(&raw);
        let window = classify(window_origin()).window;

        let once = filter_by_window(&collections, &window);
        let twice = filter_by_window(&once, &window);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn hour_long_items_are_one_twelfth_wide(hour in 0u32..24, minute in 0u32..60) {
        let start = window_origin() - Duration::hours(7)
            + Duration::hours(i64::from(hour))
            + Duration::minutes(i64::from(minute));
        let band = HourBand::of_hour(hour);
        let placed = position(start, start + Duration::hours(1), band);

        prop_assert!((placed.width_percent - 100.0 / 12.0).abs() < 1e-9);
        if minute == 0 && hour == band.base_hour() {
            prop_assert_eq!(placed.left_percent, 0.0);
        }
    }
}
