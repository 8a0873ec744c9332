use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use shiftband_core::commands::load_collections;
use shiftband_core::config::Config;
use shiftband_core::planner::{PlannerOptions, PlannerView};
use shiftband_core::resource_table::{columns_for, parse_resource_periods, to_resource_rows};
use shiftband_core::{HourBand, OvertimeAnchor, classify, filter_by_window, filter_optional};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, day, hour, minute, 0).unwrap()
}

#[test]
fn roster_regular_and_overtime_windows() {
    let roster = load_collections(&fixture("supervisor_roster.json")).expect("load roster");
    assert_eq!(roster.len(), 5);

    let morning = classify(at(4, 9, 23));
    assert_eq!(morning.band, HourBand::Regular);
    assert_eq!(morning.window.from(), at(4, 7, 0));
    assert_eq!(morning.window.to(), at(4, 19, 0));

    let daytime = filter_by_window(&roster, &morning.window);
    assert_eq!(daytime.len(), 5);
    assert_eq!(daytime[0].calendar_data[0].items.len(), 2);

    let evening = classify(at(4, 21, 0));
    let night = filter_optional(&roster, Some(&evening.window)).expect("overtime items");
    assert_eq!(night.len(), 1);
    assert_eq!(night[0].calendar_data[0].banner, "Johan Sne");
    assert_eq!(night[0].calendar_data[0].items.len(), 2);

    assert!(filter_optional(&roster, None).is_none());
}

#[test]
fn planner_view_places_overnight_shift() {
    let roster = load_collections(&fixture("supervisor_roster.json")).expect("load roster");
    let view = PlannerView::compute(&roster, at(4, 21, 0), PlannerOptions::default());

    assert_eq!(view.band, HourBand::Overtime);
    assert_eq!(view.hours, vec![19, 20, 21, 22, 23, 0, 1, 2, 3, 4, 5, 6]);

    let johan = view.sections().next().expect("johan section");
    let widths: Vec<f64> = johan
        .items
        .iter()
        .map(|placed| placed.position.width_percent)
        .collect();
    assert!((widths[0] - 100.0 / 6.0).abs() < 1e-9);
    assert!((widths[1] - 220.0 / 60.0 * 100.0 / 12.0).abs() < 1e-9);
}

#[test]
fn rc_file_switches_overtime_anchor() {
    let temp = tempdir().expect("tempdir");
    let rc = temp.path().join("shiftbandrc");
    fs::write(&rc, "overtime.anchor = previous\ngrid.duration = elapsed\n").expect("write rc");

    let cfg = Config::load(Some(rc.as_path())).expect("load config");
    let options = PlannerOptions::from_config(&cfg).expect("options");
    assert_eq!(options.anchor, OvertimeAnchor::PreviousEvening);

    let roster = load_collections(&fixture("supervisor_roster.json")).expect("load roster");
    let after_midnight = at(5, 1, 0);

    let anchored = PlannerView::compute(&roster, after_midnight, options);
    assert_eq!(anchored.window.from(), at(4, 19, 0));
    assert_eq!(anchored.item_count(), 2);

    let default_view = PlannerView::compute(&roster, after_midnight, PlannerOptions::default());
    assert_eq!(default_view.window.from(), at(5, 19, 0));
    assert!(default_view.is_empty());
}

#[test]
fn resource_fixture_builds_grid() {
    let raw = fs::read_to_string(fixture("resource_periods.json")).expect("read fixture");
    let periods = parse_resource_periods(&raw).expect("parse periods");
    let rows = to_resource_rows(&periods);
    let columns = columns_for(&rows).expect("columns");

    let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
    assert_eq!(headers, vec!["Period", "MTN-MECH", "MTN-ELEC", "MTN-INST"]);

    assert_eq!(rows[2].id, "row-2");
    assert!(rows[2].cells.iter().all(|(_, count)| *count == 0.0));
}
