use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::band::{HourBand, classify_with_anchor};
use crate::cli::Command;
use crate::config::Config;
use crate::datetime::parse_reference_expr;
use crate::filter::filter_optional;
use crate::grid::position_with;
use crate::model::{CalendarDataCollection, parse_collections};
use crate::navigation::{Dateline, shift_hours};
use crate::planner::{PlannerOptions, PlannerView};
use crate::render::Renderer;
use crate::resource_table::{columns_for, parse_resource_periods, to_resource_rows};

/// Per-invocation inputs shared by every command.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub cfg: &'a Config,
    pub data: Option<&'a Path>,
    pub now: DateTime<Utc>,
}

#[instrument(skip(ctx, renderer))]
pub fn dispatch(ctx: &Invocation<'_>, renderer: &mut Renderer, command: Command) -> anyhow::Result<()> {
    let options = PlannerOptions::from_config(ctx.cfg)?;
    debug!(?options, "resolved planner options");

    match command {
        Command::Classify { when, shift_hours } => {
            let reference = resolve_reference(ctx, &when, shift_hours)?;
            let classification = classify_with_anchor(reference, options.anchor);
            renderer.print_classification(&classification)
        }
        Command::Filter { when } => {
            let reference = parse_reference_expr(&when, ctx.now)?;
            let collections = load_collections(&resolve_data_path(ctx)?)?;
            let window = classify_with_anchor(reference, options.anchor).window;

            match filter_optional(&collections, Some(&window)) {
                Some(filtered) => renderer.print_collections(&filtered),
                None => {
                    info!(%window, "no calendar items in window");
                    renderer.print_collections(&[])
                }
            }
        }
        Command::Position { start, end, band } => {
            let start = parse_reference_expr(&start, ctx.now).context("invalid start")?;
            let end = parse_reference_expr(&end, ctx.now).context("invalid end")?;
            if end <= start {
                warn!(%start, %end, "item ends before it starts; width will be non-positive");
            }

            let band = band.unwrap_or_else(|| HourBand::of(start));
            let position = position_with(start, end, band, options.duration);
            renderer.print_position(band, &position)
        }
        Command::View { when, shift_hours } => {
            let reference = resolve_reference(ctx, &when, shift_hours)?;
            let collections = load_collections(&resolve_data_path(ctx)?)?;
            let view = PlannerView::compute(&collections, reference, options);
            renderer.print_view(&view)
        }
        Command::Week { when, weeks, days } => {
            let anchor = parse_reference_expr(&when, ctx.now)?;
            let dateline = Dateline::new(anchor, days)?.shift_weeks(weeks)?;
            renderer.print_dateline(&dateline)
        }
        Command::Resources { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let periods = parse_resource_periods(&raw)?;
            let rows = to_resource_rows(&periods);
            let columns = columns_for(&rows)
                .with_context(|| format!("no periods in {}", file.display()))?;
            renderer.print_resource_table(&columns, &rows)
        }
        Command::Show => renderer.print_config(ctx.cfg),
    }
}

/// Parses `when`, then steps it by whole hours.
pub fn resolve_reference(ctx: &Invocation<'_>, when: &str, hours: i64) -> anyhow::Result<DateTime<Utc>> {
    let reference = parse_reference_expr(when, ctx.now)?;
    if hours == 0 {
        return Ok(reference);
    }

    let shifted = shift_hours(reference, hours)?;
    debug!(%reference, %shifted, hours, "shifted reference");
    Ok(shifted)
}

pub fn resolve_data_path(ctx: &Invocation<'_>) -> anyhow::Result<PathBuf> {
    if let Some(path) = ctx.data {
        return Ok(path.to_path_buf());
    }

    ctx.cfg.data_location().ok_or_else(|| {
        anyhow!("no calendar data given; pass --data <FILE> or set data.location")
    })
}

#[instrument]
pub fn load_collections(path: &Path) -> anyhow::Result<Vec<CalendarDataCollection>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let collections =
        parse_collections(&raw).with_context(|| format!("invalid calendar data in {}", path.display()))?;

    info!(
        path = %path.display(),
        collections = collections.len(),
        "loaded calendar data"
    );
    Ok(collections)
}
