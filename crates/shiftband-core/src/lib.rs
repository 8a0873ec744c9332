pub mod band;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod filter;
pub mod grid;
pub mod model;
pub mod navigation;
pub mod planner;
pub mod render;
pub mod resource_table;
pub mod window;

use std::ffi::OsString;

use chrono::Utc;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use band::{
  Classification,
  HourBand,
  OvertimeAnchor,
  classify,
  classify_with_anchor
};
pub use filter::{
  filter_by_window,
  filter_optional
};
pub use grid::{
  DurationRule,
  GridPosition,
  position,
  position_with
};
pub use model::{
  CalendarDataCollection,
  CalendarInstance,
  CalendarItem
};
pub use window::TimeWindow;

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting shiftband"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.rc_file.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );
  if cli.json {
    cfg.apply_overrides([(
      "output.format".to_string(),
      "json".to_string()
    )]);
  }

  let mut renderer =
    render::Renderer::new(&cfg)?;
  let ctx = commands::Invocation {
    cfg:  &cfg,
    data: cli.data.as_deref(),
    now:  navigation::truncate_to_minute(
      Utc::now()
    )
  };

  commands::dispatch(
    &ctx,
    &mut renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}
