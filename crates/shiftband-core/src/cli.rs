use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::builder::TypedValueParser;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::band::HourBand;
use crate::navigation::{Dateline, MAX_DAYS};

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "shiftband",
    version,
    about = "Regular/overtime calendar windows and time-grid placement",
    infer_subcommands = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "rc-file", global = true)]
    pub rc_file: Option<PathBuf>,

    /// Calendar collection JSON; falls back to `data.location`.
    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the band and window a reference date falls in.
    Classify {
        #[arg(allow_hyphen_values = true)]
        when: String,
        /// Step the reference by whole hours, as the timeline arrows do.
        #[arg(long = "shift-hours", default_value_t = 0, allow_hyphen_values = true)]
        shift_hours: i64,
    },
    /// Print the calendar items overlapping the reference's window.
    Filter {
        #[arg(allow_hyphen_values = true)]
        when: String,
    },
    /// Compute the grid placement of a single item.
    Position {
        #[arg(allow_hyphen_values = true)]
        start: String,
        #[arg(allow_hyphen_values = true)]
        end: String,
        #[arg(
            long,
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<HourBand>())
        )]
        band: Option<HourBand>,
    },
    /// Classify, filter and place every item for a reference date.
    View {
        #[arg(allow_hyphen_values = true)]
        when: String,
        /// Step the reference by whole hours, as the timeline arrows do.
        #[arg(long = "shift-hours", default_value_t = 0, allow_hyphen_values = true)]
        shift_hours: i64,
    },
    /// List the dateline days starting at a reference date.
    Week {
        #[arg(default_value = "today", allow_hyphen_values = true)]
        when: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        weeks: i64,
        #[arg(
            long,
            default_value_t = Dateline::DEFAULT_DAYS,
            value_parser = clap::value_parser!(u16).range(1..=MAX_DAYS as i64).map(usize::from)
        )]
        days: usize,
    },
    /// Reshape period/work-center capacity JSON into table rows.
    Resources { file: PathBuf },
    /// Print the effective configuration.
    Show,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` tokens out of the
/// argument list so clap never sees them.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}
