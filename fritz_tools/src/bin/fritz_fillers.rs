//! Create filler sources on the portal and submit their follow-up requests.
//!
//! # Usage
//!
//! ```bash
//! fritz-fillers list_of_fillers.csv --token $TOKEN
//! fritz-fillers list_of_fillers.csv --onlycreate
//! fritz-fillers list_of_fillers.csv --dry-run
//! ```
//!
//! One result line per outcome is printed on stdout; logs go to stderr.
//! Exits non-zero when any row, source or request failed.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use fritz_tools::logging::init_logging;
use fritz_tools::parsing::parse_targets_csv;
use fritz_tools::portal::{PortalConfig, PortalFactory, PortalKind, PortalSettings};
use fritz_tools::services::{run_filler_sync, SyncOptions, SyncReport};

#[derive(Parser, Debug)]
#[command(name = "fritz-fillers", version, about = "Create filler sources and requests on fritz")]
struct Args {
    /// Target list (CSV with object_id, ra, dec, exposure_time, requester, observation_choice)
    #[arg(default_value = "list_of_fillers.txt")]
    list: PathBuf,

    /// Only create sources, do not submit requests
    #[arg(long = "onlycreate")]
    only_create: bool,

    /// Portal API token (falls back to FRITZ_TOKEN, then token.txt)
    #[arg(long)]
    token: Option<String>,

    /// Portal base URL
    #[arg(long)]
    host: Option<String>,

    /// Settings file (default: fritz.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use an empty in-memory portal and log the writes instead of sending
    /// them. Nothing is looked up on the real portal, so every source reads
    /// as new and every result line is marked "(dry run)".
    #[arg(long)]
    dry_run: bool,
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let settings = PortalSettings::load(args.config.as_deref()).context("loading settings")?;

    let kind = PortalKind::for_dry_run(args.dry_run);
    let config = match kind {
        PortalKind::Local => {
            info!("Dry run: nothing is sent to the portal");
            None
        }
        PortalKind::Http => {
            let config = PortalConfig::from_settings(
                &settings,
                args.host.as_deref(),
                args.token.as_deref(),
            )?;
            info!("Using portal {}", config.host);
            Some(config)
        }
    };
    let portal = PortalFactory::create(kind, config.as_ref())?;

    let rows = parse_targets_csv(&args.list)
        .with_context(|| format!("reading target list {}", args.list.display()))?;

    let options = SyncOptions::from_settings(&settings, args.only_create);
    let report = SyncReport::new().with_echo(true).with_simulated(args.dry_run);
    let report = run_filler_sync(portal.as_ref(), rows, &options, report).await;

    Ok(!report.has_failures())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
