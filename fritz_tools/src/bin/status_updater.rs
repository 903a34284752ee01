//! Move one follow-up request to a terminal status.
//!
//! # Usage
//!
//! ```bash
//! # fetch the request, keep its allocation/object, set Complete
//! status-updater -r 12345 -s 0
//!
//! # skip the fetch and send the given identifiers
//! status-updater -r 12345 -s 2 -a 1050 -o ZTF21abc --direct
//! ```
//!
//! Status codes: 0 Complete, 1 Interrupted, 2 Skipped.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use fritz_tools::logging::init_logging;
use fritz_tools::models::{AllocationId, RequestId};
use fritz_tools::portal::{PortalConfig, PortalFactory, PortalKind, PortalSettings};
use fritz_tools::services::{status_from_code, update_request_status, UpdateMode};

#[derive(Parser, Debug)]
#[command(
    name = "status-updater",
    version,
    about = "Update the status of a fritz follow-up request"
)]
struct Args {
    /// Request id to update
    #[arg(short = 'r', long = "request-id", alias = "request_id")]
    request_id: RequestId,

    /// New status: 0 Complete, 1 Interrupted, 2 Skipped
    #[arg(short = 's', long, allow_negative_numbers = true)]
    status: i64,

    /// Allocation id of the request
    #[arg(short = 'a', long = "alloc-id", alias = "alloc_id")]
    alloc_id: Option<AllocationId>,

    /// Object id of the request
    #[arg(short = 'o', long = "object-id", alias = "object_id")]
    object_id: Option<String>,

    /// Portal base URL
    #[arg(short = 'w', long)]
    host: Option<String>,

    /// Portal API token (falls back to FRITZ_TOKEN, then token.txt)
    #[arg(short = 't', long)]
    token: Option<String>,

    /// Send --alloc-id and --object-id without fetching the request first
    #[arg(long, requires_all = ["alloc_id", "object_id"])]
    direct: bool,

    /// Settings file (default: fritz.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn mode(&self) -> anyhow::Result<UpdateMode> {
        if !self.direct {
            return Ok(UpdateMode::FetchMerge {
                expected_allocation: self.alloc_id,
                expected_obj_id: self.object_id.clone(),
            });
        }
        match (self.alloc_id, &self.object_id) {
            (Some(allocation_id), Some(obj_id)) => Ok(UpdateMode::Direct {
                allocation_id,
                obj_id: obj_id.clone(),
            }),
            _ => bail!("--direct needs both --alloc-id and --object-id"),
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // reject bad codes before touching configuration or the network
    status_from_code(args.status)?;
    let mode = args.mode()?;

    let settings = PortalSettings::load(args.config.as_deref()).context("loading settings")?;
    let config =
        PortalConfig::from_settings(&settings, args.host.as_deref(), args.token.as_deref())?;
    info!("Using portal {}", config.host);
    let portal = PortalFactory::create(PortalKind::Http, Some(&config))?;

    let outcome = update_request_status(portal.as_ref(), args.request_id, args.status, mode)
        .await
        .with_context(|| format!("updating request {}", args.request_id))?;

    println!(
        "Successfully updated request {} to {}",
        outcome.request_id, outcome.update.status
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
