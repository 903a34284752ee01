//! Write the fixed alt/az pointing schedule.
//!
//! ```bash
//! make-pointing-schedule                      # writes fixed_schedule.csv
//! make-pointing-schedule --output grid.csv --exposure-time 30
//! ```

use std::path::PathBuf;

use clap::Parser;

use fritz_tools::logging::init_logging;
use fritz_tools::services::{write_pointing_schedule_file, PointingOptions, DEFAULT_OUTPUT};

#[derive(Parser, Debug)]
#[command(
    name = "make-pointing-schedule",
    version,
    about = "Write a fixed alt/az pointing schedule"
)]
struct Args {
    /// Output CSV path
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Exposure time per pointing, seconds
    #[arg(long, default_value_t = 70.0)]
    exposure_time: f64,

    /// Observation choice written on every row
    #[arg(long, default_value = "cl")]
    observation_choice: String,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    if !(args.exposure_time.is_finite() && args.exposure_time > 0.0) {
        anyhow::bail!("--exposure-time must be a positive number of seconds");
    }

    let options = PointingOptions {
        exposure_time: args.exposure_time,
        observation_choice: args.observation_choice,
        ..Default::default()
    };
    let count = write_pointing_schedule_file(&options, &args.output)?;
    println!("Wrote {} pointings to {}", count, args.output.display());
    Ok(())
}
