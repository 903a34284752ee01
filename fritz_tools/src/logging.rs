//! Log setup shared by the binaries.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a stderr subscriber filtered by `RUST_LOG` (default `info`).
///
/// Logs go to stderr so stdout only carries result lines. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
