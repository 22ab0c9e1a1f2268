//! Helpers shared by the `quotelog-poll` and `quotelog-stitch` binaries.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

/// Environment variable naming the parameters file.
pub const PARAMETERS_ENV: &str = "QUOTELOG_PARAMETERS";

/// Parameters file used when neither an argument nor the environment names one.
pub const DEFAULT_PARAMETERS: &str = "parameters.json";

/// Resolve the parameters path: explicit argument, then [`PARAMETERS_ENV`], then
/// [`DEFAULT_PARAMETERS`].
#[must_use]
pub fn parameters_path(arg: Option<String>) -> PathBuf {
    arg.or_else(|| std::env::var(PARAMETERS_ENV).ok())
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_PARAMETERS), PathBuf::from)
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
