//! Poll the configured tickers forever, appending snapshots to daily files.
//!
//! Usage: `quotelog-poll [parameters.json]`

use std::process::ExitCode;
use std::sync::Arc;

use quotelog::{Poller, PollerConfig, cli};
use quotelog_yahoo::YahooSource;

fn main() -> ExitCode {
    cli::init_tracing();

    let path = cli::parameters_path(std::env::args().nth(1));
    let cfg = match PollerConfig::load(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "cannot start");
            eprintln!("quotelog-poll: {e}");
            return ExitCode::FAILURE;
        }
    };

    let source = match YahooSource::try_new_default() {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("quotelog-poll: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut poller = match Poller::from_config(cfg, source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("quotelog-poll: {e}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("quotelog-poll: cannot start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(poller.run());
    ExitCode::SUCCESS
}
