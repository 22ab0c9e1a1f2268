//! Stitch every configured ticker's daily files into one CSV per ticker.
//!
//! Usage: `quotelog-stitch <parameters.json> <field>[:alt] ...`
//!
//! Output goes to `<data_dir>/calc/<ticker>_stitched.csv`.

use std::process::ExitCode;

use quotelog::{FieldRequest, PollerConfig, QuotelogError, SeriesStitcher, SnapshotStore, cli};

const USAGE: &str = "usage: quotelog-stitch <parameters.json> <field>[:alt] ...";

fn run(args: &[String]) -> Result<(), QuotelogError> {
    let Some((params, fields)) = args.split_first() else {
        return Err(QuotelogError::InvalidArg(USAGE.to_string()));
    };
    if fields.is_empty() {
        return Err(QuotelogError::InvalidArg(USAGE.to_string()));
    }
    let requests = fields
        .iter()
        .map(|f| FieldRequest::parse(f))
        .collect::<Result<Vec<_>, _>>()?;

    let cfg = PollerConfig::load(cli::parameters_path(Some(params.clone())))?;
    let store = SnapshotStore::new(&cfg.data_dir);
    let out_dir = cfg.data_dir.join("calc");
    std::fs::create_dir_all(&out_dir).map_err(|e| QuotelogError::io(&out_dir, e))?;

    for ticker in &cfg.tickers {
        let files = store.daily_files(ticker)?;
        if files.is_empty() {
            tracing::warn!(ticker = %ticker, "no daily files");
            continue;
        }
        let stitcher = SeriesStitcher::open(files.iter().map(|f| &f.path))?;
        let series = stitcher.series(ticker, &requests);
        let out = out_dir.join(format!("{ticker}_stitched.csv"));
        series.write_csv(&out)?;
        tracing::info!(
            ticker = %ticker,
            files = files.len(),
            rows = series.len(),
            out = %out.display(),
            "stitched"
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    cli::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("quotelog-stitch: {e}");
            ExitCode::FAILURE
        }
    }
}
