//! # Application Entry Point
//!
//! CLI entry point: parse arguments, configure the thread pool, run the
//! analysis pipeline, and report counters to the `.log` file.
//! Replaces `sprime/SMain.java`.

use std::process::ExitCode;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use rsprime::config::Config;
use rsprime::error::{Result, SprimeError};
use rsprime::io::output::RunLog;
use rsprime::pipelines::Analyzer;
use rsprime::utils::elapsed_str;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<()> {
    let config = Config::parse_and_validate()?;
    if let Some(n) = config.nthreads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| {
                SprimeError::config(format!("failed to initialize thread pool: {e}"))
            })?;
    }

    let mut log = RunLog::create(&config.log_path())?;
    log.duo(&format!("rsprime (version {})", env!("CARGO_PKG_VERSION")))?;
    log.duo(&format!(
        "Command line: rsprime {}",
        std::env::args().skip(1).collect::<Vec<_>>().join(" ")
    ))?;

    let start = Instant::now();
    let summary = match Analyzer::new(config).run(&mut log) {
        Ok(summary) => summary,
        Err(e) => {
            let _ = log.duo(&format!("ERROR: {e}"));
            let _ = log.flush();
            return Err(e);
        }
    };

    log.duo("")?;
    log.duo(&format!(
        "Number of outgroup samples:      {}",
        summary.n_outgroup_samples
    ))?;
    log.duo(&format!(
        "Number of target samples:        {}",
        summary.n_target_samples
    ))?;
    log.duo(&format!(
        "Variants analyzed:               {}",
        summary.n_variants
    ))?;
    log.duo(&format!(
        "Segments detected:               {}",
        summary.n_segments
    ))?;
    log.duo(&format!(
        "Run time:                        {}",
        elapsed_str(start.elapsed())
    ))?;
    log.duo("")?;
    log.duo("rsprime finished")?;
    log.flush()?;
    Ok(())
}
