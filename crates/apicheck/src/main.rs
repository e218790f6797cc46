//! apicheck
//!
//! Runs the API suite against `BASE_URL` and writes the run log to `LOG_DIR`.

use apicheck::{cases, run_suite};
use apicheck_harness::{HarnessConfig, init_logging};
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "apicheck", version)]
#[command(about = "Data-driven REST API test runner")]
struct Cli {
    #[command(flatten)]
    config: HarnessConfig,

    /// Run only tests whose title contains this text (case-insensitive).
    #[arg(long)]
    filter: Option<String>,

    /// List the selected tests and exit.
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config;
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(2);
    }

    let selected = cases::select(cases::all(), cli.filter.as_deref());
    if cli.list {
        for case in &selected {
            println!("{}", case.title);
        }
        return Ok(());
    }
    if selected.is_empty() {
        anyhow::bail!(
            "No test matches filter '{}'",
            cli.filter.unwrap_or_default()
        );
    }

    info!(
        base_url = %config.base_url,
        run_id = %config.run_id(),
        tests = selected.len(),
        workers = config.workers,
        "Starting apicheck"
    );

    let report = run_suite(&config, selected, Box::new(std::io::stdout()))
        .await
        .map_err(|e| anyhow::anyhow!("Suite setup failed: {}", e))?;

    println!("\n{}", report);
    println!("Log: {}", config.log_file_path().display());

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
