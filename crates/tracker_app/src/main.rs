mod cli;
mod config;
mod logging;
mod run;

use clap::Parser;
use tracker_logging::tracker_error;

use crate::cli::Cli;
use crate::config::TrackerConfig;
use crate::logging::LogDestination;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = TrackerConfig::load()?;

    let destination = if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    };
    logging::initialize(destination, config.log_level);

    let summary = match run::run(&cli, &config, run::system_clock()).await {
        Ok(summary) => summary,
        Err(err) => {
            tracker_error!("Run aborted: {:#}", err);
            return Err(err);
        }
    };

    println!(
        "scanned={} checkpointed={} failed={} new_applications={} status_updates={}",
        summary.scanned,
        summary.checkpointed,
        summary.failed,
        summary.applications_recorded,
        summary.statuses_updated
    );
    Ok(())
}
