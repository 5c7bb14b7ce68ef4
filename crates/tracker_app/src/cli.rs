use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "job-tracker",
    about = "Classify the day's inbox threads and keep the job application ledger current",
    version
)]
pub struct Cli {
    /// Day to scan (YYYY-MM-DD, UTC); defaults to today
    #[arg(long)]
    pub day: Option<NaiveDate>,
    /// Override TRACKER_LEDGER_PATH
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    /// Override TRACKER_MAILBOX_PATH
    #[arg(long)]
    pub mailbox: Option<PathBuf>,
    /// Also write logs to ./tracker.log
    #[arg(long)]
    pub log_file: bool,
    /// Skip the completion service; every message is treated as irrelevant
    #[arg(long)]
    pub dry_run: bool,
}
