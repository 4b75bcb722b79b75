use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "checklist",
    version,
    about = "Run the compliance check catalog against Athena and emit one JSON record per line"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run every check and emit records on stdout
    Run(RunArgs),
    /// Print the query catalog without contacting the engine
    Queries,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Region the query engine runs in
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Bucket the engine writes temporary result objects to
    #[arg(long, default_value = "sec-metrics")]
    pub bucket: String,

    /// Reference day for day-partitioned checks (YYYY-MM-DD), defaults to
    /// today. Pin to a historical day to skip known-bad recent partitions.
    #[arg(long)]
    pub start_day: Option<NaiveDate>,

    /// Seconds to sleep between status polls
    #[arg(long, default_value_t = 2)]
    pub poll_interval_secs: u64,

    /// Give up on an execution after this many polls
    #[arg(long, default_value_t = 100)]
    pub max_polls: u32,

    /// Write records to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}
