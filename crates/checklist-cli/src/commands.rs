use std::fs::File;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use tracing::info;

use checklist_core::engine::athena::AthenaEngine;
use checklist_core::engine::executor::PollPolicy;
use checklist_core::engine::s3::S3Scratch;
use checklist_core::engine::SCRATCH_PREFIX;
use checklist_core::queries::checklist;
use checklist_core::report::JsonLines;
use checklist_core::{run_checklist, RunOptions};

use crate::args::{Cli, Command, RunArgs};

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.cmd {
        Command::Run(args) => run(args).await,
        Command::Queries => {
            queries();
            Ok(())
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(args.region.clone()))
        .load()
        .await;
    let engine = AthenaEngine::new(
        aws_sdk_athena::Client::new(&config),
        format!("s3://{}/{}", args.bucket, SCRATCH_PREFIX),
    );
    let scratch = S3Scratch::new(aws_sdk_s3::Client::new(&config), args.bucket.clone());

    let opts = RunOptions {
        start_day: args
            .start_day
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        poll: PollPolicy {
            interval: Duration::from_secs(args.poll_interval_secs),
            max_attempts: args.max_polls,
        },
    };

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut sink = JsonLines::new(out);

    let summary = run_checklist(&engine, &scratch, &mut sink, &opts).await?;
    info!(
        checks = summary.checks,
        records = summary.records,
        failed_checks = summary.failed_checks,
        "checklist complete"
    );
    Ok(())
}

fn queries() {
    for check in checklist() {
        let partitioning = if check.day_partitioned() {
            " (day-partitioned)"
        } else {
            ""
        };
        println!("-- {} / {}{}", check.section, check.item, partitioning);
        println!("{}\n", check.sql.trim());
    }
}
