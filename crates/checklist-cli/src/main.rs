use clap::Parser;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;

use args::Cli;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    // Records go to stdout; everything diagnostic stays on stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match commands::dispatch(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            1
        }
    };
    std::process::exit(code);
}
