use args::Cli;
use clap::Parser;
use commands::process_args;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod commands;
pub mod error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    process_args(&args).await
}
