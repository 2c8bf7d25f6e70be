//! Binary crate for the `watch-weather` companion process.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Rendering the settings page interactively
//! - Running the device bridge over stdin/stdout

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod form;
mod host;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the device bridge.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watch_weather=info,watch_weather_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
