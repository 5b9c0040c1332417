mod app;
mod backend;
mod config;
mod error;
mod events;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::io;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "askr")]
#[command(version)]
#[command(about = "Terminal chat client for a question/answer assistant service", long_about = None)]
struct Cli {
    /// Backend service URL (overrides ASKR_BACKEND_URL and the config file)
    #[arg(long)]
    backend_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let mut config = Config::load()?;
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    app::run(config).await
}
