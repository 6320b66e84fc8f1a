mod config;
mod daemon;
mod receiver;
mod sender;

use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use clap::Parser;
use log::error;
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};

use crate::config::Config;
use crate::daemon::Daemon;

#[derive(Parser)]
#[command(name = "ripd", about = "Distance-vector routing daemon for virtual topologies")]
struct Cli {
    /// Path to the router configuration file.
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // usage errors follow the same exit-status contract as other fatal
    // errors, so handle them instead of letting clap pick the status
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            exit(0);
        }
    };

    if let Err(e) = TermLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("failed to init logger: {e}");
        exit(0);
    }

    if let Err(e) = start(cli).await {
        error!("{e:#}");
        // fatal errors report on stderr but keep the exit status at 0
        exit(0);
    }
}

async fn start(cli: Cli) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("could not read configuration file {}", cli.config.display()))?;
    let config = Config::parse(&text).context("invalid config file")?;

    let daemon = Daemon::new(config).await?;
    daemon.run().await;
    Ok(())
}
