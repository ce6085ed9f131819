//! Wallet Shell - desktop shell supervisor for the walletd daemon
//!
//! This is the binary entry point. All logic lives in the workspace crates.

use std::path::PathBuf;

use clap::Parser;
use wshell_app::{ShellConfig, ShellSettings};

/// Wallet Shell - supervises walletd and serves its UI in a locked-down window
#[derive(Parser, Debug)]
#[command(name = "wshell")]
#[command(
    about = "Desktop shell supervisor for the walletd wallet daemon",
    long_about = None
)]
struct Args {
    /// Development mode: point at a running dev server instead of spawning
    /// walletd, and allow in-window navigation for live reload
    #[arg(long)]
    dev: bool,

    /// Override the wallet daemon executable path
    #[arg(long, value_name = "PATH")]
    daemon: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    wshell_core::logging::init()?;

    let settings = ShellSettings::load();
    let config = ShellConfig::resolve(args.dev, args.daemon, settings)?;
    wshell_app::run(config).await?;
    Ok(())
}
