use anyhow::Result;
use clap::Parser;
use log::debug;

mod api;
mod cli;
mod config;
mod export;
mod import;
mod logging;
mod reference;
mod refresh;
mod resolve;
mod tui;

use cli::Cli;
use cli::handlers::{ensure_token, handle_command};
use config::Config;
use logging::LogTarget;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    config.apply_overrides(cli.url.clone(), cli.token.clone());

    if cli.is_interactive() {
        logging::init(LogTarget::File(logging::log_file_path()), cli.verbose)?;
        debug!("Loaded configuration for {}", config.base_url);
        return tui::run(config).await;
    }

    logging::init(LogTarget::Stderr, cli.verbose)?;
    debug!("Loaded configuration for {}", config.base_url);
    ensure_token(&mut config)?;

    match cli.command {
        Some(command) => handle_command(command, &config).await,
        None => tui::run(config).await,
    }
}
