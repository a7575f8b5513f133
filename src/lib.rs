pub mod cli;
pub mod core;

use crate::cli::scorecard::ScorecardOptions;
use crate::cli::screen::ScreenOptions;
use crate::core::config::AppConfig;
use crate::core::journal::Journal;
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Commands that run against the configured journal.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Screen(ScreenOptions),
    Scorecard(ScorecardOptions),
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Deal scope starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load().context("No configuration found; run `dealscope setup` first")?,
    };
    debug!("Loaded config: {config:#?}");

    let journal_path = config.journal_path()?;
    let journal = Journal::load_from_path(&journal_path)?;

    match command {
        AppCommand::Screen(options) => cli::screen::run(&journal, &config.screening, &options),
        AppCommand::Scorecard(options) => cli::scorecard::run(&journal, &options),
    }
}
