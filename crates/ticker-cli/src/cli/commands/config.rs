//! Config command handlers.

use anyhow::{Context, Result};
use ticker_core::config;

use crate::cli::SettingsArgs;

pub fn path() {
    println!("{}", config::paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

/// Prints the loaded config with command-line overrides applied.
pub fn show(overrides: &SettingsArgs) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;
    config.ticker = overrides.apply(config.ticker);
    print!("{}", config.to_toml()?);
    Ok(())
}
