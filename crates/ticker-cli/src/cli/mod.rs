//! CLI entry and dispatch.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ticker_core::config::Config;
use ticker_core::logging::WorkerGuard;
use ticker_core::{Settings, interrupt, logging};

mod commands;

#[derive(Parser)]
#[command(name = "ticker")]
#[command(version)]
#[command(about = "Cycles through news tickers fetched from a JSON endpoint")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    overrides: SettingsArgs,
}

/// Settings overrides shared by every command.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Ticker endpoint returning {"tickers": [...]}
    #[arg(long, global = true, env = "TICKER_URL", value_name = "URL")]
    url: Option<String>,

    /// Time between two tickers
    #[arg(long, global = true, value_name = "MS")]
    interval: Option<u64>,

    /// Display template (first %s: text, second %s: short name)
    #[arg(long, global = true)]
    format: Option<String>,

    /// Fade-out and fade-in duration
    #[arg(long, global = true, value_name = "MS")]
    fade: Option<u64>,

    /// Never render tickers as links
    #[arg(long = "no-links", global = true)]
    no_links: bool,
}

impl SettingsArgs {
    /// Applies the flags given on the command line on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(url) = &self.url {
            settings.ticker_url.clone_from(url);
        }
        if let Some(ms) = self.interval {
            settings.interval = Duration::from_millis(ms);
        }
        if let Some(format) = &self.format {
            settings.format.clone_from(format);
        }
        if let Some(ms) = self.fade {
            settings.fade_in_time = Duration::from_millis(ms);
            settings.fade_out_time = Duration::from_millis(ms);
        }
        if self.no_links {
            settings.show_links = false;
        }
        settings
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show the ticker full-screen (default)
    Run,
    /// Print tickers as lines and read commands from stdin
    Stream {
        /// Exit after the first ticker is shown
        #[arg(long)]
        once: bool,

        /// Also print every notification as a JSON line
        #[arg(long)]
        events: bool,
    },
    /// Fetch one batch and print it as JSON
    Fetch,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write a commented default config file
    Init,
    /// Print the effective configuration
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let Cli { command, overrides } = cli;

    match command.unwrap_or(Commands::Run) {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Show => commands::config::show(&overrides),
        },
        Commands::Run => {
            let (settings, _guard) = prepare(&overrides)?;
            commands::run::run(settings).await
        }
        Commands::Stream { once, events } => {
            let (settings, _guard) = prepare(&overrides)?;
            commands::stream::run(settings, commands::stream::StreamOptions { once, events })
                .await
        }
        Commands::Fetch => {
            let (settings, _guard) = prepare(&overrides)?;
            commands::fetch::run(&settings.ticker_url).await
        }
    }
}

/// Loads the config, starts file logging and applies the flags.
fn prepare(overrides: &SettingsArgs) -> Result<(Settings, WorkerGuard)> {
    let config = Config::load().context("load config")?;
    let guard = logging::init(&config.log_level).context("init logging")?;
    Ok((overrides.apply(config.ticker), guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_args_override_only_given_flags() {
        let args = SettingsArgs {
            interval: Some(2_000),
            fade: Some(0),
            no_links: true,
            ..Default::default()
        };
        let settings = args.apply(Settings::default());

        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.fade_in_time, Duration::ZERO);
        assert_eq!(settings.fade_out_time, Duration::ZERO);
        assert!(!settings.show_links);
        assert_eq!(settings.ticker_url, Settings::default().ticker_url);
        assert_eq!(settings.format, Settings::default().format);
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ticker",
            "stream",
            "--once",
            "--url",
            "http://localhost/t",
            "--format",
            "%s",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Some(Commands::Stream {
                once: true,
                events: false
            })
        ));
        assert_eq!(cli.overrides.url.as_deref(), Some("http://localhost/t"));
        assert_eq!(cli.overrides.format.as_deref(), Some("%s"));
    }
}
