// Wed Jan 15 2026 - Alex

use super::args::Args;
use crate::config::{Config, ConfigError};
use crate::supervisor;
use crate::utils::{LoggingUtils, ProcessUtils};
use clap::CommandFactory;
use colored::Colorize;
use log::{error, info, warn};
use std::path::PathBuf;

/// Used when a daemon was started without `--log-file`.
const DEFAULT_LOG_NAME: &str = "fileseeker.log";

pub struct CommandHandler;

impl CommandHandler {
    pub fn new() -> Self {
        Self
    }

    /// Runs the supervisor and returns the process exit code.
    pub fn execute(&self, args: Args) -> anyhow::Result<i32> {
        let config = match self.build_config(&args) {
            Ok(config) => config,
            Err(ConfigError::NoPatterns) => {
                println!("{} at least one pattern is required\n", "[!]".red());
                Args::command().print_help()?;
                return Ok(1);
            }
            Err(e) => return Err(e.into()),
        };

        if !config.foreground {
            println!("{} detaching, logging to {:?}", "[*]".cyan(), self.log_path(&config));
            ProcessUtils::daemonize()?;
        }

        self.setup_logging(&config)?;
        // The first warning was issued before any logger existed.
        if let Some(raw) = self.rejected_interval(&args) {
            warn!(
                "rejected round interval {}s, keeping {}s",
                raw, config.interval_secs
            );
        }
        info!(
            "fileseeker {} started as pid {}, patterns: {:?}",
            env!("CARGO_PKG_VERSION"),
            ProcessUtils::current_pid(),
            config.patterns
        );

        match supervisor::start(&config) {
            Ok(report) => {
                info!(
                    "overlord: shut down, {} workers signalled, {} reaped",
                    report.signalled, report.reaped
                );
                Ok(0)
            }
            Err(e) => {
                error!("overlord: {}", e);
                if config.foreground {
                    eprintln!("{} {}", "[!]".red(), e);
                }
                Ok(e.exit_code())
            }
        }
    }

    pub fn build_config(&self, args: &Args) -> Result<Config, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        config.merge_cli(args);
        config.validate()?;
        Ok(config)
    }

    fn rejected_interval(&self, args: &Args) -> Option<i64> {
        args.time.filter(|raw| *raw <= 0)
    }

    fn log_path(&self, config: &Config) -> Option<PathBuf> {
        match &config.log_file {
            Some(path) => Some(path.clone()),
            None if !config.foreground => Some(std::env::temp_dir().join(DEFAULT_LOG_NAME)),
            None => None,
        }
    }

    fn setup_logging(&self, config: &Config) -> anyhow::Result<()> {
        let level = LoggingUtils::level_from_verbosity(config.verbosity);

        match self.log_path(config) {
            Some(path) => LoggingUtils::init_with_file(level, &path)?,
            None => LoggingUtils::init_stderr(level),
        }

        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}
