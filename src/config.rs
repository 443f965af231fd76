// Tue Jan 13 2026 - Alex

use crate::cli::Args;
use colored::Colorize;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_INTERVAL_SECS: u64 = 60;
/// One year. Longer intervals overflow the deadline arithmetic of the idle wait.
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;
pub const MAX_VERBOSITY: u8 = 3;
/// Upper bound on the worker count, the notification inbox is sized for it.
pub const MAX_WORKERS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub patterns: Vec<String>,
    pub interval_secs: u64,
    pub verbosity: u8,
    pub root: PathBuf,
    pub foreground: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            verbosity: 0,
            root: PathBuf::from("/"),
            foreground: false,
            log_file: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity.min(MAX_VERBOSITY);
        self
    }

    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    pub fn with_foreground(mut self, foreground: bool) -> Self {
        self.foreground = foreground;
        self
    }

    pub fn with_log_file(mut self, log_file: PathBuf) -> Self {
        self.log_file = Some(log_file);
        self
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("json") {
            return Err(ConfigError::UnsupportedFormat(ext.to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        let verbosity = config.verbosity;
        Ok(config.with_verbosity(verbosity))
    }

    /// Command line values win over whatever the config file said.
    pub fn merge_cli(&mut self, args: &Args) {
        if !args.patterns.is_empty() {
            self.patterns = args.patterns.clone();
        }
        if args.verbose > 0 {
            self.verbosity = args.verbose.min(MAX_VERBOSITY);
        }
        if let Some(raw) = args.time {
            self.apply_interval(raw);
        }
        if let Some(root) = &args.root {
            self.root = root.clone();
        }
        if args.foreground {
            self.foreground = true;
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = Some(log_file.clone());
        }
    }

    /// Takes a raw `-t` value. Non-positive values are refused and the
    /// current interval is kept.
    pub fn apply_interval(&mut self, raw: i64) -> bool {
        if raw <= 0 {
            warn!("rejected round interval {}s, keeping {}s", raw, self.interval_secs);
            println!(
                "{} time interval must be positive, using {}s",
                "[!]".yellow(),
                self.interval_secs
            );
            return false;
        }
        self.interval_secs = raw as u64;
        true
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.is_empty() {
            return Err(ConfigError::NoPatterns);
        }
        if self.patterns.len() > MAX_WORKERS {
            return Err(ConfigError::TooManyWorkers(self.patterns.len()));
        }
        if let Some(index) = self.patterns.iter().position(|p| p.is_empty()) {
            return Err(ConfigError::EmptyPattern(index));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.interval_secs > MAX_INTERVAL_SECS {
            return Err(ConfigError::IntervalTooLong(self.interval_secs));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Unsupported config format: {0:?}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("At least one pattern is required")]
    NoPatterns,
    #[error("Too many patterns: {0} (at most {max})", max = MAX_WORKERS)]
    TooManyWorkers(usize),
    #[error("Pattern {0} is empty")]
    EmptyPattern(usize),
    #[error("Round interval must be greater than 0")]
    InvalidInterval,
    #[error("Round interval {0}s is too long (at most {max}s)", max = MAX_INTERVAL_SECS)]
    IntervalTooLong(u64),
}
