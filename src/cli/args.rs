// Wed Jan 15 2026 - Alex

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fileseeker")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Supervised daemon that periodically searches the filesystem for name patterns", long_about = None)]
pub struct Args {
    /// Raise log verbosity (repeatable, up to -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Seconds between search rounds
    #[arg(short, long, allow_negative_numbers = true, value_name = "SECONDS")]
    pub time: Option<i64>,

    /// JSON config file, command line values override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory every search starts from
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Stay attached to the terminal instead of daemonizing
    #[arg(short, long)]
    pub foreground: bool,

    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// One worker is started per pattern
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,
}
