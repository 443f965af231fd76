// Tue Jan 13 2026 - Alex

use colored::Colorize;
use fileseeker::cli;

fn main() {
    let code = match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "[!]".red(), e);
            1
        }
    };

    std::process::exit(code);
}
