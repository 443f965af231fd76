// Tue Jan 15 2026 - Alex

pub mod cli;
pub mod config;
pub mod signal;
pub mod supervisor;
pub mod utils;
pub mod worker;

pub use config::Config;
pub use signal::Notification;
pub use supervisor::{Overlord, WorkerRegistry};
pub use worker::{FsScan, WorkerDriver};
