// Tue Jan 13 2026 - Alex

pub mod logging;
pub mod process;

pub use logging::LoggingUtils;
pub use process::ProcessUtils;
