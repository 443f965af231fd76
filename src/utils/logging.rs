// Tue Jan 13 2026 - Alex

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub struct LoggingUtils;

impl LoggingUtils {
    /// Human-friendly stderr output for foreground runs.
    pub fn init_stderr(level: LevelFilter) {
        env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp_secs()
            .try_init()
            .ok();
    }

    /// Appends to `file_path`, the only sink a detached daemon has.
    pub fn init_with_file(level: LevelFilter, file_path: &Path) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(file_path)?;

        let logger = Box::new(FileLogger::new(level, file));
        log::set_boxed_logger(logger).ok();
        log::set_max_level(level);
        Ok(())
    }

    pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

pub struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    pub fn new(level: LevelFilter, file: File) -> Self {
        Self {
            level,
            file: Mutex::new(file),
        }
    }

    fn format_line(record: &Record) -> String {
        // Overlord and workers share one file, the pid tells them apart.
        format!(
            "{} {:5} [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            std::process::id(),
            record.args()
        )
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format_line(record);
        let mut file = self.file.lock();
        // Flushed per line: a worker may abort right after logging.
        let _ = file.write_all(line.as_bytes());
        let _ = file.flush();
    }

    fn flush(&self) {
        let _ = self.file.lock().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(LoggingUtils::level_from_verbosity(0), LevelFilter::Info);
        assert_eq!(LoggingUtils::level_from_verbosity(1), LevelFilter::Debug);
        assert_eq!(LoggingUtils::level_from_verbosity(2), LevelFilter::Trace);
        assert_eq!(LoggingUtils::level_from_verbosity(3), LevelFilter::Trace);
    }

    #[test]
    fn test_file_logger_filters_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seeker.log");
        fs::write(&path, "earlier\n").unwrap();

        let file = OpenOptions::new().append(true).open(&path).unwrap();
        let logger = FileLogger::new(LevelFilter::Info, file);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("worker 0: woke up"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("hidden"))
                .build(),
        );
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "earlier");
        assert!(lines[1].contains("INFO"));
        assert!(lines[1].contains(&format!("[{}]", std::process::id())));
        assert!(lines[1].ends_with("worker 0: woke up"));
    }
}
