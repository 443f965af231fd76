// Thu Jan 22 2026 - Alex

//! Worker side: phase state machine, its signal channel and the scan task.

pub mod channel;
pub mod driver;
pub mod error;
pub mod scan;

pub use channel::{SignalChannel, WorkerChannel};
pub use driver::{PhaseProbe, WorkerDriver, WorkerPhase, WorkerState};
pub use error::WorkerError;
pub use scan::{EntryKind, FsScan, MatchRecord, ScanOutcome, ScanProbe, ScanTask};

use crate::signal::{self, SignalSet, INBOX};
use crate::utils::process::ProcessUtils;
use log::{debug, error};
use std::path::Path;

/// Body of a freshly forked worker process. Returns the exit code.
///
/// An invariant violation aborts the process instead of returning, the
/// overlord replaces it on its next cycle.
pub fn run(slot: usize, pattern: &str, root: &Path) -> i32 {
    // Anything posted before the fork belongs to the overlord.
    INBOX.reset();

    if let Err(e) = signal::install_worker_handlers() {
        error!("worker {}: {}", slot, e);
        return e.exit_code();
    }
    if let Err(e) = signal::set_mask(&SignalSet::worker()) {
        error!("worker {}: {}", slot, e);
        return e.exit_code();
    }

    let parent = ProcessUtils::parent_pid();
    debug!("worker {}: started as pid {} under {}", slot, ProcessUtils::current_pid(), parent);

    let mut driver = WorkerDriver::new(
        slot,
        pattern,
        root.to_path_buf(),
        parent,
        FsScan::new(),
        SignalChannel::new(parent),
    );

    match driver.run() {
        Ok(()) => 0,
        Err(WorkerError::InvariantViolation(phase)) => {
            error!("worker {}: phase {:?} after a scan, aborting", slot, phase);
            log::logger().flush();
            std::process::abort();
        }
        Err(e) => {
            error!("worker {}: {}", slot, e);
            1
        }
    }
}
