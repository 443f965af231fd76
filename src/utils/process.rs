// Tue Jan 13 2026 - Alex

use nix::unistd::{self, Pid};

pub struct ProcessUtils;

impl ProcessUtils {
    /// Detaches from the controlling terminal. The working directory is kept
    /// so relative paths given on the command line stay valid; stdio goes to
    /// /dev/null.
    pub fn daemonize() -> nix::Result<()> {
        unistd::daemon(true, false)
    }

    pub fn current_pid() -> Pid {
        unistd::getpid()
    }

    pub fn parent_pid() -> Pid {
        unistd::getppid()
    }
}
