// Tue Jan 20 2026 - Alex

use super::SupervisorError;
use crate::signal::{self, Notification};
use crate::worker;
use log::debug;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Exited(i32),
    Signaled(i32),
    /// The status was already collected elsewhere.
    Vanished,
}

impl fmt::Display for WorkerExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerExit::Exited(code) => write!(f, "exited with {}", code),
            WorkerExit::Signaled(signal) => write!(f, "killed by signal {}", signal),
            WorkerExit::Vanished => write!(f, "status unavailable"),
        }
    }
}

/// Everything the overlord does to worker processes.
pub trait ProcessControl {
    /// Starts a worker bound to `slot` and `pattern` and returns its handle.
    fn spawn_worker(&mut self, slot: usize, pattern: &str) -> Result<Pid, SupervisorError>;

    fn notify(&mut self, pid: Pid, notification: Notification) -> Result<(), SupervisorError>;

    /// Collects the exit status if the process has ended, without blocking.
    fn try_reap(&mut self, pid: Pid) -> Result<Option<WorkerExit>, SupervisorError>;

    /// Blocks until the process has ended and collects its status.
    fn reap(&mut self, pid: Pid) -> Result<WorkerExit, SupervisorError>;
}

/// Forks real worker processes and talks to them with signals.
#[derive(Debug, Clone)]
pub struct OsProcessControl {
    root: PathBuf,
}

impl OsProcessControl {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn exit_of(status: WaitStatus) -> Option<WorkerExit> {
        match status {
            WaitStatus::Exited(_, code) => Some(WorkerExit::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(WorkerExit::Signaled(signal as i32)),
            _ => None,
        }
    }
}

impl ProcessControl for OsProcessControl {
    fn spawn_worker(&mut self, slot: usize, pattern: &str) -> Result<Pid, SupervisorError> {
        // The overlord keeps every notification blocked outside its waits, so
        // the child starts with them blocked too and nothing is delivered to
        // the inherited handlers before the worker installs its own.
        match unsafe { fork() }.map_err(|source| SupervisorError::Spawn { slot, source })? {
            ForkResult::Parent { child } => {
                debug!("overlord: created worker {} with pid {}", slot, child);
                Ok(child)
            }
            ForkResult::Child => {
                // Never returns into the overlord's code, so the inherited copy
                // of the registry is left untouched until the process exits.
                let code = worker::run(slot, pattern, &self.root);
                std::process::exit(code);
            }
        }
    }

    fn notify(&mut self, pid: Pid, notification: Notification) -> Result<(), SupervisorError> {
        signal::send(pid, notification)?;
        Ok(())
    }

    fn try_reap(&mut self, pid: Pid) -> Result<Option<WorkerExit>, SupervisorError> {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => Ok(None),
            Ok(status) => Ok(Self::exit_of(status)),
            Err(nix::Error::ECHILD) => Ok(Some(WorkerExit::Vanished)),
            Err(source) => Err(SupervisorError::Reap { pid, source }),
        }
    }

    fn reap(&mut self, pid: Pid) -> Result<WorkerExit, SupervisorError> {
        loop {
            match waitpid(pid, None) {
                Ok(status) => {
                    if let Some(exit) = Self::exit_of(status) {
                        return Ok(exit);
                    }
                }
                Err(nix::Error::EINTR) => continue,
                Err(nix::Error::ECHILD) => return Ok(WorkerExit::Vanished),
                Err(source) => return Err(SupervisorError::Reap { pid, source }),
            }
        }
    }
}
