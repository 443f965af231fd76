// Tue Jan 20 2026 - Alex

use crate::signal::SignalError;
use nix::unistd::Pid;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
    #[error("Failed to spawn worker for slot {slot}: {source}")]
    Spawn {
        slot: usize,
        #[source]
        source: nix::Error,
    },
    #[error("Failed to reap worker {pid}: {source}")]
    Reap {
        pid: Pid,
        #[source]
        source: nix::Error,
    },
}

impl SupervisorError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SupervisorError::Signal(err) => err.exit_code(),
            _ => 1,
        }
    }
}
