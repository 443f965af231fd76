// Thu Jan 22 2026 - Alex

use super::driver::WorkerPhase;
use crate::signal::SignalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker phase {0:?} is impossible after a scan")]
    InvariantViolation(WorkerPhase),
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}
