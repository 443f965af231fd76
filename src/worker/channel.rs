// Thu Jan 22 2026 - Alex

use super::WorkerError;
use crate::signal::{self, CriticalSection, Event, Notification, SignalSet, INBOX};
use nix::unistd::Pid;

/// A worker's side of the notification protocol.
pub trait WorkerChannel {
    /// Blocks until at least one notification arrived.
    fn wait(&mut self) -> Result<Vec<Event>, WorkerError>;

    /// Whatever arrived so far, without blocking.
    fn poll(&mut self) -> Result<Vec<Event>, WorkerError>;

    /// Lets notifications interrupt the worker (during a scan) or holds them
    /// back until the next wait or poll.
    fn deliver(&mut self, enabled: bool) -> Result<(), WorkerError>;

    fn notify_parent(&mut self, notification: Notification) -> Result<(), WorkerError>;
}

#[derive(Debug)]
pub struct SignalChannel {
    parent: Pid,
    set: SignalSet,
}

impl SignalChannel {
    pub fn new(parent: Pid) -> Self {
        Self {
            parent,
            set: SignalSet::worker(),
        }
    }

    fn drain(&self) -> Result<Vec<Event>, WorkerError> {
        let _section = CriticalSection::enter(&self.set)?;
        Ok(INBOX.drain())
    }
}

impl WorkerChannel for SignalChannel {
    fn wait(&mut self) -> Result<Vec<Event>, WorkerError> {
        if INBOX.is_empty() {
            signal::wait_for_signal(&self.set)?;
        }
        self.drain()
    }

    fn poll(&mut self) -> Result<Vec<Event>, WorkerError> {
        // Polled once per directory entry: skip the mask syscalls when idle.
        if INBOX.is_empty() {
            return Ok(Vec::new());
        }
        self.drain()
    }

    fn deliver(&mut self, enabled: bool) -> Result<(), WorkerError> {
        if enabled {
            signal::unblock(&self.set)?;
        } else {
            signal::block(&self.set)?;
        }
        Ok(())
    }

    fn notify_parent(&mut self, notification: Notification) -> Result<(), WorkerError> {
        signal::send(self.parent, notification)?;
        Ok(())
    }
}
