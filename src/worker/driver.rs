// Thu Jan 22 2026 - Alex

use super::channel::WorkerChannel;
use super::scan::{ScanOutcome, ScanProbe, ScanTask};
use super::WorkerError;
use crate::signal::{Event, Notification};
use log::{debug, info, trace, warn};
use nix::unistd::Pid;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    Idle,
    Resuming,
    Scanning,
    Suspending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerState {
    pub phase: WorkerPhase,
    /// Set when a suspend came in, so the next Suspending pass does not
    /// report a completion the overlord never asked for.
    pub external_suspend: bool,
}

impl Default for WorkerState {
    fn default() -> Self {
        Self {
            phase: WorkerPhase::Idle,
            external_suspend: false,
        }
    }
}

impl WorkerState {
    /// Applies one notification. Only the parent may steer a worker.
    pub fn apply(&mut self, event: &Event, parent: Pid) -> bool {
        if event.sender != parent {
            debug!("ignoring {} from {}, parent is {}", event.kind, event.sender, parent);
            return false;
        }

        match event.kind {
            Notification::Resume => {
                // A fresh round supersedes any suspend that came before it.
                self.phase = WorkerPhase::Resuming;
                self.external_suspend = false;
                true
            }
            Notification::Suspend => {
                self.phase = WorkerPhase::Suspending;
                self.external_suspend = true;
                true
            }
            _ => false,
        }
    }

    fn apply_all(&mut self, events: &[Event], parent: Pid) {
        for event in events {
            self.apply(event, parent);
        }
    }
}

/// Feeds notifications that arrive mid-scan into the worker state.
pub struct PhaseProbe<'a, W: WorkerChannel> {
    state: &'a mut WorkerState,
    channel: &'a mut W,
    parent: Pid,
}

impl<'a, W: WorkerChannel> ScanProbe for PhaseProbe<'a, W> {
    fn keep_scanning(&mut self) -> bool {
        match self.channel.poll() {
            Ok(events) => self.state.apply_all(&events, self.parent),
            Err(e) => warn!("failed to poll notifications: {}", e),
        }
        self.state.phase == WorkerPhase::Scanning
    }
}

pub struct WorkerDriver<S: ScanTask, W: WorkerChannel> {
    slot: usize,
    pattern: String,
    root: PathBuf,
    parent: Pid,
    state: WorkerState,
    scan: S,
    channel: W,
    completions: u64,
}

impl<S: ScanTask, W: WorkerChannel> WorkerDriver<S, W> {
    pub fn new(slot: usize, pattern: &str, root: PathBuf, parent: Pid, scan: S, channel: W) -> Self {
        Self {
            slot,
            pattern: pattern.to_string(),
            root,
            parent,
            state: WorkerState::default(),
            scan,
            channel,
            completions: 0,
        }
    }

    pub fn phase(&self) -> WorkerPhase {
        self.state.phase
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn completions(&self) -> u64 {
        self.completions
    }

    pub fn channel(&self) -> &W {
        &self.channel
    }

    /// Runs until something fatal happens. Terminate never reaches here, it
    /// kills the process with the default disposition.
    pub fn run(&mut self) -> Result<(), WorkerError> {
        loop {
            self.step()?;
        }
    }

    pub fn step(&mut self) -> Result<(), WorkerError> {
        match self.state.phase {
            WorkerPhase::Idle => {
                debug!("worker {}: went to sleep", self.slot);
                let events = self.channel.wait()?;
                self.state.apply_all(&events, self.parent);
            }
            WorkerPhase::Resuming => {
                info!("worker {}: woke up, searching for: {}", self.slot, self.pattern);
                self.state.phase = WorkerPhase::Scanning;
            }
            WorkerPhase::Scanning => self.scan_once()?,
            WorkerPhase::Suspending => self.finish_round(),
        }

        Ok(())
    }

    fn scan_once(&mut self) -> Result<(), WorkerError> {
        self.channel.deliver(true)?;
        let outcome = {
            let mut probe = PhaseProbe {
                state: &mut self.state,
                channel: &mut self.channel,
                parent: self.parent,
            };
            self.scan.run(&self.pattern, &self.root, &mut probe)
        };
        self.channel.deliver(false)?;

        // Anything that raced the end of the walk still counts as mid-scan.
        let late = self.channel.poll()?;
        self.state.apply_all(&late, self.parent);

        self.after_scan(outcome)
    }

    fn after_scan(&mut self, outcome: ScanOutcome) -> Result<(), WorkerError> {
        match self.state.phase {
            WorkerPhase::Scanning => {
                debug!(
                    "worker {}: search done, {} entries visited, {} matches",
                    self.slot, outcome.visited, outcome.matches
                );
                self.state.phase = WorkerPhase::Suspending;
            }
            WorkerPhase::Resuming => {
                info!("worker {}: GOT resume during search, restarting it", self.slot);
                self.state.phase = WorkerPhase::Scanning;
            }
            WorkerPhase::Suspending => {
                trace!("worker {}: search suspended after {} entries", self.slot, outcome.visited);
            }
            phase => return Err(WorkerError::InvariantViolation(phase)),
        }
        Ok(())
    }

    fn finish_round(&mut self) {
        if self.state.external_suspend {
            info!("worker {}: GOT suspend", self.slot);
            self.state.external_suspend = false;
        } else {
            match self.channel.notify_parent(Notification::Completion) {
                Ok(()) => self.completions += 1,
                Err(e) => warn!("worker {}: failed to report completion: {}", self.slot, e),
            }
        }
        self.state.phase = WorkerPhase::Idle;
    }
}
