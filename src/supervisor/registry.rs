// Tue Jan 20 2026 - Alex

use super::control::{ProcessControl, WorkerExit};
use crate::signal::Notification;
use log::{debug, info, warn};
use nix::unistd::Pid;
use std::fmt;

/// The overlord's belief about what a worker is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedPhase {
    Scanning,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
}

#[derive(Debug, Clone)]
pub struct WorkerDescriptor {
    pub process: Pid,
    pub recorded_phase: RecordedPhase,
    pub liveness: Liveness,
    /// Exit status already collected; `process` no longer names a process.
    pub reaped: bool,
    pub last_exit: Option<WorkerExit>,
    pub resurrections: u32,
}

impl WorkerDescriptor {
    fn alive(process: Pid) -> Self {
        Self {
            process,
            recorded_phase: RecordedPhase::Idle,
            liveness: Liveness::Alive,
            reaped: false,
            last_exit: None,
            resurrections: 0,
        }
    }

    fn never_started() -> Self {
        Self {
            process: Pid::from_raw(0),
            recorded_phase: RecordedPhase::Idle,
            liveness: Liveness::Dead,
            reaped: true,
            last_exit: None,
            resurrections: 0,
        }
    }

    fn is_signalable(&self) -> bool {
        !self.reaped
    }
}

impl fmt::Display for WorkerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pid {} -> {:?}; {:?}",
            self.process, self.recorded_phase, self.liveness
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    pub signalled: usize,
    pub reaped: usize,
}

/// Fixed-size table of worker slots. Slot `i` is bound to `patterns[i]` for
/// the lifetime of the supervisor; only the process behind it changes.
#[derive(Debug)]
pub struct WorkerRegistry {
    patterns: Vec<String>,
    slots: Vec<WorkerDescriptor>,
}

impl WorkerRegistry {
    /// Spawns one worker per pattern. A slot whose spawn fails starts out dead
    /// and is retried by the next resurrection pass.
    pub fn spawn_all<C: ProcessControl>(patterns: Vec<String>, control: &mut C) -> Self {
        let mut slots = Vec::with_capacity(patterns.len());

        for (index, pattern) in patterns.iter().enumerate() {
            match control.spawn_worker(index, pattern) {
                Ok(pid) => slots.push(WorkerDescriptor::alive(pid)),
                Err(e) => {
                    warn!("overlord: {}", e);
                    slots.push(WorkerDescriptor::never_started());
                }
            }
        }

        Self { patterns, slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[WorkerDescriptor] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&WorkerDescriptor> {
        self.slots.get(index)
    }

    pub fn pattern(&self, index: usize) -> Option<&str> {
        self.patterns.get(index).map(String::as_str)
    }

    /// Slot currently backed by `pid`. Stale handles of reaped processes never
    /// match, since the pid may already belong to somebody else.
    pub fn find_slot(&self, pid: Pid) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_signalable() && slot.process == pid)
    }

    pub fn is_worker(&self, pid: Pid) -> bool {
        self.find_slot(pid).is_some()
    }

    pub fn count_idle(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.recorded_phase == RecordedPhase::Idle)
            .count()
    }

    pub fn set_all_phase(&mut self, phase: RecordedPhase) {
        for slot in &mut self.slots {
            slot.recorded_phase = phase;
        }
    }

    /// Sends `notification` to every slot in order and returns how many sends
    /// went through.
    pub fn broadcast<C: ProcessControl>(&self, control: &mut C, notification: Notification) -> usize {
        let mut sent = 0;

        for (index, slot) in self.slots.iter().enumerate() {
            if !slot.is_signalable() {
                continue;
            }
            debug!("signal: {} -> {} (slot {})", notification, slot.process, index);
            match control.notify(slot.process, notification) {
                Ok(()) => sent += 1,
                Err(e) => debug!("overlord: {}", e),
            }
        }

        sent
    }

    /// Completion from `pid`: that worker is idle. Unknown senders are ignored.
    pub fn mark_idle(&mut self, pid: Pid) -> Option<usize> {
        let index = self.find_slot(pid)?;
        self.slots[index].recorded_phase = RecordedPhase::Idle;
        Some(index)
    }

    /// Death of `pid`. Leaves the recorded phase alone so a worker that died
    /// mid-scan still counts as busy.
    pub fn mark_dead(&mut self, pid: Pid) -> Option<usize> {
        let index = self.find_slot(pid)?;
        self.slots[index].liveness = Liveness::Dead;
        Some(index)
    }

    /// Death notifications coalesce in the kernel, so after one arrives every
    /// other live slot is checked for an exit that went unreported.
    pub fn sweep_exited<C: ProcessControl>(&mut self, control: &mut C) -> usize {
        let mut found = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.liveness != Liveness::Alive {
                continue;
            }
            match control.try_reap(slot.process) {
                Ok(Some(exit)) => {
                    debug!("overlord: worker {} (pid {}) {}", index, slot.process, exit);
                    slot.liveness = Liveness::Dead;
                    slot.reaped = true;
                    slot.last_exit = Some(exit);
                    found += 1;
                }
                Ok(None) => {}
                Err(e) => debug!("overlord: {}", e),
            }
        }

        found
    }

    /// Replaces every dead worker with a fresh process in the same slot. A
    /// worker that died while its slot was scanning is resumed right away.
    ///
    /// Slots whose spawn fails stay dead until the next call. Returns the
    /// number of workers brought back.
    pub fn resurrect_dead_slots<C: ProcessControl>(&mut self, control: &mut C) -> usize {
        let mut resurrected = 0;

        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            if slot.liveness != Liveness::Dead {
                continue;
            }

            debug!("overlord: worker {} (pid {}) is dead", index, slot.process);

            if !slot.reaped {
                match control.try_reap(slot.process) {
                    Ok(Some(exit)) => {
                        debug!("overlord: collected worker {}: {}", slot.process, exit);
                        slot.reaped = true;
                        slot.last_exit = Some(exit);
                    }
                    Ok(None) => {
                        warn!(
                            "overlord: worker {} (pid {}) reported dead but still running",
                            index, slot.process
                        );
                        slot.liveness = Liveness::Alive;
                        continue;
                    }
                    Err(e) => {
                        debug!("overlord: {}", e);
                        slot.reaped = true;
                    }
                }
            }

            let pattern = &self.patterns[index];
            let pid = match control.spawn_worker(index, pattern) {
                Ok(pid) => pid,
                Err(e) => {
                    warn!("overlord: {}; retrying next cycle", e);
                    continue;
                }
            };

            slot.process = pid;
            slot.liveness = Liveness::Alive;
            slot.reaped = false;
            slot.resurrections += 1;
            resurrected += 1;

            info!(
                "overlord: resurrected worker {} as pid {} with status {:?}",
                index, pid, slot.recorded_phase
            );

            if slot.recorded_phase == RecordedPhase::Scanning {
                if let Err(e) = control.notify(pid, Notification::Resume) {
                    warn!("overlord: {}", e);
                }
            }
        }

        resurrected
    }

    /// Tells every worker to terminate and blocks until each one is reaped.
    pub fn shutdown<C: ProcessControl>(&mut self, control: &mut C) -> ShutdownReport {
        let signalled = self.broadcast(control, Notification::Terminate);
        let mut reaped = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.reaped {
                reaped += 1;
                continue;
            }
            match control.reap(slot.process) {
                Ok(exit) => {
                    debug!("overlord: worker {} (pid {}) {}", index, slot.process, exit);
                    slot.reaped = true;
                    slot.liveness = Liveness::Dead;
                    slot.last_exit = Some(exit);
                    reaped += 1;
                }
                Err(e) => warn!("overlord: {}", e),
            }
        }

        ShutdownReport { signalled, reaped }
    }

    pub fn log_states(&self) {
        for slot in &self.slots {
            debug!("status: {}", slot);
        }
    }
}
