// Tue Jan 20 2026 - Alex

use super::control::{ProcessControl, WorkerExit};
use super::events::{EventSource, Wakeup};
use super::SupervisorError;
use crate::signal::{Event, Notification};
use nix::unistd::Pid;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Records every process operation instead of performing it.
#[derive(Debug, Default)]
pub struct FakeControl {
    next_pid: i32,
    pub spawned: Vec<(usize, String)>,
    pub sent: Vec<(Pid, Notification)>,
    pub reaped: Vec<Pid>,
    pub exited: HashSet<Pid>,
    pub fail_spawns: usize,
}

impl FakeControl {
    pub fn new() -> Self {
        Self {
            next_pid: 100,
            ..Default::default()
        }
    }

    /// Marks `pid` as having exited so a non-blocking reap collects it.
    pub fn exit(&mut self, pid: Pid) {
        self.exited.insert(pid);
    }

    pub fn sent_to(&self, pid: Pid) -> Vec<Notification> {
        self.sent
            .iter()
            .filter(|(target, _)| *target == pid)
            .map(|(_, n)| *n)
            .collect()
    }

    pub fn count_sent(&self, notification: Notification) -> usize {
        self.sent.iter().filter(|(_, n)| *n == notification).count()
    }
}

impl ProcessControl for FakeControl {
    fn spawn_worker(&mut self, slot: usize, pattern: &str) -> Result<Pid, SupervisorError> {
        if self.fail_spawns > 0 {
            self.fail_spawns -= 1;
            return Err(SupervisorError::Spawn {
                slot,
                source: nix::Error::EAGAIN,
            });
        }
        let pid = Pid::from_raw(self.next_pid);
        self.next_pid += 1;
        self.spawned.push((slot, pattern.to_string()));
        Ok(pid)
    }

    fn notify(&mut self, pid: Pid, notification: Notification) -> Result<(), SupervisorError> {
        self.sent.push((pid, notification));
        Ok(())
    }

    fn try_reap(&mut self, pid: Pid) -> Result<Option<WorkerExit>, SupervisorError> {
        if self.exited.remove(&pid) {
            self.reaped.push(pid);
            Ok(Some(WorkerExit::Exited(0)))
        } else {
            Ok(None)
        }
    }

    fn reap(&mut self, pid: Pid) -> Result<WorkerExit, SupervisorError> {
        self.exited.remove(&pid);
        self.reaped.push(pid);
        Ok(WorkerExit::Signaled(libc::SIGTERM))
    }
}

/// Hands out scripted notifications.
///
/// `pending` is returned by the next drain; `script` feeds successive waits.
/// A wait with an empty script times out if it has a timeout and wakes with
/// nothing otherwise.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    pub pending: Vec<Event>,
    pub script: VecDeque<Wakeup>,
    pub waits: Vec<Option<Duration>>,
    pub deaths_suppressed: bool,
}

impl ScriptedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, kind: Notification, sender: Pid) {
        self.pending.push(Event::new(kind, sender));
    }

    pub fn push_wakeup(&mut self, events: Vec<Event>) {
        self.script.push_back(Wakeup::Events(events));
    }
}

impl EventSource for ScriptedEvents {
    fn drain(&mut self) -> Result<Vec<Event>, SupervisorError> {
        let mut events = std::mem::take(&mut self.pending);
        if self.deaths_suppressed {
            events.retain(|e| e.kind != Notification::Death);
        }
        Ok(events)
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<Wakeup, SupervisorError> {
        self.waits.push(timeout);
        match self.script.pop_front() {
            Some(Wakeup::Events(mut events)) => {
                if self.deaths_suppressed {
                    events.retain(|e| e.kind != Notification::Death);
                }
                Ok(Wakeup::Events(events))
            }
            Some(Wakeup::TimedOut) => Ok(Wakeup::TimedOut),
            None if timeout.is_some() => Ok(Wakeup::TimedOut),
            None => Ok(Wakeup::Events(Vec::new())),
        }
    }

    fn suppress_deaths(&mut self) {
        self.deaths_suppressed = true;
    }
}
