// Wed Jan 21 2026 - Alex

use super::control::ProcessControl;
use super::events::{EventSource, Wakeup};
use super::registry::{RecordedPhase, ShutdownReport, WorkerRegistry};
use super::SupervisorError;
use crate::signal::{Event, Notification};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlordPhase {
    Resuming,
    Scanning,
    Suspending,
    Idle,
    Terminating,
}

/// Round state machine of the supervising process.
///
/// Notifications only ever change `phase` or a registry field; the transition
/// work itself happens in [`Overlord::step`].
pub struct Overlord<C: ProcessControl, E: EventSource> {
    registry: WorkerRegistry,
    control: C,
    events: E,
    phase: OverlordPhase,
    interval: Duration,
    verbosity: u8,
    rounds: u64,
}

impl<C: ProcessControl, E: EventSource> Overlord<C, E> {
    pub fn new(registry: WorkerRegistry, control: C, events: E, interval: Duration) -> Self {
        Self {
            registry,
            control,
            events,
            phase: OverlordPhase::Resuming,
            interval,
            verbosity: 0,
            rounds: 0,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn phase(&self) -> OverlordPhase {
        self.phase
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Drives the state machine until a terminate notification has been
    /// handled. The registry is released when this returns.
    pub fn run(mut self) -> Result<ShutdownReport, SupervisorError> {
        loop {
            if let Some(report) = self.step()? {
                return Ok(report);
            }
        }
    }

    /// One pass of the main loop. Returns the shutdown report once the
    /// overlord has terminated.
    pub fn step(&mut self) -> Result<Option<ShutdownReport>, SupervisorError> {
        let events = self.events.drain()?;
        self.apply(events);

        match self.phase {
            OverlordPhase::Resuming => self.start_round(),
            OverlordPhase::Scanning => self.await_drain()?,
            OverlordPhase::Suspending => self.suspend_round(),
            OverlordPhase::Idle => self.sleep_between_rounds()?,
            OverlordPhase::Terminating => return Ok(Some(self.terminate())),
        }

        Ok(None)
    }

    fn apply(&mut self, events: Vec<Event>) {
        for event in events {
            self.apply_one(event);
        }
    }

    fn apply_one(&mut self, event: Event) {
        let terminating = self.phase == OverlordPhase::Terminating;

        match event.kind {
            Notification::Resume | Notification::Suspend | Notification::Terminate
                if self.registry.is_worker(event.sender) =>
            {
                debug!("overlord: ignoring {} sent by worker {}", event.kind, event.sender);
            }
            Notification::Resume if !terminating => {
                info!("overlord: GOT resume from {}", event.sender);
                self.phase = OverlordPhase::Resuming;
            }
            Notification::Suspend if !terminating => {
                info!("overlord: GOT suspend from {}", event.sender);
                self.phase = OverlordPhase::Suspending;
            }
            Notification::Terminate => {
                info!("overlord: GOT terminate from {}", event.sender);
                self.phase = OverlordPhase::Terminating;
                self.events.suppress_deaths();
            }
            Notification::Death if !terminating => match self.registry.mark_dead(event.sender) {
                Some(index) => {
                    debug!("overlord: worker {} (pid {}) died", index, event.sender);
                    self.registry.sweep_exited(&mut self.control);
                }
                None => debug!("overlord: death of unknown process {}", event.sender),
            },
            Notification::Completion => match self.registry.mark_idle(event.sender) {
                Some(index) => debug!("overlord: worker {} finished its round", index),
                None => debug!("overlord: completion from unknown process {}", event.sender),
            },
            _ => debug!("overlord: ignoring {} while terminating", event.kind),
        }
    }

    fn start_round(&mut self) {
        self.rounds += 1;
        info!("overlord: starting round {}", self.rounds);

        self.registry.broadcast(&mut self.control, Notification::Resume);
        self.registry.set_all_phase(RecordedPhase::Scanning);
        self.phase = OverlordPhase::Scanning;
    }

    fn await_drain(&mut self) -> Result<(), SupervisorError> {
        if self.verbosity > 2 {
            self.registry.log_states();
        }
        self.registry.resurrect_dead_slots(&mut self.control);
        if self.verbosity > 2 {
            self.registry.log_states();
        }

        let idle = self.registry.count_idle();
        if idle == self.registry.len() {
            debug!("overlord: all workers sleep");
            self.phase = OverlordPhase::Idle;
            return Ok(());
        }

        debug!("overlord: {} of {} workers sleep", idle, self.registry.len());
        if let Wakeup::Events(events) = self.events.wait(None)? {
            self.apply(events);
        }

        Ok(())
    }

    fn suspend_round(&mut self) {
        self.registry.set_all_phase(RecordedPhase::Idle);
        self.registry.broadcast(&mut self.control, Notification::Suspend);
        self.phase = OverlordPhase::Idle;
    }

    // Wakes for every notification but only cuts the interval short when one
    // of them changed the phase.
    fn sleep_between_rounds(&mut self) -> Result<(), SupervisorError> {
        self.registry.resurrect_dead_slots(&mut self.control);

        info!(
            "overlord: went to sleep for {} seconds; job done",
            self.interval.as_secs()
        );

        let deadline = Instant::now() + self.interval;
        while self.phase == OverlordPhase::Idle {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.events.wait(Some(remaining))? {
                Wakeup::TimedOut => break,
                Wakeup::Events(events) => self.apply(events),
            }
        }

        if self.phase == OverlordPhase::Terminating {
            return Ok(());
        }

        self.registry.resurrect_dead_slots(&mut self.control);
        if self.phase == OverlordPhase::Idle {
            self.phase = OverlordPhase::Resuming;
        }

        Ok(())
    }

    fn terminate(&mut self) -> ShutdownReport {
        let report = self.registry.shutdown(&mut self.control);
        if report.reaped != self.registry.len() {
            warn!(
                "overlord: reaped {} of {} workers",
                report.reaped,
                self.registry.len()
            );
        }
        info!("overlord: terminated after {} rounds", self.rounds);
        report
    }
}
