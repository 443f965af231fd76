// Tue Jan 20 2026 - Alex

use super::SupervisorError;
use crate::signal::{self, CriticalSection, Event, Notification, SignalSet, INBOX};
use log::warn;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wakeup {
    Events(Vec<Event>),
    TimedOut,
}

/// Where the overlord's inbound notifications come from.
pub trait EventSource {
    /// Everything that arrived since the last call, without blocking.
    fn drain(&mut self) -> Result<Vec<Event>, SupervisorError>;

    /// Blocks until a notification arrives or `timeout` elapses.
    fn wait(&mut self, timeout: Option<Duration>) -> Result<Wakeup, SupervisorError>;

    /// Stops reporting worker deaths for the rest of the process lifetime.
    fn suppress_deaths(&mut self);
}

/// Signal-backed event source.
///
/// The overlord runs with the whole notification set blocked; handlers only
/// get to run inside [`EventSource::wait`], which unblocks and sleeps in one
/// step.
#[derive(Debug)]
pub struct SignalEvents {
    blocked: SignalSet,
    delivered: SignalSet,
    deaths_suppressed: bool,
}

impl SignalEvents {
    pub fn new() -> Self {
        Self {
            blocked: SignalSet::supervisor(),
            delivered: SignalSet::supervisor(),
            deaths_suppressed: false,
        }
    }
}

impl Default for SignalEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for SignalEvents {
    fn drain(&mut self) -> Result<Vec<Event>, SupervisorError> {
        let _section = CriticalSection::enter(&self.blocked)?;

        let dropped = INBOX.take_dropped();
        if dropped > 0 {
            warn!("overlord: notification inbox overflowed, {} events lost", dropped);
        }

        let mut events = INBOX.drain();
        if self.deaths_suppressed {
            events.retain(|event| event.kind != Notification::Death);
        }
        Ok(events)
    }

    fn wait(&mut self, timeout: Option<Duration>) -> Result<Wakeup, SupervisorError> {
        if !INBOX.is_empty() {
            return Ok(Wakeup::Events(self.drain()?));
        }

        match timeout {
            None => {
                signal::wait_for_signal(&self.delivered)?;
                Ok(Wakeup::Events(self.drain()?))
            }
            Some(timeout) => {
                if signal::wait_for_signal_timeout(&self.delivered, timeout)? {
                    Ok(Wakeup::Events(self.drain()?))
                } else {
                    Ok(Wakeup::TimedOut)
                }
            }
        }
    }

    fn suppress_deaths(&mut self) {
        self.deaths_suppressed = true;
        self.delivered = self.delivered.without(Notification::Death.signal());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::REAL_SIGNALS;
    use nix::unistd::getpid;

    #[test]
    fn test_suppressed_deaths_stay_blocked() {
        let _guard = REAL_SIGNALS.lock();
        signal::install_overlord_handlers().unwrap();
        let _section = CriticalSection::enter(&SignalSet::supervisor()).unwrap();
        INBOX.reset();

        let mut events = SignalEvents::new();
        events.suppress_deaths();

        unsafe {
            libc::raise(libc::SIGCHLD);
        }
        assert_eq!(
            events.wait(Some(Duration::from_millis(100))).unwrap(),
            Wakeup::TimedOut
        );

        unsafe {
            libc::raise(libc::SIGUSR2);
        }
        assert_eq!(
            events.wait(Some(Duration::from_secs(5))).unwrap(),
            Wakeup::Events(vec![Event::new(Notification::Suspend, getpid())])
        );
    }

    #[test]
    fn test_drain_filters_deaths_once_suppressed() {
        let _guard = REAL_SIGNALS.lock();
        INBOX.reset();
        INBOX.post(Event::new(Notification::Death, getpid()));
        INBOX.post(Event::new(Notification::Terminate, getpid()));

        let mut events = SignalEvents::new();
        events.suppress_deaths();

        assert_eq!(
            events.drain().unwrap(),
            vec![Event::new(Notification::Terminate, getpid())]
        );
        assert!(INBOX.is_empty());
    }
}
