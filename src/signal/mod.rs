// Mon Jan 19 2026 - Alex

//! Notification protocol between the overlord and its workers.
//!
//! Every cross-process message is a payload-free signal. Handlers never act on
//! a notification themselves: they post an [`Event`] into the process-local
//! [`INBOX`] and the main loop drains it inside a [`CriticalSection`].

pub mod error;
pub mod handler;
pub mod inbox;
pub mod mask;

pub use error::SignalError;
pub use handler::{
    install_overlord_handlers, install_worker_handlers, send, wait_for_signal,
    wait_for_signal_timeout,
};
pub use inbox::{Event, Inbox, INBOX, INBOX_CAPACITY};
pub use mask::{block, set_mask, unblock, CriticalSection, SignalSet};

use libc::c_int;
use std::fmt;

/// Tests that raise real signals share the global inbox and handler table.
#[cfg(test)]
pub(crate) static REAL_SIGNALS: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    /// Overlord (or an external process) asks a worker to enter Scanning.
    Resume,
    /// Overlord (or an external process) asks a worker to stop and go idle.
    Suspend,
    /// External request to shut the overlord down.
    Terminate,
    /// A worker process ended.
    Death,
    /// A worker finished its round without being interrupted.
    Completion,
}

impl Notification {
    pub const ALL: [Notification; 5] = [
        Notification::Resume,
        Notification::Suspend,
        Notification::Terminate,
        Notification::Death,
        Notification::Completion,
    ];

    pub fn signal(self) -> c_int {
        match self {
            Notification::Resume => libc::SIGUSR1,
            Notification::Suspend => libc::SIGUSR2,
            Notification::Terminate => libc::SIGTERM,
            Notification::Death => libc::SIGCHLD,
            Notification::Completion => libc::SIGRTMIN(),
        }
    }

    // Called from signal handlers: no allocation, no locks.
    pub fn from_signal(signal: c_int) -> Option<Self> {
        if signal == libc::SIGRTMIN() {
            return Some(Notification::Completion);
        }

        match signal {
            libc::SIGUSR1 => Some(Notification::Resume),
            libc::SIGUSR2 => Some(Notification::Suspend),
            libc::SIGTERM => Some(Notification::Terminate),
            libc::SIGCHLD => Some(Notification::Death),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Notification::Resume => "resume",
            Notification::Suspend => "suspend",
            Notification::Terminate => "terminate",
            Notification::Death => "death",
            Notification::Completion => "completion",
        }
    }

    /// Exit code used when registering the handler for this notification fails.
    pub fn registration_exit_code(self) -> i32 {
        match self {
            Notification::Resume => 120,
            Notification::Suspend => 121,
            Notification::Death => 122,
            Notification::Terminate => 123,
            Notification::Completion => 124,
        }
    }

    pub(crate) fn code(self) -> u32 {
        match self {
            Notification::Resume => 1,
            Notification::Suspend => 2,
            Notification::Terminate => 3,
            Notification::Death => 4,
            Notification::Completion => 5,
        }
    }

    pub(crate) fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Notification::Resume),
            2 => Some(Notification::Suspend),
            3 => Some(Notification::Terminate),
            4 => Some(Notification::Death),
            5 => Some(Notification::Completion),
            _ => None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
