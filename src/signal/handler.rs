// Mon Jan 19 2026 - Alex

use super::inbox::{Event, INBOX};
use super::mask::SignalSet;
use super::{Notification, SignalError};
use libc::{c_int, c_void};
use nix::unistd::Pid;
use std::io;
use std::mem;
use std::ptr;
use std::time::Duration;

// Runs at an arbitrary instruction boundary: only atomics from here on.
extern "C" fn post_notification(signal: c_int, info: *mut libc::siginfo_t, _context: *mut c_void) {
    let Some(kind) = Notification::from_signal(signal) else {
        return;
    };

    let sender = if info.is_null() {
        0
    } else {
        unsafe { (*info).si_pid() }
    };

    INBOX.post(Event::new(kind, Pid::from_raw(sender)));
}

enum Disposition {
    Post,
    Default,
}

fn install(notification: Notification, disposition: Disposition, blocked: &SignalSet) -> Result<(), SignalError> {
    let mut action: libc::sigaction = unsafe { mem::zeroed() };

    match disposition {
        Disposition::Post => {
            action.sa_sigaction = post_notification
                as extern "C" fn(c_int, *mut libc::siginfo_t, *mut c_void)
                as libc::sighandler_t;
            action.sa_flags = libc::SA_SIGINFO;
            if notification == Notification::Death {
                action.sa_flags |= libc::SA_NOCLDSTOP;
            }
            action.sa_mask = *blocked.as_raw();
        }
        Disposition::Default => {
            action.sa_sigaction = libc::SIG_DFL;
        }
    }

    let rc = unsafe { libc::sigaction(notification.signal(), &action, ptr::null_mut()) };
    if rc == -1 {
        return Err(SignalError::Registration {
            notification,
            source: io::Error::last_os_error(),
        });
    }

    Ok(())
}

/// Registers the overlord's handlers for all five notifications.
///
/// Handlers block the whole notification set while running so they never
/// nest, which keeps the inbox single-producer.
pub fn install_overlord_handlers() -> Result<(), SignalError> {
    let blocked = SignalSet::supervisor();

    for notification in [
        Notification::Resume,
        Notification::Suspend,
        Notification::Terminate,
        Notification::Death,
        Notification::Completion,
    ] {
        install(notification, Disposition::Post, &blocked)?;
    }

    Ok(())
}

/// Registers a worker's handlers. Terminate kills a worker outright, and a
/// worker has no children of its own to watch.
pub fn install_worker_handlers() -> Result<(), SignalError> {
    let blocked = SignalSet::worker();

    install(Notification::Resume, Disposition::Post, &blocked)?;
    install(Notification::Suspend, Disposition::Post, &blocked)?;
    install(Notification::Terminate, Disposition::Default, &blocked)?;
    install(Notification::Death, Disposition::Default, &blocked)?;
    install(Notification::Completion, Disposition::Default, &blocked)?;

    Ok(())
}

/// Unblocks `set` and sleeps until a handler has run, atomically.
pub fn wait_for_signal(set: &SignalSet) -> Result<(), SignalError> {
    let mask = SignalSet::current()?.difference(set);

    // sigsuspend only ever returns -1/EINTR once a handler ran.
    unsafe {
        libc::sigsuspend(mask.as_raw());
    }

    Ok(())
}

/// Like [`wait_for_signal`] but gives up after `timeout`.
///
/// Returns `true` if a handler ran and `false` if the timeout elapsed.
pub fn wait_for_signal_timeout(set: &SignalSet, timeout: Duration) -> Result<bool, SignalError> {
    let mask = SignalSet::current()?.difference(set);
    let deadline = libc::timespec {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_nsec: timeout.subsec_nanos() as libc::c_long,
    };

    let rc = unsafe { libc::ppoll(ptr::null_mut(), 0, &deadline, mask.as_raw()) };
    match rc {
        0 => Ok(false),
        -1 => {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                Ok(true)
            } else {
                Err(SignalError::Wait(err))
            }
        }
        _ => Ok(true),
    }
}

pub fn send(pid: Pid, notification: Notification) -> Result<(), SignalError> {
    let rc = unsafe { libc::kill(pid.as_raw(), notification.signal()) };
    if rc == -1 {
        return Err(SignalError::Send {
            pid,
            notification,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{CriticalSection, REAL_SIGNALS};
    use nix::unistd::getpid;

    #[test]
    fn test_raised_signal_is_posted_to_inbox() {
        let _guard = REAL_SIGNALS.lock();
        install_overlord_handlers().unwrap();
        let _section = CriticalSection::enter(&SignalSet::supervisor()).unwrap();
        INBOX.reset();

        unsafe {
            libc::raise(libc::SIGUSR1);
        }
        assert!(INBOX.is_empty());

        let resume = SignalSet::of(&[Notification::Resume]);
        assert!(wait_for_signal_timeout(&resume, Duration::from_secs(5)).unwrap());
        assert_eq!(INBOX.drain(), vec![Event::new(Notification::Resume, getpid())]);

        assert!(!wait_for_signal_timeout(&resume, Duration::from_millis(100)).unwrap());
        assert!(INBOX.is_empty());
    }

    #[test]
    fn test_indefinite_wait_returns_after_handler_ran() {
        let _guard = REAL_SIGNALS.lock();
        install_overlord_handlers().unwrap();
        let _section = CriticalSection::enter(&SignalSet::supervisor()).unwrap();
        INBOX.reset();

        unsafe {
            libc::raise(libc::SIGUSR2);
        }
        wait_for_signal(&SignalSet::of(&[Notification::Suspend])).unwrap();

        let events = INBOX.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, Notification::Suspend);
        assert_eq!(events[0].sender, getpid());
    }
}
