// Mon Jan 19 2026 - Alex

use super::{Notification, SignalError};
use libc::c_int;
use std::fmt;
use std::io;
use std::mem::MaybeUninit;
use std::ptr;

#[derive(Clone, Copy)]
pub struct SignalSet {
    raw: libc::sigset_t,
}

impl SignalSet {
    pub fn empty() -> Self {
        let mut raw = MaybeUninit::<libc::sigset_t>::uninit();
        // sigemptyset cannot fail on a valid pointer.
        unsafe {
            libc::sigemptyset(raw.as_mut_ptr());
            Self { raw: raw.assume_init() }
        }
    }

    pub fn of(notifications: &[Notification]) -> Self {
        notifications
            .iter()
            .fold(Self::empty(), |set, n| set.with(n.signal()))
    }

    /// Everything the overlord handles.
    pub fn supervisor() -> Self {
        Self::of(&Notification::ALL)
    }

    /// The notifications a worker reacts to.
    pub fn worker() -> Self {
        Self::of(&[Notification::Resume, Notification::Suspend])
    }

    /// The calling thread's current mask.
    pub fn current() -> Result<Self, SignalError> {
        let mut current = Self::empty();
        let rc = unsafe { libc::sigprocmask(libc::SIG_BLOCK, ptr::null(), &mut current.raw) };
        if rc != 0 {
            return Err(SignalError::Mask(io::Error::last_os_error()));
        }
        Ok(current)
    }

    pub fn with(mut self, signal: c_int) -> Self {
        unsafe {
            libc::sigaddset(&mut self.raw, signal);
        }
        self
    }

    pub fn without(mut self, signal: c_int) -> Self {
        unsafe {
            libc::sigdelset(&mut self.raw, signal);
        }
        self
    }

    /// Removes every notification signal contained in `other`.
    pub fn difference(self, other: &SignalSet) -> Self {
        Notification::ALL
            .iter()
            .map(|n| n.signal())
            .filter(|&signal| other.contains(signal))
            .fold(self, |set, signal| set.without(signal))
    }

    pub fn contains(&self, signal: c_int) -> bool {
        unsafe { libc::sigismember(&self.raw, signal) == 1 }
    }

    pub fn as_raw(&self) -> &libc::sigset_t {
        &self.raw
    }
}

impl fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<&str> = Notification::ALL
            .iter()
            .filter(|n| self.contains(n.signal()))
            .map(|n| n.name())
            .collect();
        f.debug_tuple("SignalSet").field(&members).finish()
    }
}

fn change_mask(how: c_int, set: &SignalSet) -> Result<SignalSet, SignalError> {
    let mut previous = SignalSet::empty();
    let rc = unsafe { libc::sigprocmask(how, set.as_raw(), &mut previous.raw) };
    if rc != 0 {
        return Err(SignalError::Mask(io::Error::last_os_error()));
    }
    Ok(previous)
}

/// Blocks `set`, returning the previous mask.
pub fn block(set: &SignalSet) -> Result<SignalSet, SignalError> {
    change_mask(libc::SIG_BLOCK, set)
}

pub fn unblock(set: &SignalSet) -> Result<SignalSet, SignalError> {
    change_mask(libc::SIG_UNBLOCK, set)
}

/// Replaces the whole mask with `set`.
pub fn set_mask(set: &SignalSet) -> Result<SignalSet, SignalError> {
    change_mask(libc::SIG_SETMASK, set)
}

/// Blocks a set of notifications for as long as the guard lives.
///
/// Handlers of the blocked notifications stay pending until the guard drops,
/// so the main loop can read-then-write process state without being preempted
/// by them.
#[derive(Debug)]
pub struct CriticalSection {
    previous: SignalSet,
}

impl CriticalSection {
    pub fn enter(set: &SignalSet) -> Result<Self, SignalError> {
        let previous = block(set)?;
        Ok(Self { previous })
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        unsafe {
            libc::sigprocmask(libc::SIG_SETMASK, self.previous.as_raw(), ptr::null_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supervisor_set_holds_every_notification() {
        let set = SignalSet::supervisor();
        for notification in Notification::ALL {
            assert!(set.contains(notification.signal()), "{} missing", notification);
        }
        assert!(!set.contains(libc::SIGINT));
    }

    #[test]
    fn test_worker_set_holds_resume_and_suspend_only() {
        let set = SignalSet::worker();
        assert!(set.contains(libc::SIGUSR1));
        assert!(set.contains(libc::SIGUSR2));
        assert!(!set.contains(libc::SIGTERM));
        assert!(!set.contains(libc::SIGCHLD));
        assert!(!set.contains(libc::SIGRTMIN()));
    }

    #[test]
    fn test_difference_removes_only_listed_notifications() {
        let set = SignalSet::supervisor()
            .with(libc::SIGINT)
            .difference(&SignalSet::worker());

        assert!(!set.contains(libc::SIGUSR1));
        assert!(!set.contains(libc::SIGUSR2));
        assert!(set.contains(libc::SIGTERM));
        assert!(set.contains(libc::SIGINT));
    }

    #[test]
    fn test_debug_lists_members() {
        let rendered = format!("{:?}", SignalSet::worker());
        assert!(rendered.contains("resume"));
        assert!(rendered.contains("suspend"));
        assert!(!rendered.contains("terminate"));
    }
}
