// Mon Jan 19 2026 - Alex

use super::Notification;
use nix::unistd::Pid;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Sized so that every worker at the configured maximum can have a death and a
/// completion pending alongside external notifications.
pub const INBOX_CAPACITY: usize = 4096;

/// The process-wide inbox the signal handlers post into.
pub static INBOX: Inbox = Inbox::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: Notification,
    pub sender: Pid,
}

impl Event {
    pub fn new(kind: Notification, sender: Pid) -> Self {
        Self { kind, sender }
    }

    fn pack(self) -> u64 {
        (u64::from(self.kind.code()) << 32) | u64::from(self.sender.as_raw() as u32)
    }

    fn unpack(word: u64) -> Option<Self> {
        let kind = Notification::from_code((word >> 32) as u32)?;
        let sender = Pid::from_raw(word as u32 as i32);
        Some(Self { kind, sender })
    }
}

/// Single-producer single-consumer ring of packed events.
///
/// The producer is the signal handler, the consumer the main loop of the same
/// process. `post` only touches atomics so it can run at any instruction
/// boundary, including in the middle of `drain`.
pub struct Inbox {
    slots: [AtomicU64; INBOX_CAPACITY],
    head: AtomicUsize,
    tail: AtomicUsize,
    dropped: AtomicUsize,
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU64::new(0) }; INBOX_CAPACITY],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Returns false when the ring is full; the event is counted as dropped.
    pub fn post(&self, event: Event) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head.wrapping_sub(tail) >= INBOX_CAPACITY {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        self.slots[head % INBOX_CAPACITY].store(event.pack(), Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    pub fn drain(&self) -> Vec<Event> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        let mut events = Vec::with_capacity(head.wrapping_sub(tail));
        let mut cursor = tail;
        while cursor != head {
            let word = self.slots[cursor % INBOX_CAPACITY].load(Ordering::Relaxed);
            if let Some(event) = Event::unpack(word) {
                events.push(event);
            }
            cursor = cursor.wrapping_add(1);
        }

        self.tail.store(head, Ordering::Release);
        events
    }

    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn take_dropped(&self) -> usize {
        self.dropped.swap(0, Ordering::Relaxed)
    }

    /// Discards pending events. A freshly forked worker calls this to forget
    /// whatever the overlord had queued when it was cloned.
    pub fn reset(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
        self.dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}
