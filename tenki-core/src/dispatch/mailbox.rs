//! Lock-free pending-message word shared with timer contexts

use portable_atomic::{AtomicU8, Ordering};
use tenki_protocol::Message;

/// Set while a refresh cycle is running
const BUSY: u8 = 1 << 7;

/// Pending messages as one flag bit each
///
/// Posting is a single atomic update and never blocks, so it is safe from
/// timer callbacks. Repeated posts of the same message coalesce.
#[derive(Debug)]
pub struct Mailbox {
    flags: AtomicU8,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            flags: AtomicU8::new(0),
        }
    }

    /// Post a message
    ///
    /// Returns `false` when the message was dropped: `Idle` carries no work
    /// and a refresh requested during a running cycle is discarded.
    pub fn post(&self, message: Message) -> bool {
        let flag = message.flag();
        if flag == 0 {
            return false;
        }
        self.flags
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if message == Message::RefreshRequested && current & BUSY != 0 {
                    None
                } else {
                    Some(current | flag)
                }
            })
            .is_ok()
    }

    /// Take every pending message, leaving the busy marker untouched
    pub fn take(&self) -> Pending {
        Pending(self.flags.fetch_and(BUSY, Ordering::AcqRel) & !BUSY)
    }

    /// Mark a refresh cycle as running
    pub fn begin_cycle(&self) {
        self.flags.fetch_or(BUSY, Ordering::AcqRel);
    }

    /// Mark the refresh cycle as finished
    pub fn end_cycle(&self) {
        self.flags.fetch_and(!BUSY, Ordering::AcqRel);
    }

    pub fn is_busy(&self) -> bool {
        self.flags.load(Ordering::Acquire) & BUSY != 0
    }
}

/// A snapshot of pending messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pending(u8);

impl Pending {
    pub fn contains(&self, message: Message) -> bool {
        let flag = message.flag();
        flag != 0 && self.0 & flag != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Pending messages in service order
    pub fn iter(self) -> impl Iterator<Item = Message> {
        Message::ACTIONABLE
            .into_iter()
            .filter(move |message| self.contains(*message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_and_take() {
        let mailbox = Mailbox::new();
        assert!(mailbox.take().is_empty());
        assert!(mailbox.post(Message::ClockTick));
        assert!(mailbox.post(Message::RefreshRequested));

        let pending = mailbox.take();
        assert_eq!(
            pending.iter().collect::<Vec<_>>(),
            [Message::RefreshRequested, Message::ClockTick]
        );
        assert!(mailbox.take().is_empty());
    }

    #[test]
    fn test_repeated_posts_coalesce() {
        let mailbox = Mailbox::new();
        for _ in 0..5 {
            mailbox.post(Message::RefreshRequested);
        }
        assert_eq!(mailbox.take().iter().count(), 1);
    }

    #[test]
    fn test_idle_is_not_posted() {
        let mailbox = Mailbox::new();
        assert!(!mailbox.post(Message::Idle));
        assert!(mailbox.take().is_empty());
    }

    #[test]
    fn test_refresh_dropped_while_busy() {
        let mailbox = Mailbox::new();
        mailbox.begin_cycle();
        assert!(mailbox.is_busy());
        assert!(!mailbox.post(Message::RefreshRequested));
        assert!(mailbox.post(Message::ClockTick));

        let pending = mailbox.take();
        assert!(pending.contains(Message::ClockTick));
        assert!(!pending.contains(Message::RefreshRequested));
        assert!(mailbox.is_busy());

        mailbox.end_cycle();
        assert!(mailbox.post(Message::RefreshRequested));
    }

    #[test]
    fn test_posts_from_threads() {
        let mailbox = std::sync::Arc::new(Mailbox::new());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let mailbox = mailbox.clone();
                std::thread::spawn(move || {
                    let message = if n % 2 == 0 {
                        Message::RefreshRequested
                    } else {
                        Message::ClockTick
                    };
                    for _ in 0..100 {
                        mailbox.post(message);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(mailbox.take().iter().count(), 2);
    }
}
