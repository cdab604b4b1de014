//! Ctrl+C state shared between the signal handler and the REPL.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A resettable interrupt flag that can also be awaited.
///
/// The flag holds the state; [`Notify::notify_waiters`] only wakes tasks that
/// are already waiting and never stores a permit, so a signal that arrives
/// while nothing is waiting is gone once [`Interrupt::clear`] runs.
#[derive(Debug, Default)]
pub struct Interrupt {
    flag: AtomicBool,
    notify: Notify,
}

impl Interrupt {
    /// Creates a cleared interrupt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an interrupt and wakes every waiter.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Forgets any interrupt recorded so far.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// True if an interrupt was recorded since the last clear.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Completes once an interrupt has been recorded.
    pub async fn triggered(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}
