use std::future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Cancellable trailing-edge debounce timer.
///
/// A burst of [`Debouncer::trigger`] calls collapses into a single
/// completion of [`Debouncer::fire`], `window` after the last trigger.
/// Unarmed, `fire` never completes, which makes it safe to hold in a
/// `select!` branch.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer; the deadline moves to `window` from now.
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Complete at the trailing edge of the current burst, then disarm.
    /// Pending forever while unarmed.
    pub async fn fire(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending::<()>().await,
        }
    }
}
