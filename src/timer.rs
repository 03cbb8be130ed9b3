// src/timer.rs
use std::time::Duration;

use tokio::time::Instant;

/// The auto-advance timer: at most one pending deadline.
///
/// Arming always replaces the previous deadline, so two overlapping timers
/// cannot exist. The runtime sleeps until [`Deadline::at`] and hands the wake
/// time back to the engine, which re-checks [`Deadline::is_due`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn arm(&mut self, after: Duration) {
        self.at = Some(Instant::now() + after);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn at(&self) -> Option<Instant> {
        self.at
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.at.is_some_and(|at| now >= at)
    }
}

/// Sleep until `at`, or forever when nothing is armed.
pub async fn wait_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
