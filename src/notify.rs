// src/notify.rs
use std::time::Duration;

use crate::feed::Failure;

/// Transient user-facing notification. The renderer decides how to show it
/// and dismisses it after [`Notice::ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Loading,
    Offline,
    Reconnected,
    NewItems(usize),
    FetchFailed(Failure),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Loading => "Loading news...".to_string(),
            Notice::Offline => "No connection to the server - showing cached news".to_string(),
            Notice::Reconnected => "Connection to the server restored".to_string(),
            Notice::NewItems(n) => format!("{n} new items!"),
            Notice::FetchFailed(f) => failure_message(*f).to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Offline | Notice::FetchFailed(_))
    }

    /// Errors linger a little longer than informational notices.
    pub fn ttl(&self) -> Duration {
        if matches!(self, Notice::FetchFailed(_)) {
            Duration::from_secs(4)
        } else {
            Duration::from_secs(3)
        }
    }
}

pub fn failure_message(f: Failure) -> &'static str {
    match f {
        Failure::Timeout => "Loading the news took too long. Please try again later.",
        Failure::Generic => "Could not load the news. Please refresh.",
        Failure::Empty => "No news items found",
    }
}
