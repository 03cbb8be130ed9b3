// src/feed/connectivity.rs

/// Edge emitted when the reachability of the feed server flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityChange {
    WentOffline,
    Reconnected,
}

/// Online/offline flag derived from the latest probe or foreground fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct Connectivity {
    offline: bool,
}

impl Connectivity {
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Record an outcome; returns the transition if the state changed.
    pub fn record(&mut self, reachable: bool) -> Option<ConnectivityChange> {
        let was_offline = self.offline;
        self.offline = !reachable;
        match (was_offline, self.offline) {
            (false, true) => Some(ConnectivityChange::WentOffline),
            (true, false) => Some(ConnectivityChange::Reconnected),
            _ => None,
        }
    }
}
