//! Connectivity edge detection
//!
//! The host environment reports raw online/offline levels and may
//! repeat the same level. The monitor collapses levels into edges so
//! that queue draining fires exactly once per offline-to-online change.

/// A connectivity state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

/// Tracks the current connectivity level and detects edges
#[derive(Debug)]
pub struct ConnectivityMonitor {
    online: bool,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        Self { online }
    }

    /// Current level
    pub fn online(&self) -> bool {
        self.online
    }

    /// Feed a raw level signal.
    ///
    /// Returns a transition only when the level actually changed;
    /// repeated signals at the same level return `None`.
    pub fn observe(&mut self, online: bool) -> Option<Transition> {
        if online == self.online {
            return None;
        }
        self.online = online;
        Some(if online {
            Transition::CameOnline
        } else {
            Transition::WentOffline
        })
    }
}
