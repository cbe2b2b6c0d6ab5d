//! Connectivity gate adapters
//!
//! The platform path monitor lives outside this crate; it reports path
//! changes into a [`ReachabilityFlag`], which the executor polls before every
//! request.

use std::sync::atomic::{AtomicBool, Ordering};

use keyway_core::ConnectivityGate;
use tracing::debug;

/// Gate that never blocks a request. Useful for servers and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysReachable;

impl ConnectivityGate for AlwaysReachable {
    fn is_reachable(&self) -> bool {
        true
    }
}

/// Interface type of the current network path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathInterface {
    Wifi,
    Cellular,
    WiredEthernet,
    Other,
}

impl PathInterface {
    /// Wired ethernet counts as Wi-Fi: both are unmetered.
    fn is_unmetered(self) -> bool {
        matches!(self, Self::Wifi | Self::WiredEthernet)
    }
}

/// Last path status reported by a platform monitor.
///
/// Starts unreachable until the first update arrives.
#[derive(Debug, Default)]
pub struct ReachabilityFlag {
    reachable: AtomicBool,
    wifi: AtomicBool,
}

impl ReachabilityFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag with an initial status, before any monitor update.
    pub fn with_status(reachable: bool) -> Self {
        Self { reachable: AtomicBool::new(reachable), wifi: AtomicBool::new(false) }
    }

    /// Record a path update from the platform monitor.
    pub fn update(&self, reachable: bool, interface: PathInterface) {
        self.reachable.store(reachable, Ordering::Release);
        self.wifi.store(interface.is_unmetered(), Ordering::Release);
        debug!(reachable, ?interface, "Network path changed");
    }

    pub fn is_wifi(&self) -> bool {
        self.wifi.load(Ordering::Acquire)
    }
}

impl ConnectivityGate for ReachabilityFlag {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Acquire)
    }
}
