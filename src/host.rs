//! Browser-host capabilities driven by the controllers

use tracing::{info, warn};

use crate::gateway::ReportLocation;

/// Side effects on the hosting document
pub trait Host {
    /// Navigate the browsing context to `location`
    fn navigate(&self, location: &ReportLocation);

    /// Show a transient, user-visible alert
    fn alert(&self, message: &str);
}

/// Host for headless runs: navigation and alerts go to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleHost;

impl Host for ConsoleHost {
    fn navigate(&self, location: &ReportLocation) {
        info!("🧭 Navigate to {}", location);
    }

    fn alert(&self, message: &str) {
        warn!("🔔 {}", message);
    }
}
