//! Page readiness tracking.
//!
//! A two-valued load-state flag driven by the engine's load-started and
//! load-finished signals. Every page-touching operation observes idle before
//! proceeding. Waiting polls on a short interval rather than consuming the
//! raw signals directly, to tolerate signal-delivery races.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::trace;

use crate::error::BridgeError;

/// Load-state tracker for a single page.
#[derive(Default)]
pub struct LoadTracker {
    loading: AtomicBool,
}

impl LoadTracker {
    /// Create a tracker in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal handler: a navigation started.
    pub fn load_started(&self) {
        trace!("Load started");
        self.loading.store(true, Ordering::SeqCst);
    }

    /// Signal handler: the navigation finished.
    pub fn load_finished(&self) {
        trace!("Load finished");
        self.loading.store(false, Ordering::SeqCst);
    }

    /// Whether a navigation is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Suspend the caller until the page is idle.
    ///
    /// Polls every `poll_interval`; a page still loading after `timeout`
    /// yields a [`BridgeError::Timeout`] instead of stalling forever.
    pub async fn await_idle(
        &self,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<(), BridgeError> {
        let start = std::time::Instant::now();
        while self.is_loading() {
            if start.elapsed() >= timeout {
                return Err(BridgeError::Timeout(format!(
                    "Page still loading after {}ms",
                    timeout.as_millis()
                )));
            }
            tokio::time::sleep(poll_interval).await;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
