//! De-duplication of navigation intents.
//!
//! N concurrent failing requests each classify to the same full-screen
//! surface; only the first one within the window reaches the host.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::navigation::{NavigationIntent, NavigationPort, Surface};

/// Wraps a port and drops intents repeating a surface within `window`.
pub struct DedupNavigator<N> {
    inner: N,
    window: Duration,
    last_issued: Mutex<HashMap<Surface, Instant>>,
}

impl<N: NavigationPort> DedupNavigator<N> {
    pub fn new(inner: N, window: Duration) -> Self {
        Self {
            inner,
            window,
            last_issued: Mutex::new(HashMap::new()),
        }
    }

    /// Forgets every issued surface, e.g. once the host dismissed it.
    pub fn reset(&self) {
        self.last_issued.lock().clear();
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<N: NavigationPort> NavigationPort for DedupNavigator<N> {
    fn navigate(&self, intent: NavigationIntent) {
        let now = Instant::now();
        {
            let mut last_issued = self.last_issued.lock();
            if let Some(previous) = last_issued.get(&intent.surface) {
                if now.duration_since(*previous) < self.window {
                    tracing::debug!(
                        surface = ?intent.surface,
                        "Duplicate navigation intent dropped"
                    );
                    return;
                }
            }
            last_issued.insert(intent.surface, now);
        }

        tracing::info!(surface = ?intent.surface, "Navigation intent issued");
        self.inner.navigate(intent);
    }
}
