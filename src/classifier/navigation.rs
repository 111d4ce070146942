//! Navigation intents emitted by the classifier and the ports that carry
//! them to the hosting application.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

/// Re-issues the request whose failure produced an intent.
pub type RetryAction = Arc<dyn Fn() + Send + Sync>;

/// Full-screen surfaces the classifier can ask the host to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Surface {
    /// Backend is down or under maintenance.
    Maintenance,
    /// Device has no connectivity.
    NoConnectivity,
}

/// Request to show a surface, optionally wired to a retry.
#[derive(Clone)]
pub struct NavigationIntent {
    pub surface: Surface,
    pub retry: Option<RetryAction>,
}

impl NavigationIntent {
    pub fn new(surface: Surface, retry: Option<RetryAction>) -> Self {
        Self { surface, retry }
    }

    /// Invokes the retry action if one was attached. Returns whether it ran.
    pub fn retry(&self) -> bool {
        match &self.retry {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for NavigationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationIntent")
            .field("surface", &self.surface)
            .field("retry", &self.retry.is_some())
            .finish()
    }
}

/// Output port interpreting navigation intents outside the engine.
pub trait NavigationPort: Send + Sync {
    fn navigate(&self, intent: NavigationIntent);
}

impl<T: NavigationPort + ?Sized> NavigationPort for Arc<T> {
    fn navigate(&self, intent: NavigationIntent) {
        (**self).navigate(intent)
    }
}

/// Port that discards every intent.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl NavigationPort for NoopNavigator {
    fn navigate(&self, intent: NavigationIntent) {
        tracing::trace!(surface = ?intent.surface, "Navigation intent discarded (no navigator)");
    }
}

/// Port forwarding intents to an adapter task over an unbounded channel.
#[derive(Clone)]
pub struct ChannelNavigator {
    sender: mpsc::UnboundedSender<NavigationIntent>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NavigationIntent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl NavigationPort for ChannelNavigator {
    fn navigate(&self, intent: NavigationIntent) {
        let surface = intent.surface;
        if self.sender.send(intent).is_err() {
            tracing::trace!(surface = ?surface, "Navigation intent dropped (receiver gone)");
        }
    }
}
