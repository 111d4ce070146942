//! Base trait for events (user intents and system signals).

use std::fmt::Debug;

/// An immutable, structurally comparable message describing an intent.
///
/// `kind` names the registered handler the event is routed to. Equality is
/// only used for logging; equal events are never de-duplicated.
pub trait Event: Clone + PartialEq + Debug + Send + Sync + 'static {
    fn kind(&self) -> &'static str;
}
