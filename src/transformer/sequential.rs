use tokio::sync::mpsc::UnboundedReceiver;

use super::{report, EventHandler};
use crate::cancel::CancelHandle;

/// One invocation at a time, in arrival order.
///
/// The next event is only taken off the queue once the previous handler
/// task has settled, whatever its outcome.
pub(super) async fn run<E: Send + 'static>(
    kind: &'static str,
    mut events: UnboundedReceiver<E>,
    handler: EventHandler<E>,
    cancel: CancelHandle,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(kind, "Sequential worker cancelled, queued events discarded");
                break;
            }
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        report(kind, tokio::spawn(handler(event)).await);
    }
}
