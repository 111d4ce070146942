use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tokio::time::Instant;

use super::{drain, report, EventHandler};
use crate::cancel::CancelHandle;

/// Last-event-wins delivery.
///
/// Each event restarts the timer and replaces the pending one. When the
/// source closes, a pending event is flushed; on cancel it is discarded.
pub(super) async fn run<E: Send + 'static>(
    kind: &'static str,
    duration: Duration,
    mut events: UnboundedReceiver<E>,
    handler: EventHandler<E>,
    cancel: CancelHandle,
) {
    let mut pending: Option<E> = None;
    let mut in_flight = JoinSet::new();
    let timer = tokio::time::sleep(duration);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                if pending.take().is_some() {
                    tracing::debug!(kind, "Pending debounced event discarded on cancel");
                }
                break;
            }
            event = events.recv() => match event {
                Some(event) => {
                    if pending.replace(event).is_some() {
                        tracing::trace!(kind, "Debounced event superseded");
                    }
                    timer.as_mut().reset(Instant::now() + duration);
                }
                None => {
                    if let Some(event) = pending.take() {
                        tracing::trace!(kind, "Flushing pending debounced event on close");
                        in_flight.spawn(handler(event));
                    }
                    break;
                }
            },
            () = &mut timer, if pending.is_some() => {
                if let Some(event) = pending.take() {
                    in_flight.spawn(handler(event));
                }
            }
            Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                report(kind, result);
            }
        }
    }

    drain(kind, &mut in_flight).await;
}
