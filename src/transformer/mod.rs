//! Event transformers.
//!
//! A transformer decides when, and in what order, the queued events of one
//! registered event type reach their handler:
//!
//! - [`Transformer::Concurrent`]: every event starts a handler immediately;
//!   invocations may overlap (default)
//! - [`Transformer::Sequential`]: FIFO, invocation n+1 starts after n settled
//! - [`Transformer::Debounce`]: last event wins after a quiet period
//!
//! Every invocation runs in its own task. A handler that fails or panics is
//! logged and never stops the worker.

mod debounce;
mod sequential;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::{JoinError, JoinSet};

use crate::cancel::CancelHandle;

/// Boxed future of one handler invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// Type-erased handler bound to one event type.
pub type EventHandler<E> = Arc<dyn Fn(E) -> HandlerFuture + Send + Sync>;

pub const DEBOUNCE_FAST: Duration = Duration::from_millis(200);
pub const DEBOUNCE_STANDARD: Duration = Duration::from_millis(400);
pub const DEBOUNCE_SLOW: Duration = Duration::from_millis(800);
pub const DEBOUNCE_VERY_SLOW: Duration = Duration::from_millis(1500);

/// Delivery policy for one registered event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transformer {
    /// No ordering or exclusivity; handlers must be reentrant-safe.
    #[default]
    Concurrent,
    /// FIFO, one invocation at a time, nothing dropped.
    Sequential,
    /// Fire the latest event once no newer one arrived for the duration.
    Debounce(Duration),
}

impl Transformer {
    pub fn sequential() -> Self {
        Transformer::Sequential
    }

    pub fn debounce(duration: Duration) -> Self {
        Transformer::Debounce(duration)
    }

    pub fn debounce_fast() -> Self {
        Self::debounce(DEBOUNCE_FAST)
    }

    pub fn debounce_standard() -> Self {
        Self::debounce(DEBOUNCE_STANDARD)
    }

    pub fn debounce_slow() -> Self {
        Self::debounce(DEBOUNCE_SLOW)
    }

    pub fn debounce_very_slow() -> Self {
        Self::debounce(DEBOUNCE_VERY_SLOW)
    }

    /// Drives `handler` with the events of `kind` until the source closes or
    /// `cancel` fires, then waits for every started invocation to settle.
    pub async fn run<E: Send + 'static>(
        self,
        kind: &'static str,
        events: UnboundedReceiver<E>,
        handler: EventHandler<E>,
        cancel: CancelHandle,
    ) {
        tracing::trace!(kind, transformer = ?self, "Dispatch worker started");
        match self {
            Transformer::Concurrent => run_concurrent(kind, events, handler, cancel).await,
            Transformer::Sequential => sequential::run(kind, events, handler, cancel).await,
            Transformer::Debounce(duration) => {
                debounce::run(kind, duration, events, handler, cancel).await
            }
        }
        tracing::trace!(kind, "Dispatch worker stopped");
    }
}

async fn run_concurrent<E: Send + 'static>(
    kind: &'static str,
    mut events: UnboundedReceiver<E>,
    handler: EventHandler<E>,
    cancel: CancelHandle,
) {
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(kind, "Concurrent worker cancelled");
                break;
            }
            Some(result) = in_flight.join_next(), if !in_flight.is_empty() => {
                report(kind, result);
            }
            event = events.recv() => match event {
                Some(event) => {
                    in_flight.spawn(handler(event));
                }
                None => break,
            },
        }
    }

    drain(kind, &mut in_flight).await;
}

/// Waits for every started invocation; started handlers always complete.
async fn drain(kind: &'static str, in_flight: &mut JoinSet<anyhow::Result<()>>) {
    while let Some(result) = in_flight.join_next().await {
        report(kind, result);
    }
}

fn report(kind: &'static str, result: Result<anyhow::Result<()>, JoinError>) {
    match result {
        Ok(Ok(())) => tracing::trace!(kind, "Handler completed"),
        Ok(Err(err)) => tracing::warn!(kind, error = %err, "Handler failed"),
        Err(err) if err.is_panic() => tracing::error!(kind, "Handler panicked"),
        Err(err) => tracing::debug!(kind, error = %err, "Handler task aborted"),
    }
}
