//! The Bloc actor and its builder.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::context::{BlocContext, Emitter};
use super::event::Event;
use crate::cancel::CancelHandle;
use crate::classifier::ResponseClassifier;
use crate::state::{State, StateFactory};
use crate::transformer::{EventHandler, HandlerFuture, Transformer};

const DEFAULT_STATE_CAPACITY: usize = 64;

/// Errors surfaced by the event submission surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlocError {
    #[error("No handler registered for event '{kind}'")]
    UnhandledEvent { kind: &'static str },

    #[error("Handler for event '{kind}' registered more than once")]
    DuplicateHandler { kind: &'static str },

    #[error("Bloc is closed")]
    Closed,
}

type RawHandler<E, F> = Arc<dyn Fn(E, BlocContext<F>) -> HandlerFuture + Send + Sync>;

struct Registration<E, F: StateFactory> {
    kind: &'static str,
    transformer: Transformer,
    handler: RawHandler<E, F>,
}

/// Collects per-kind handlers before the Bloc starts.
pub struct BlocBuilder<E: Event, F: StateFactory> {
    name: String,
    classifier: Arc<ResponseClassifier<F>>,
    initial: State<F::View>,
    capacity: usize,
    registrations: Vec<Registration<E, F>>,
}

impl<E: Event, F: StateFactory> BlocBuilder<E, F> {
    pub fn new(name: impl Into<String>, classifier: ResponseClassifier<F>) -> Self {
        Self {
            name: name.into(),
            classifier: Arc::new(classifier),
            initial: State::default(),
            capacity: DEFAULT_STATE_CAPACITY,
            registrations: Vec::new(),
        }
    }

    /// State reported before anything was emitted (default: `Render(Initial)`).
    pub fn initial(mut self, state: impl Into<State<F::View>>) -> Self {
        self.initial = state.into();
        self
    }

    /// Buffer of the state broadcast channel. Slow subscribers lag past it.
    pub fn state_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Binds `handler` to events whose [`Event::kind`] is `kind`.
    pub fn on<H, Fut>(mut self, kind: &'static str, transformer: Transformer, handler: H) -> Self
    where
        H: Fn(E, BlocContext<F>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.registrations.push(Registration {
            kind,
            transformer,
            handler: Arc::new(move |event: E, ctx: BlocContext<F>| -> HandlerFuture {
                Box::pin(handler(event, ctx))
            }),
        });
        self
    }

    /// Starts one dispatch worker per registered kind.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<Bloc<E, F>, BlocError> {
        let mut seen = HashSet::new();
        for registration in &self.registrations {
            if !seen.insert(registration.kind) {
                return Err(BlocError::DuplicateHandler {
                    kind: registration.kind,
                });
            }
        }

        let id = Uuid::new_v4();
        let emitter = Emitter::new(self.name.clone(), self.initial, self.capacity);
        let context = BlocContext::new(emitter.clone(), Arc::clone(&self.classifier));
        let cancel = CancelHandle::new();

        let mut routes = HashMap::new();
        let mut workers = Vec::with_capacity(self.registrations.len());

        for Registration {
            kind,
            transformer,
            handler,
        } in self.registrations
        {
            let (sender, receiver) = mpsc::unbounded_channel();
            let ctx = context.clone();
            let bound: EventHandler<E> = Arc::new(move |event: E| handler(event, ctx.clone()));
            let span = tracing::debug_span!("bloc", name = %self.name, %id, kind);
            workers.push(tokio::spawn(
                transformer
                    .run(kind, receiver, bound, cancel.clone())
                    .instrument(span),
            ));
            routes.insert(kind, sender);
        }

        tracing::debug!(
            bloc = %self.name,
            %id,
            handlers = routes.len(),
            "Bloc started"
        );

        Ok(Bloc {
            id,
            name: self.name,
            routes: RwLock::new(Some(routes)),
            emitter,
            classifier: self.classifier,
            cancel,
            workers: tokio::sync::Mutex::new(workers),
            last_event: Mutex::new(None),
        })
    }
}

/// Event-driven state container.
///
/// Events are routed by kind to their registered transformer; handlers emit
/// states that every subscriber receives.
pub struct Bloc<E: Event, F: StateFactory> {
    id: Uuid,
    name: String,
    /// `None` once closed.
    routes: RwLock<Option<HashMap<&'static str, mpsc::UnboundedSender<E>>>>,
    emitter: Emitter<F::View>,
    classifier: Arc<ResponseClassifier<F>>,
    cancel: CancelHandle,
    /// Held across the drain so concurrent closers all wait for it.
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    last_event: Mutex<Option<E>>,
}

impl<E: Event, F: StateFactory> Bloc<E, F> {
    pub fn builder(name: impl Into<String>, classifier: ResponseClassifier<F>) -> BlocBuilder<E, F> {
        BlocBuilder::new(name, classifier)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueues `event` for its registered handler.
    pub fn submit(&self, event: E) -> Result<(), BlocError> {
        let kind = event.kind();
        let routes = self.routes.read();
        let routes = routes.as_ref().ok_or(BlocError::Closed)?;
        let sender = routes
            .get(kind)
            .ok_or(BlocError::UnhandledEvent { kind })?;

        {
            let mut last = self.last_event.lock();
            if last.as_ref() == Some(&event) {
                tracing::trace!(bloc = %self.name, kind, "Repeated event submitted");
            }
            *last = Some(event.clone());
        }

        tracing::debug!(bloc = %self.name, id = %self.id, kind, event = ?event, "Event submitted");
        sender.send(event).map_err(|_| BlocError::Closed)
    }

    pub fn state(&self) -> State<F::View> {
        self.emitter.state()
    }

    /// Receives every state emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<State<F::View>> {
        self.emitter.subscribe()
    }

    pub fn classifier(&self) -> &ResponseClassifier<F> {
        &self.classifier
    }

    pub fn is_closed(&self) -> bool {
        self.routes.read().is_none()
    }

    /// Stops accepting events and waits for every worker to drain.
    ///
    /// Queued events are still delivered and a pending debounced event is
    /// flushed.
    pub async fn close(&self) {
        if self.routes.write().take().is_some() {
            tracing::debug!(bloc = %self.name, id = %self.id, "Closing bloc");
        }

        // Handles are popped only once joined, so a closer dropped mid-drain
        // leaves the rest for the next one.
        let mut workers = self.workers.lock().await;
        while let Some(worker) = workers.last_mut() {
            if let Err(err) = worker.await {
                tracing::error!(bloc = %self.name, error = %err, "Dispatch worker failed");
            }
            workers.pop();
        }
    }

    /// Like [`Bloc::close`], but queued events and a pending debounced event
    /// are discarded. Handlers already running still complete.
    pub async fn cancel(&self) {
        if self.cancel.cancel() {
            tracing::debug!(bloc = %self.name, id = %self.id, "Cancelling bloc");
        }
        self.close().await;
    }
}
