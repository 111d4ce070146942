//! What a handler sees: state output plus the engine's classifier.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::classifier::{ClassifyOptions, ResponseClassifier};
use crate::response::Response;
use crate::state::{ErrorType, State, StateFactory};

/// Publishes states to subscribers and remembers the latest one.
pub struct Emitter<V> {
    inner: Arc<EmitterInner<V>>,
}

struct EmitterInner<V> {
    bloc: String,
    current: RwLock<State<V>>,
    sender: broadcast::Sender<State<V>>,
}

impl<V> Clone for Emitter<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Emitter<V>
where
    V: Clone + Debug + Send + Sync + 'static,
{
    pub(crate) fn new(bloc: String, initial: State<V>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(EmitterInner {
                bloc,
                current: RwLock::new(initial),
                sender,
            }),
        }
    }

    /// Replaces the current state and broadcasts it.
    pub fn emit(&self, state: impl Into<State<V>>) {
        let state = state.into();
        tracing::debug!(bloc = %self.inner.bloc, state = ?state, "Emitting state");

        // Hold the write lock while sending so `current` always matches the
        // last broadcast state.
        let mut current = self.inner.current.write();
        *current = state.clone();
        if self.inner.sender.send(state).is_err() {
            tracing::trace!(bloc = %self.inner.bloc, "State emitted with no subscribers");
        }
    }

    pub fn state(&self) -> State<V> {
        self.inner.current.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<State<V>> {
        self.inner.sender.subscribe()
    }
}

/// Handed to every handler invocation.
pub struct BlocContext<F: StateFactory> {
    emitter: Emitter<F::View>,
    classifier: Arc<ResponseClassifier<F>>,
}

impl<F: StateFactory> Clone for BlocContext<F> {
    fn clone(&self) -> Self {
        Self {
            emitter: self.emitter.clone(),
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<F: StateFactory> BlocContext<F> {
    pub(crate) fn new(emitter: Emitter<F::View>, classifier: Arc<ResponseClassifier<F>>) -> Self {
        Self {
            emitter,
            classifier,
        }
    }

    pub fn emit(&self, state: impl Into<State<F::View>>) {
        self.emitter.emit(state);
    }

    pub fn state(&self) -> State<F::View> {
        self.emitter.state()
    }

    pub fn classifier(&self) -> &ResponseClassifier<F> {
        &self.classifier
    }

    pub fn classify(
        &self,
        response: Response<F::Payload>,
        error_type: ErrorType,
    ) -> Option<State<F::View>> {
        self.classifier.classify(response, error_type)
    }

    pub fn classify_with(
        &self,
        response: Response<F::Payload>,
        error_type: ErrorType,
        options: ClassifyOptions<F::View>,
    ) -> Option<State<F::View>> {
        self.classifier.classify_with(response, error_type, options)
    }

    /// Classifies and emits the resulting state. Returns whether one was emitted.
    pub fn emit_response(&self, response: Response<F::Payload>, error_type: ErrorType) -> bool {
        self.emit_response_with(response, error_type, ClassifyOptions::default())
    }

    pub fn emit_response_with(
        &self,
        response: Response<F::Payload>,
        error_type: ErrorType,
        options: ClassifyOptions<F::View>,
    ) -> bool {
        match self.classify_with(response, error_type, options) {
            Some(state) => {
                self.emit(state);
                true
            }
            None => false,
        }
    }
}
