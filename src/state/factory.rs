//! Success-path mapping from response payloads to render states.

use std::marker::PhantomData;

use super::types::RenderState;

/// Maps a success payload into the render state a screen shows.
///
/// Payload and view are caller-defined enums, so an implementation is an
/// exhaustive `match` over the payload discriminant. Returning an error
/// sends the response down the exception path of the classifier.
pub trait StateFactory: Send + Sync + 'static {
    /// Payload type produced by the transport.
    type Payload: Send + 'static;

    /// Value carried by [`RenderState::Data`].
    type View: Clone + Send + Sync + std::fmt::Debug + 'static;

    fn create(&self, payload: Self::Payload) -> anyhow::Result<RenderState<Self::View>>;
}

/// Default factory: wraps the payload in [`RenderState::Data`] untouched.
pub struct OpaqueFactory<P> {
    _payload: PhantomData<fn() -> P>,
}

impl<P> OpaqueFactory<P> {
    pub fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<P> Default for OpaqueFactory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> StateFactory for OpaqueFactory<P>
where
    P: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    type Payload = P;
    type View = P;

    fn create(&self, payload: P) -> anyhow::Result<RenderState<P>> {
        Ok(RenderState::Data(payload))
    }
}
