use serde::{Deserialize, Serialize};

use crate::response::Classification;

/// Message carried by exception-flavoured error states.
pub const EXCEPTION_MESSAGE: &str = "An unexpected error occurred, please try again";

/// Caller-chosen routing hint deciding which branch an error becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    /// Inline error in place of content.
    Render,
    /// Toast/snackbar style error, no rebuild.
    #[default]
    NonRender,
    /// Inert error; something else (a full-screen surface) already shows it.
    None,
}

/// States that require the consumer to rebuild its view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum RenderState<V> {
    Initial,
    Loading,
    LoadAnimation,
    Data(V),
    Error { message: String },
}

impl<V> RenderState<V> {
    pub fn error(message: impl Into<String>) -> Self {
        RenderState::Error {
            message: message.into(),
        }
    }

    /// Error state for failures that originated inside the engine.
    pub fn exception() -> Self {
        Self::error(EXCEPTION_MESSAGE)
    }
}

/// States the consumer reacts to without rebuilding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NonRenderState {
    Loading,
    EndLoading,
    Error {
        message: String,
        classification: Classification,
    },
}

impl NonRenderState {
    pub fn error(message: impl Into<String>, classification: Classification) -> Self {
        NonRenderState::Error {
            message: message.into(),
            classification,
        }
    }

    pub fn exception() -> Self {
        Self::error(EXCEPTION_MESSAGE, Classification::ApiError)
    }
}

/// Output of the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum State<V> {
    Render(RenderState<V>),
    NonRender(NonRenderState),
}

impl<V> Default for State<V> {
    fn default() -> Self {
        State::Render(RenderState::Initial)
    }
}

impl<V> From<RenderState<V>> for State<V> {
    fn from(state: RenderState<V>) -> Self {
        State::Render(state)
    }
}

impl<V> From<NonRenderState> for State<V> {
    fn from(state: NonRenderState) -> Self {
        State::NonRender(state)
    }
}

impl<V> State<V> {
    pub fn is_render(&self) -> bool {
        matches!(self, State::Render(_))
    }

    pub fn is_non_render(&self) -> bool {
        matches!(self, State::NonRender(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            State::Render(RenderState::Error { .. }) | State::NonRender(NonRenderState::Error { .. })
        )
    }

    /// Message of either error variant.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            State::Render(RenderState::Error { message })
            | State::NonRender(NonRenderState::Error { message, .. }) => Some(message),
            _ => None,
        }
    }

    /// Classification tag of a non-render error.
    pub fn error_classification(&self) -> Option<Classification> {
        match self {
            State::NonRender(NonRenderState::Error { classification, .. }) => Some(*classification),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&V> {
        match self {
            State::Render(RenderState::Data(value)) => Some(value),
            _ => None,
        }
    }
}
