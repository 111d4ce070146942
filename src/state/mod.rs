//! UI-facing state taxonomy.
//!
//! Every state the engine emits lands in exactly one of two branches:
//!
//! ```text
//! State ─┬─ Render     consumers rebuild the view
//!        └─ NonRender  consumers only react (toast, navigate, log)
//! ```
//!
//! - **RenderState**: initial, loading, animated loading, data, inline error
//! - **NonRenderState**: loading overlay, end of loading, silent/toast error
//! - **StateFactory**: maps a success payload into a render state

mod factory;
mod types;

pub use factory::{OpaqueFactory, StateFactory};
pub use types::{ErrorType, NonRenderState, RenderState, State, EXCEPTION_MESSAGE};
