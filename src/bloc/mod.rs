//! Event dispatch loop.
//!
//! A [`Bloc`] is an actor: events go in through [`Bloc::submit`], states
//! come out through [`Bloc::subscribe`].
//!
//! ```text
//! submit(event) ──→ per-kind queue ──→ Transformer ──→ handler ──→ emit(state)
//!                                                        │
//!                                                 ResponseClassifier
//! ```
//!
//! Handlers and their transformers are registered once, per event kind, on
//! a [`BlocBuilder`].

mod context;
mod engine;
mod event;

pub use context::{BlocContext, Emitter};
pub use engine::{Bloc, BlocBuilder, BlocError};
pub use event::Event;
