//! Event-driven state classification engine.
//!
//! - [`response`] / [`state`]: the taxonomy transport outcomes are reduced to
//! - [`classifier`]: maps a [`response::Response`] to exactly one [`state::State`]
//! - [`transformer`]: debounce / sequential / concurrent delivery policies
//! - [`mutex`]: keyed async mutual exclusion
//! - [`bloc`]: the per-instance dispatch loop tying them together

pub mod bloc;
pub mod cancel;
pub mod classifier;
pub mod config;
pub mod logging;
pub mod mutex;
pub mod response;
pub mod state;
pub mod transformer;
