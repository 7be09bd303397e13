// src/session/mod.rs

// Host-loop orchestration that composes the systems into one per-frame step.
// Systems never import from here.

#[cfg(feature = "session-explorer")]
pub mod explorer;

#[cfg(feature = "session-explorer")]
pub use explorer::*;
