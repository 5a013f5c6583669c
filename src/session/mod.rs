//! Session Module
//!
//! Composes geometry, voices, polarity, biofeedback, and safety into one
//! controllable session:
//! - Orchestrator owning all engine state, driven by explicit ticks
//! - Immutable state snapshots for external consumers
//! - Two-domain runner separating render-rate and safety-rate scheduling

pub mod orchestrator;
pub mod runner;
pub mod snapshot;

pub use orchestrator::SessionOrchestrator;
pub use runner::SessionRunner;
pub use snapshot::SessionSnapshot;
