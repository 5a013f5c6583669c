//! Shadow Polarity Module
//!
//! Dual-channel (light/dark) polarity protocol and the four-state
//! ceremonial phase machine:
//! - Polarity protocol with per-channel modulation and dark-energy drift
//! - Strict activation → integration → manifestation → dissolution cycle
//! - Coherence derivation from biofeedback metrics

pub mod engine;
pub mod protocol;

pub use engine::{ShadowEngineState, ShadowPhase, ShadowPolarityEngine};
pub use protocol::{DarkEnergyDrift, PolarityChannel, PolarityProtocol, ResonanceMode};
