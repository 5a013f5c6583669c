//! Oscillator Voice Module
//!
//! Maps geometry points to synthesized audio voices:
//! - Geometry-to-parameter mapping with a strict numeric contract
//! - Fixed-capacity indexed voice-slot arena (no per-voice heap churn)

pub mod params;
pub mod pool;

pub use params::{map_voice_params, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};
pub use pool::{OscillatorVoicePool, MAX_VOICES};
