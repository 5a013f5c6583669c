//! Engine configuration.
//!
//! All tunable constants live here so sessions can be constructed with
//! explicit, injected settings instead of ambient globals. Safety thresholds
//! have their own policy struct in [`crate::safety::SafetyPolicy`].

use serde::{Deserialize, Serialize};

/// Default base frequency in Hz for the oscillator bank.
const DEFAULT_BASE_FREQUENCY: f32 = 432.0;

/// Default master gain level (linear, 0..1).
const DEFAULT_GAIN_LEVEL: f32 = 0.8;

/// Default breath-phase advance rate in radians per second.
///
/// 2π / 12 gives a 12-second breath cycle; slower rates correspond to
/// deeper session states.
const DEFAULT_BREATH_RATE: f32 = std::f32::consts::TAU / 12.0;

/// Default number of oscillator voices created at session start.
const DEFAULT_VOICE_COUNT: usize = 8;

/// Default duration of each shadow phase before auto-advance, in seconds.
const DEFAULT_PHASE_DURATION_SECS: f64 = 90.0;

/// Default parameter ramp time in milliseconds (10-50 ms avoids clicks).
const DEFAULT_RAMP_MS: f32 = 30.0;

/// Tunable engine settings, injected at session construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base frequency in Hz that geometry maps onto
    pub base_frequency: f32,

    /// Master gain level in [0, 1]; voice amplitudes are clamped to it
    pub gain_level: f32,

    /// Breath-phase advance rate in radians per second
    pub breath_rate: f32,

    /// Number of voices created at `start()`
    pub default_voice_count: usize,

    /// Seconds each shadow phase lasts before automatic advance
    pub phase_duration_secs: f64,

    /// Voice parameter ramp time in milliseconds
    pub ramp_ms: f32,

    /// Harmonic depth passed to voice parameter mapping
    pub harmonic_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_frequency: DEFAULT_BASE_FREQUENCY,
            gain_level: DEFAULT_GAIN_LEVEL,
            breath_rate: DEFAULT_BREATH_RATE,
            default_voice_count: DEFAULT_VOICE_COUNT,
            phase_duration_secs: DEFAULT_PHASE_DURATION_SECS,
            ramp_ms: DEFAULT_RAMP_MS,
            harmonic_depth: 2,
        }
    }
}

impl EngineConfig {
    /// Create a config with defaults, then adjust fields as needed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitize values that must stay in range regardless of what a caller
    /// or a deserialized file provided. Never fails; clamps instead.
    pub fn sanitized(mut self) -> Self {
        if !self.base_frequency.is_finite() || self.base_frequency <= 0.0 {
            self.base_frequency = DEFAULT_BASE_FREQUENCY;
        }
        if !self.gain_level.is_finite() {
            self.gain_level = DEFAULT_GAIN_LEVEL;
        }
        self.gain_level = self.gain_level.clamp(0.0, 1.0);
        if !self.breath_rate.is_finite() || self.breath_rate <= 0.0 {
            self.breath_rate = DEFAULT_BREATH_RATE;
        }
        if !self.phase_duration_secs.is_finite() || self.phase_duration_secs <= 0.0 {
            self.phase_duration_secs = DEFAULT_PHASE_DURATION_SECS;
        }
        if !self.ramp_ms.is_finite() {
            self.ramp_ms = DEFAULT_RAMP_MS;
        }
        self.ramp_ms = self.ramp_ms.clamp(10.0, 50.0);
        self
    }
}
