//! Shadow polarity engine.
//!
//! Owns the polarity protocol and the four-state ceremonial phase machine.
//! The cycle is strict — activation → integration → manifestation →
//! dissolution → activation — with no skipping or reversal. Phases advance
//! automatically after a duration timer or immediately via
//! [`ShadowPolarityEngine::trigger_shadow_phase`].

use crate::biofeedback::BiofeedbackMetrics;
use crate::shadow::protocol::PolarityProtocol;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;

/// The four cyclical states structuring a session's arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowPhase {
    Activation,
    Integration,
    Manifestation,
    Dissolution,
}

impl ShadowPhase {
    /// The next phase in the strict cycle.
    pub fn next(self) -> Self {
        match self {
            ShadowPhase::Activation => ShadowPhase::Integration,
            ShadowPhase::Integration => ShadowPhase::Manifestation,
            ShadowPhase::Manifestation => ShadowPhase::Dissolution,
            ShadowPhase::Dissolution => ShadowPhase::Activation,
        }
    }
}

impl fmt::Display for ShadowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowPhase::Activation => write!(f, "activation"),
            ShadowPhase::Integration => write!(f, "integration"),
            ShadowPhase::Manifestation => write!(f, "manifestation"),
            ShadowPhase::Dissolution => write!(f, "dissolution"),
        }
    }
}

/// Externally visible engine state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowEngineState {
    pub is_active: bool,
    pub current_phase: ShadowPhase,

    /// Breathing regularity in [0, 1]
    pub breath_coherence: f32,

    /// Heart-rate variability coherence in [0, 1]
    pub heart_variability: f32,

    /// Brainwave entrainment in [0, 1]
    pub neural_entrainment: f32,

    /// Light channel's normalized share in [0, 1]
    pub light_dominance: f32,

    /// Dark channel's normalized share in [0, 1]
    pub dark_dominance: f32,

    /// Polarity balance in [-1, 1]
    pub polarity_balance: f32,
}

impl Default for ShadowEngineState {
    fn default() -> Self {
        Self {
            is_active: false,
            current_phase: ShadowPhase::Activation,
            breath_coherence: 0.0,
            heart_variability: 0.0,
            neural_entrainment: 0.0,
            light_dominance: 0.5,
            dark_dominance: 0.5,
            polarity_balance: 0.0,
        }
    }
}

/// Dual-polarity modulation engine with the ceremonial phase machine.
pub struct ShadowPolarityEngine {
    state: ShadowEngineState,
    protocol: PolarityProtocol,

    /// Seconds spent in the current phase
    phase_elapsed: f64,

    /// Seconds each phase lasts before automatic advance
    phase_duration: f64,

    /// Whether visual manifestation is permitted while dark dominates
    manifest_in_dark: bool,
}

impl ShadowPolarityEngine {
    /// Create an inactive engine in the activation phase.
    ///
    /// # Arguments
    /// * `phase_duration_secs` - Seconds each phase lasts before auto-advance
    pub fn new(phase_duration_secs: f64) -> Self {
        Self {
            state: ShadowEngineState::default(),
            protocol: PolarityProtocol::default(),
            phase_elapsed: 0.0,
            phase_duration: phase_duration_secs.max(1.0),
            manifest_in_dark: false,
        }
    }

    /// Begin the periodic phase-advance and coherence-derivation loop.
    pub fn start(&mut self) {
        if self.state.is_active {
            return;
        }
        self.state.is_active = true;
        self.state.current_phase = ShadowPhase::Activation;
        self.phase_elapsed = 0.0;
        info!("[SHADOW] Engine started in {} phase", self.state.current_phase);
    }

    /// Halt the engine. Idempotent.
    pub fn stop(&mut self) {
        if self.state.is_active {
            info!("[SHADOW] Engine stopped");
        }
        self.state.is_active = false;
    }

    /// Advance the engine by `dt` seconds: auto phase transition, coherence
    /// derivation from the biofeedback sample, and dark-energy drift.
    ///
    /// No-op while inactive.
    pub fn tick(&mut self, dt: f64, metrics: &BiofeedbackMetrics) {
        if !self.state.is_active {
            return;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        self.phase_elapsed += dt;
        if self.phase_elapsed >= self.phase_duration {
            self.advance_phase();
        }

        self.derive_coherence(metrics);
        self.evolve_dark_energy(dt as f32);
        self.recompute_dominance();
    }

    /// Force an immediate phase advance and reset the phase timer.
    pub fn trigger_shadow_phase(&mut self) {
        self.advance_phase();
    }

    /// Replace the active protocol wholesale; channel gains are recomputed
    /// on the next tick. Out-of-range fields are clamped, never rejected.
    pub fn update_polarity_protocol(&mut self, protocol: PolarityProtocol) {
        self.protocol = protocol.sanitized();
        self.state.polarity_balance = self.protocol.polarity_balance;
        self.recompute_dominance();
    }

    /// Set the polarity balance in [-1, 1].
    ///
    /// `light = 0.5 + 0.5b`, `dark = 0.5 - 0.5b`; dominances are
    /// renormalized shares.
    pub fn set_polarity_balance(&mut self, balance: f32) {
        self.protocol.set_balance(balance);
        self.state.polarity_balance = self.protocol.polarity_balance;
        self.recompute_dominance();
    }

    /// Toggle whether downstream visual rendering is permitted while the
    /// dark channel dominates. Does not alter audio math.
    pub fn enable_manifest_in_dark(&mut self, enabled: bool) {
        self.manifest_in_dark = enabled;
    }

    /// Whether visual manifestation is currently permitted.
    pub fn is_manifest_permitted(&self) -> bool {
        self.manifest_in_dark || self.state.dark_dominance <= self.state.light_dominance
    }

    /// Modulation gain for a voice, in [0, 1].
    ///
    /// Voices alternate between the light and dark sub-banks by index;
    /// entrainment shapes how strongly the channel amplitude bites.
    pub fn voice_gain(&self, voice_index: usize) -> f32 {
        let channel = if voice_index % 2 == 0 {
            &self.protocol.light_channel
        } else {
            &self.protocol.dark_channel
        };
        if !channel.enabled {
            return 0.0;
        }
        let shaping = 0.75 + 0.25 * self.state.neural_entrainment;
        (channel.amplitude * shaping).clamp(0.0, 1.0)
    }

    /// Current engine state.
    pub fn state(&self) -> ShadowEngineState {
        self.state
    }

    /// Current protocol.
    pub fn protocol(&self) -> &PolarityProtocol {
        &self.protocol
    }

    /// Seconds spent in the current phase.
    pub fn phase_elapsed(&self) -> f64 {
        self.phase_elapsed
    }

    fn advance_phase(&mut self) {
        let next = self.state.current_phase.next();
        debug!(
            "[SHADOW] Phase {} -> {} after {:.1}s",
            self.state.current_phase, next, self.phase_elapsed
        );
        self.state.current_phase = next;
        self.phase_elapsed = 0.0;
    }

    /// Derive coherence metrics from the biofeedback sample. The sample
    /// may be simulated; the derivation is identical either way.
    fn derive_coherence(&mut self, metrics: &BiofeedbackMetrics) {
        self.state.breath_coherence = unit(metrics.breathing_pattern.coherence);
        self.state.heart_variability = unit(metrics.heart_rate_variability.coherence_ratio);
        self.state.neural_entrainment = unit(metrics.brainwave_activity.coherence);
    }

    fn evolve_dark_energy(&mut self, dt: f32) {
        let drift = &mut self.protocol.dark_energy_drift;
        drift.expansion_factor =
            (drift.expansion_factor + drift.drift_rate * dt).clamp(1.0, 10.0);
        drift.quantum_fluctuation =
            (0.5 + 0.5 * (drift.expansion_factor * TAU * 0.1).sin()) * drift.void_resonance;
        drift.quantum_fluctuation = drift.quantum_fluctuation.clamp(0.0, 1.0);
    }

    fn recompute_dominance(&mut self) {
        let light = self.protocol.light_channel.amplitude;
        let dark = self.protocol.dark_channel.amplitude;
        let total = light + dark;
        if total > f32::EPSILON {
            self.state.light_dominance = (light / total).clamp(0.0, 1.0);
            self.state.dark_dominance = (dark / total).clamp(0.0, 1.0);
        } else {
            self.state.light_dominance = 0.5;
            self.state.dark_dominance = 0.5;
        }
    }
}

fn unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
