//! Polarity protocol data model.
//!
//! The protocol balances two oscillator sub-banks: a light channel and a
//! dark channel. Their amplitudes are driven by a single polarity balance
//! in [-1, 1]; the dark channel additionally carries a slow dark-energy
//! drift that evolves per tick.

use serde::{Deserialize, Serialize};

/// How a channel's sub-harmonics combine with the main bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResonanceMode {
    Constructive,
    Destructive,
}

/// One polarity channel (light or dark).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityChannel {
    pub enabled: bool,

    /// Channel amplitude in [0, 1]
    pub amplitude: f32,

    /// Channel phase offset in radians
    pub phase: f32,

    /// Sub-harmonic depth in [0, 1]
    pub subharmonic_depth: f32,

    /// Textural complexity in [0, 1]
    pub textural_complexity: f32,

    pub resonance_mode: ResonanceMode,
}

impl PolarityChannel {
    fn light_default() -> Self {
        Self {
            enabled: true,
            amplitude: 0.5,
            phase: 0.0,
            subharmonic_depth: 0.3,
            textural_complexity: 0.4,
            resonance_mode: ResonanceMode::Constructive,
        }
    }

    fn dark_default() -> Self {
        Self {
            enabled: true,
            amplitude: 0.5,
            phase: std::f32::consts::PI,
            subharmonic_depth: 0.6,
            textural_complexity: 0.7,
            resonance_mode: ResonanceMode::Destructive,
        }
    }
}

/// Slow evolution parameters for the dark channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DarkEnergyDrift {
    /// Expansion-factor drift per second
    pub drift_rate: f32,

    /// Current expansion factor, ≥ 1
    pub expansion_factor: f32,

    /// Void resonance in [0, 1]
    pub void_resonance: f32,

    /// Quantum fluctuation in [0, 1], oscillates per tick
    pub quantum_fluctuation: f32,

    /// Dark matter density in [0, 1]
    pub dark_matter_density: f32,
}

impl Default for DarkEnergyDrift {
    fn default() -> Self {
        Self {
            drift_rate: 0.001,
            expansion_factor: 1.0,
            void_resonance: 0.2,
            quantum_fluctuation: 0.1,
            dark_matter_density: 0.25,
        }
    }
}

/// The dual light/dark modulation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarityProtocol {
    pub light_channel: PolarityChannel,
    pub dark_channel: PolarityChannel,

    /// Polarity balance in [-1, 1] (-1 = fully dark, +1 = fully light)
    pub polarity_balance: f32,

    pub cross_polarization_enabled: bool,

    pub dark_energy_drift: DarkEnergyDrift,
}

impl Default for PolarityProtocol {
    fn default() -> Self {
        Self {
            light_channel: PolarityChannel::light_default(),
            dark_channel: PolarityChannel::dark_default(),
            polarity_balance: 0.0,
            cross_polarization_enabled: false,
            dark_energy_drift: DarkEnergyDrift::default(),
        }
    }
}

impl PolarityProtocol {
    /// Set the polarity balance and derive channel amplitudes from it.
    ///
    /// `light = 0.5 + 0.5b`, `dark = 0.5 - 0.5b`, all clamped. Non-finite
    /// balance collapses to neutral (0).
    pub fn set_balance(&mut self, balance: f32) {
        let b = if balance.is_finite() {
            balance.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.polarity_balance = b;
        self.light_channel.amplitude = (0.5 + 0.5 * b).clamp(0.0, 1.0);
        self.dark_channel.amplitude = (0.5 - 0.5 * b).clamp(0.0, 1.0);
    }

    /// Sanitize a wholesale protocol replacement: every bounded field is
    /// clamped rather than rejected.
    pub fn sanitized(mut self) -> Self {
        self.set_balance(self.polarity_balance);
        for channel in [&mut self.light_channel, &mut self.dark_channel] {
            channel.subharmonic_depth = unit_clamp(channel.subharmonic_depth);
            channel.textural_complexity = unit_clamp(channel.textural_complexity);
            if !channel.phase.is_finite() {
                channel.phase = 0.0;
            }
        }
        let drift = &mut self.dark_energy_drift;
        if !drift.drift_rate.is_finite() {
            drift.drift_rate = 0.0;
        }
        if !drift.expansion_factor.is_finite() || drift.expansion_factor < 1.0 {
            drift.expansion_factor = 1.0;
        }
        drift.void_resonance = unit_clamp(drift.void_resonance);
        drift.quantum_fluctuation = unit_clamp(drift.quantum_fluctuation);
        drift.dark_matter_density = unit_clamp(drift.dark_matter_density);
        self
    }
}

fn unit_clamp(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(-1.0 ; "neg_one")]
    #[test_case(-0.5 ; "neg_half")]
    #[test_case(0.0 ; "zero")]
    #[test_case(0.33 ; "third")]
    #[test_case(1.0 ; "one")]
    fn test_channel_amplitudes_sum_to_one(balance: f32) {
        let mut protocol = PolarityProtocol::default();
        protocol.set_balance(balance);

        let light = protocol.light_channel.amplitude;
        let dark = protocol.dark_channel.amplitude;
        assert_relative_eq!(light + dark, 1.0, epsilon = 1e-6);
        assert!((0.0..=1.0).contains(&light));
        assert!((0.0..=1.0).contains(&dark));
    }

    #[test]
    fn test_out_of_range_balance_clamped() {
        let mut protocol = PolarityProtocol::default();
        protocol.set_balance(5.0);
        assert_eq!(protocol.polarity_balance, 1.0);
        assert_eq!(protocol.light_channel.amplitude, 1.0);
        assert_eq!(protocol.dark_channel.amplitude, 0.0);

        protocol.set_balance(f32::NAN);
        assert_eq!(protocol.polarity_balance, 0.0);
    }

    #[test]
    fn test_sanitize_repairs_bad_protocol() {
        let mut protocol = PolarityProtocol::default();
        protocol.polarity_balance = f32::INFINITY;
        protocol.light_channel.subharmonic_depth = 4.0;
        protocol.dark_energy_drift.expansion_factor = f32::NAN;
        protocol.dark_energy_drift.void_resonance = -2.0;

        let fixed = protocol.sanitized();
        assert_eq!(fixed.polarity_balance, 0.0);
        assert_eq!(fixed.light_channel.subharmonic_depth, 1.0);
        assert_eq!(fixed.dark_energy_drift.expansion_factor, 1.0);
        assert_eq!(fixed.dark_energy_drift.void_resonance, 0.0);
    }

    #[test]
    fn test_protocol_json_roundtrip() {
        let protocol = PolarityProtocol::default();
        let json = serde_json::to_string(&protocol).unwrap();
        let restored: PolarityProtocol = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, protocol);
    }
}
