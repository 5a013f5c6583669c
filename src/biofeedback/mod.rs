//! Biofeedback Module
//!
//! Biosignal metric types and the capability interface for signal sources:
//! - Heart-rate variability, brainwave, breathing, and autonomic metrics
//! - `BiofeedbackSource` trait implemented by hardware adapters
//! - Simulated source used when no hardware is attached

pub mod simulated;

pub use simulated::SimulatedBiofeedbackSource;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Heart-rate variability sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateVariability {
    /// Root mean square of successive differences, in ms
    pub rmssd: f32,

    /// Percentage of successive intervals differing by more than 50 ms
    pub pnn50: f32,

    /// Coherence ratio in [0, 1]
    pub coherence_ratio: f32,

    pub timestamp: DateTime<Utc>,
}

/// Brainwave band activity sample, each band in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrainwaveActivity {
    pub alpha: f32,
    pub beta: f32,
    pub theta: f32,
    pub delta: f32,
    pub gamma: f32,

    /// Cross-band coherence in [0, 1]
    pub coherence: f32,

    pub timestamp: DateTime<Utc>,
}

/// Breathing pattern sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathingPattern {
    /// Breaths per minute
    pub rate: f32,

    /// Breath depth in [0, 1]
    pub depth: f32,

    /// Breathing regularity in [0, 1]
    pub coherence: f32,

    /// Position within the current breath cycle, in radians
    pub phase: f32,

    pub timestamp: DateTime<Utc>,
}

/// Autonomic nervous system balance sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutonomicBalance {
    /// Sympathetic activation in [0, 1]
    pub sympathetic: f32,

    /// Parasympathetic activation in [0, 1]
    pub parasympathetic: f32,

    /// Net balance in [-1, 1] (negative = sympathetic dominant)
    pub balance: f32,

    pub timestamp: DateTime<Utc>,
}

/// One complete biofeedback sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiofeedbackMetrics {
    pub heart_rate_variability: HeartRateVariability,
    pub brainwave_activity: BrainwaveActivity,
    pub breathing_pattern: BreathingPattern,
    pub autonomic_balance: AutonomicBalance,

    /// True when this sample was synthesized rather than measured.
    ///
    /// Simulated data must never be presented as measured.
    pub simulated: bool,
}

/// Capability interface for biosignal sources.
///
/// Hardware adapters and the simulated fallback implement the same trait,
/// selected at session construction; engine logic never branches on which
/// one is attached.
pub trait BiofeedbackSource: Send {
    /// Produce the next sample after `dt` seconds of session time.
    fn sample(&mut self, dt: f64) -> BiofeedbackMetrics;

    /// Whether this source synthesizes its data.
    fn is_simulated(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_serialize_roundtrip() {
        let mut source = SimulatedBiofeedbackSource::with_seed(7);
        let metrics = source.sample(1.0);
        let json = serde_json::to_string(&metrics).unwrap();
        let restored: BiofeedbackMetrics = serde_json::from_str(&json).unwrap();
        assert!(restored.simulated);
        assert_eq!(
            restored.breathing_pattern.rate,
            metrics.breathing_pattern.rate
        );
    }
}
