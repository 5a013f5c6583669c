//! Simulated biofeedback source.
//!
//! Stands in when no hardware biosignal adapter is attached. Coherence-like
//! values follow a bounded pseudo-random walk in [0, 1]; rates walk inside
//! physiological bands. Every sample is flagged `simulated = true` so the
//! data can never be presented as measured.

use crate::biofeedback::{
    AutonomicBalance, BiofeedbackMetrics, BiofeedbackSource, BrainwaveActivity, BreathingPattern,
    HeartRateVariability,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Maximum step a unit-range value moves per second of session time.
const UNIT_WALK_STEP: f32 = 0.05;

/// Simulated breathing rate band, breaths per minute.
const BREATH_RATE_MIN: f32 = 4.0;
const BREATH_RATE_MAX: f32 = 12.0;

/// Bounded pseudo-random-walk biosignal generator.
pub struct SimulatedBiofeedbackSource {
    rng: StdRng,

    hrv_coherence: f32,
    rmssd: f32,
    brain_coherence: f32,
    bands: [f32; 5],
    breath_rate: f32,
    breath_depth: f32,
    breath_coherence: f32,
    breath_phase: f32,
    sympathetic: f32,
}

impl SimulatedBiofeedbackSource {
    /// Create a source seeded from entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a deterministically seeded source, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            hrv_coherence: 0.6,
            rmssd: 45.0,
            brain_coherence: 0.55,
            bands: [0.5, 0.3, 0.4, 0.2, 0.1],
            breath_rate: 6.0,
            breath_depth: 0.6,
            breath_coherence: 0.65,
            breath_phase: 0.0,
            sympathetic: 0.4,
        }
    }

    /// Step a unit-range value by a bounded random amount.
    fn walk_unit(&mut self, value: f32, dt: f32) -> f32 {
        let step = UNIT_WALK_STEP * dt.max(0.0);
        let delta = self.rng.gen_range(-step..=step);
        (value + delta).clamp(0.0, 1.0)
    }

    fn walk_range(&mut self, value: f32, dt: f32, lo: f32, hi: f32, step: f32) -> f32 {
        let step = step * dt.max(0.0);
        let delta = self.rng.gen_range(-step..=step);
        (value + delta).clamp(lo, hi)
    }
}

impl Default for SimulatedBiofeedbackSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BiofeedbackSource for SimulatedBiofeedbackSource {
    fn sample(&mut self, dt: f64) -> BiofeedbackMetrics {
        let dt = if dt.is_finite() && dt > 0.0 { dt as f32 } else { 0.0 };
        let now = Utc::now();

        self.hrv_coherence = self.walk_unit(self.hrv_coherence, dt);
        self.rmssd = self.walk_range(self.rmssd, dt, 10.0, 120.0, 2.0);
        self.brain_coherence = self.walk_unit(self.brain_coherence, dt);
        for i in 0..self.bands.len() {
            self.bands[i] = self.walk_unit(self.bands[i], dt);
        }
        self.breath_rate =
            self.walk_range(self.breath_rate, dt, BREATH_RATE_MIN, BREATH_RATE_MAX, 0.3);
        self.breath_depth = self.walk_unit(self.breath_depth, dt);
        self.breath_coherence = self.walk_unit(self.breath_coherence, dt);
        self.breath_phase = (self.breath_phase + dt * self.breath_rate / 60.0 * TAU).rem_euclid(TAU);
        self.sympathetic = self.walk_unit(self.sympathetic, dt);

        let parasympathetic = 1.0 - self.sympathetic;

        BiofeedbackMetrics {
            heart_rate_variability: HeartRateVariability {
                rmssd: self.rmssd,
                pnn50: (self.rmssd / 120.0 * 60.0).clamp(0.0, 100.0),
                coherence_ratio: self.hrv_coherence,
                timestamp: now,
            },
            brainwave_activity: BrainwaveActivity {
                alpha: self.bands[0],
                beta: self.bands[1],
                theta: self.bands[2],
                delta: self.bands[3],
                gamma: self.bands[4],
                coherence: self.brain_coherence,
                timestamp: now,
            },
            breathing_pattern: BreathingPattern {
                rate: self.breath_rate,
                depth: self.breath_depth,
                coherence: self.breath_coherence,
                phase: self.breath_phase,
                timestamp: now,
            },
            autonomic_balance: AutonomicBalance {
                sympathetic: self.sympathetic,
                parasympathetic,
                balance: (parasympathetic - self.sympathetic).clamp(-1.0, 1.0),
                timestamp: now,
            },
            simulated: true,
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_flagged_simulated() {
        let mut source = SimulatedBiofeedbackSource::with_seed(1);
        assert!(source.is_simulated());
        assert!(source.sample(1.0).simulated);
    }

    #[test]
    fn test_walk_stays_bounded() {
        let mut source = SimulatedBiofeedbackSource::with_seed(42);
        for _ in 0..5_000 {
            let m = source.sample(1.0);
            assert!((0.0..=1.0).contains(&m.heart_rate_variability.coherence_ratio));
            assert!((0.0..=1.0).contains(&m.brainwave_activity.coherence));
            assert!((0.0..=1.0).contains(&m.breathing_pattern.coherence));
            assert!((0.0..=1.0).contains(&m.breathing_pattern.depth));
            assert!((0.0..=1.0).contains(&m.autonomic_balance.sympathetic));
            assert!((-1.0..=1.0).contains(&m.autonomic_balance.balance));
            assert!(m.breathing_pattern.rate >= BREATH_RATE_MIN);
            assert!(m.breathing_pattern.rate <= BREATH_RATE_MAX);
        }
    }

    #[test]
    fn test_seeded_sources_are_reproducible() {
        let mut a = SimulatedBiofeedbackSource::with_seed(9);
        let mut b = SimulatedBiofeedbackSource::with_seed(9);
        for _ in 0..50 {
            let ma = a.sample(0.5);
            let mb = b.sample(0.5);
            assert_eq!(ma.breathing_pattern.rate, mb.breathing_pattern.rate);
            assert_eq!(
                ma.heart_rate_variability.coherence_ratio,
                mb.heart_rate_variability.coherence_ratio
            );
        }
    }

    #[test]
    fn test_bad_dt_freezes_walk() {
        let mut source = SimulatedBiofeedbackSource::with_seed(3);
        let before = source.sample(0.0);
        let after = source.sample(f64::NAN);
        assert_eq!(
            before.breathing_pattern.rate,
            after.breathing_pattern.rate
        );
    }
}
