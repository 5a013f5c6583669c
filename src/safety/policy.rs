//! Safety policy thresholds.
//!
//! The numbers here follow common epilepsy/accessibility guidance (notably
//! the 3 Hz flicker cap) but are deliberately configuration, not hard-coded
//! law: validate them against current standards before any real deployment.

use serde::{Deserialize, Serialize};

/// Fixed policy thresholds the monitor evaluates against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyPolicy {
    /// Audio peak level above which a critical alert fires (linear, 0..1)
    pub audio_peak_critical: f32,

    /// Audio RMS level above which a warning fires (linear, 0..1)
    pub audio_rms_warning: f32,

    /// Lowest acceptable dominant frequency (Hz)
    pub frequency_min_hz: f32,

    /// Highest acceptable dominant frequency (Hz)
    pub frequency_max_hz: f32,

    /// Flash rate above which a critical alert fires (Hz, seizure-safety bound)
    pub flash_rate_critical_hz: f32,

    /// Brightness above which a warning fires (0..1)
    pub brightness_warning: f32,

    /// Contrast above which a warning fires (0..1)
    pub contrast_warning: f32,

    /// Breathing rate above which a critical alert fires (BPM)
    pub breathing_rate_critical_bpm: f32,

    /// Breathing rate below which a warning fires (BPM)
    pub breathing_rate_low_warning_bpm: f32,

    /// Breathing coherence below which a warning fires (0..1)
    pub breathing_coherence_warning: f32,

    /// Session length at which a warning fires (minutes)
    pub duration_warning_mins: f64,

    /// Session length at which a critical stop fires (minutes)
    pub duration_critical_mins: f64,

    /// Recommended soft cap on session length (minutes)
    pub duration_recommended_mins: f64,

    /// Window within which identical (category, type) alerts deduplicate (seconds)
    pub dedupe_window_secs: f64,

    /// Window within which alerts count toward the overall level (seconds)
    pub active_window_secs: f64,

    /// Maximum alert log entries before the oldest is evicted
    pub max_log_entries: usize,

    /// Multiplicative factor per active audio-reduce alert
    pub audio_reduction_factor: f32,

    /// Multiplicative factor per active visual-reduce alert
    pub visual_reduction_factor: f32,
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self {
            audio_peak_critical: 0.90,
            audio_rms_warning: 0.70,
            frequency_min_hz: 20.0,
            frequency_max_hz: 20_000.0,
            flash_rate_critical_hz: 3.0,
            brightness_warning: 0.80,
            contrast_warning: 0.90,
            breathing_rate_critical_bpm: 30.0,
            breathing_rate_low_warning_bpm: 4.0,
            breathing_coherence_warning: 0.30,
            duration_warning_mins: 20.0,
            duration_critical_mins: 45.0,
            duration_recommended_mins: 30.0,
            dedupe_window_secs: 5.0,
            active_window_secs: 30.0,
            max_log_entries: 50,
            audio_reduction_factor: 0.7,
            visual_reduction_factor: 0.8,
        }
    }
}
