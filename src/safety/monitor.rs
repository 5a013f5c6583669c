//! Safety monitor.
//!
//! Samples audio, visual, breathing, and duration metrics against the
//! policy thresholds and raises graded alerts. Every threshold breach is
//! non-fatal: it yields an alert with a recommended action, never an error.
//! The monitor keeps its own monotonic clock, advanced by `tick()`, so
//! dedupe and active-window logic is deterministic under test.

use crate::safety::policy::SafetyPolicy;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Warning,
    Critical,
}

/// Which envelope the alert belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Audio,
    Visual,
    Breathing,
    Duration,
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCategory::Audio => write!(f, "audio"),
            AlertCategory::Visual => write!(f, "visual"),
            AlertCategory::Breathing => write!(f, "breathing"),
            AlertCategory::Duration => write!(f, "duration"),
        }
    }
}

/// Recommended corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertAction {
    Reduce,
    Pause,
    Stop,
    Notify,
}

/// A graded safety alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAlert {
    pub alert_type: AlertType,
    pub category: AlertCategory,
    pub message: String,
    pub action: AlertAction,
    pub timestamp: DateTime<Utc>,

    /// Monitor-clock time the alert fired, in seconds since session start
    pub at_secs: f64,
}

/// Overall safety level aggregated over the active window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Safe,
    Warning,
    Critical,
}

/// Most recent metric readings, as fed by the orchestrator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SafetyMetrics {
    pub audio_peak: f32,
    pub audio_rms: f32,
    pub audio_frequency: f32,
    pub flash_rate: f32,
    pub brightness: f32,
    pub contrast: f32,
    pub breathing_rate: f32,
    pub breathing_target: f32,
    pub breathing_coherence: f32,

    /// Session duration in minutes
    pub session_duration_mins: f64,
}

/// Corrective factors folded from the currently active alerts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyCorrections {
    /// Multiplicative audio attenuation (1.0 = none)
    pub audio_reduction: f32,

    /// Multiplicative visual attenuation (1.0 = none)
    pub visual_reduction: f32,

    /// True when any active alert demands pause or stop
    pub pause_required: bool,
}

impl Default for SafetyCorrections {
    fn default() -> Self {
        Self {
            audio_reduction: 1.0,
            visual_reduction: 1.0,
            pause_required: false,
        }
    }
}

/// Handle returned by `subscribe()`, used for explicit unsubscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type AlertObserver = Box<dyn Fn(&SafetyAlert) + Send>;

/// Independently samples exposure metrics against fixed thresholds, raises
/// graded alerts, and computes corrective attenuation factors.
pub struct SafetyMonitor {
    policy: SafetyPolicy,
    metrics: SafetyMetrics,

    /// Bounded alert log, oldest evicted first
    alerts: VecDeque<SafetyAlert>,

    /// Monotonic session clock in seconds, advanced by `tick()`
    clock_secs: f64,

    observers: Vec<(SubscriptionId, AlertObserver)>,
    next_subscription: u64,
}

impl SafetyMonitor {
    /// Create a monitor with the given policy.
    pub fn new(policy: SafetyPolicy) -> Self {
        Self {
            policy,
            metrics: SafetyMetrics::default(),
            alerts: VecDeque::new(),
            clock_secs: 0.0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Advance the monitor clock by `dt` seconds and run the
    /// session-duration check.
    pub fn tick(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.clock_secs += dt;
        }
        self.metrics.session_duration_mins = self.clock_secs / 60.0;
        self.check_duration();
    }

    /// Feed the latest audio readings and evaluate the audio envelope.
    pub fn update_audio_metrics(&mut self, peak: f32, rms: f32, frequency: f32) {
        self.metrics.audio_peak = peak;
        self.metrics.audio_rms = rms;
        self.metrics.audio_frequency = frequency;

        if peak > self.policy.audio_peak_critical {
            self.raise(
                AlertType::Critical,
                AlertCategory::Audio,
                AlertAction::Reduce,
                format!(
                    "Audio peak {:.2} exceeds {:.2} limit",
                    peak, self.policy.audio_peak_critical
                ),
            );
        } else if rms > self.policy.audio_rms_warning {
            self.raise(
                AlertType::Warning,
                AlertCategory::Audio,
                AlertAction::Reduce,
                format!(
                    "Audio RMS {:.2} exceeds {:.2} limit",
                    rms, self.policy.audio_rms_warning
                ),
            );
        }

        let in_band = (self.policy.frequency_min_hz..=self.policy.frequency_max_hz)
            .contains(&frequency)
            && frequency.is_finite();
        if !in_band {
            self.raise(
                AlertType::Warning,
                AlertCategory::Audio,
                AlertAction::Notify,
                format!("Dominant frequency {:.1} Hz outside audible band", frequency),
            );
        }
    }

    /// Feed the latest visual readings and evaluate the visual envelope.
    ///
    /// A flash rate above the critical bound is the seizure-safety case and
    /// demands a stop, not a reduction.
    pub fn update_visual_metrics(&mut self, flash_rate: f32, brightness: f32, contrast: f32) {
        self.metrics.flash_rate = flash_rate;
        self.metrics.brightness = brightness;
        self.metrics.contrast = contrast;

        if flash_rate > self.policy.flash_rate_critical_hz {
            self.raise(
                AlertType::Critical,
                AlertCategory::Visual,
                AlertAction::Stop,
                format!(
                    "Flash rate {:.1} Hz exceeds {:.1} Hz seizure-safety bound",
                    flash_rate, self.policy.flash_rate_critical_hz
                ),
            );
            return;
        }

        if brightness > self.policy.brightness_warning {
            self.raise(
                AlertType::Warning,
                AlertCategory::Visual,
                AlertAction::Reduce,
                format!("Brightness {:.2} above comfort limit", brightness),
            );
        }
        if contrast > self.policy.contrast_warning {
            self.raise(
                AlertType::Warning,
                AlertCategory::Visual,
                AlertAction::Reduce,
                format!("Contrast {:.2} above comfort limit", contrast),
            );
        }
    }

    /// Feed the latest breathing readings and evaluate the breathing
    /// guidance envelope.
    pub fn update_breathing_metrics(&mut self, rate: f32, target: f32, coherence: f32) {
        self.metrics.breathing_rate = rate;
        self.metrics.breathing_target = target;
        self.metrics.breathing_coherence = coherence;

        if rate > self.policy.breathing_rate_critical_bpm {
            self.raise(
                AlertType::Critical,
                AlertCategory::Breathing,
                AlertAction::Pause,
                format!("Breathing rate {:.0} BPM indicates hyperventilation", rate),
            );
            return;
        }

        if rate < self.policy.breathing_rate_low_warning_bpm {
            self.raise(
                AlertType::Warning,
                AlertCategory::Breathing,
                AlertAction::Notify,
                format!("Breathing rate {:.1} BPM unusually low", rate),
            );
        }
        if coherence < self.policy.breathing_coherence_warning {
            self.raise(
                AlertType::Warning,
                AlertCategory::Breathing,
                AlertAction::Notify,
                format!("Breathing coherence {:.2} below guidance threshold", coherence),
            );
        }
    }

    /// Record an alert directly.
    ///
    /// Identical (category, type) pairs within the dedupe window are
    /// dropped; the log is capped with oldest-first eviction; observers are
    /// notified of every recorded alert.
    pub fn trigger_alert(&mut self, alert: SafetyAlert) {
        let duplicate = self.alerts.iter().any(|existing| {
            existing.category == alert.category
                && existing.alert_type == alert.alert_type
                && self.clock_secs - existing.at_secs < self.policy.dedupe_window_secs
        });
        if duplicate {
            debug!(
                "[SAFETY] Deduplicated {} {:?} alert",
                alert.category, alert.alert_type
            );
            return;
        }

        match alert.alert_type {
            AlertType::Critical => warn!("[SAFETY] CRITICAL {}: {}", alert.category, alert.message),
            AlertType::Warning => debug!("[SAFETY] warning {}: {}", alert.category, alert.message),
        }

        while self.alerts.len() >= self.policy.max_log_entries {
            self.alerts.pop_front();
        }
        for (_, observer) in &self.observers {
            observer(&alert);
        }
        self.alerts.push_back(alert);
    }

    /// Aggregate alerts active within the last 30 s into one overall level.
    pub fn safety_status(&self) -> SafetyLevel {
        let mut level = SafetyLevel::Safe;
        for alert in self.active_alerts() {
            match alert.alert_type {
                AlertType::Critical => return SafetyLevel::Critical,
                AlertType::Warning => level = SafetyLevel::Warning,
            }
        }
        level
    }

    /// Fold all currently active "reduce" alerts into multiplicative
    /// attenuation factors, compounding per alert, and flag whether any
    /// active alert demands a pause or stop.
    pub fn apply_safety_corrections(&self) -> SafetyCorrections {
        let mut corrections = SafetyCorrections::default();
        for alert in self.active_alerts() {
            match (alert.category, alert.action) {
                (AlertCategory::Audio, AlertAction::Reduce) => {
                    corrections.audio_reduction *= self.policy.audio_reduction_factor;
                }
                (AlertCategory::Visual, AlertAction::Reduce) => {
                    corrections.visual_reduction *= self.policy.visual_reduction_factor;
                }
                _ => {}
            }
            if matches!(alert.action, AlertAction::Pause | AlertAction::Stop) {
                corrections.pause_required = true;
            }
        }
        corrections
    }

    /// Subscribe an observer to recorded alerts.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&SafetyAlert) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if the handle was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Alerts within the active window, oldest first.
    pub fn active_alerts(&self) -> impl Iterator<Item = &SafetyAlert> {
        let cutoff = self.clock_secs - self.policy.active_window_secs;
        self.alerts.iter().filter(move |a| a.at_secs >= cutoff)
    }

    /// The full bounded alert log, oldest first.
    pub fn alert_log(&self) -> impl Iterator<Item = &SafetyAlert> {
        self.alerts.iter()
    }

    /// Latest metric readings.
    pub fn metrics(&self) -> SafetyMetrics {
        self.metrics
    }

    /// Monitor clock in seconds since session start.
    pub fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    /// Reset the clock and log for a new session. Policy and subscribers
    /// are retained.
    pub fn reset(&mut self) {
        self.clock_secs = 0.0;
        self.metrics = SafetyMetrics::default();
        self.alerts.clear();
    }

    fn check_duration(&mut self) {
        let mins = self.metrics.session_duration_mins;
        if mins > self.policy.duration_critical_mins {
            self.raise(
                AlertType::Critical,
                AlertCategory::Duration,
                AlertAction::Stop,
                format!(
                    "Session at {:.0} min exceeds {:.0} min hard cap",
                    mins, self.policy.duration_critical_mins
                ),
            );
        } else if mins > self.policy.duration_warning_mins {
            self.raise(
                AlertType::Warning,
                AlertCategory::Duration,
                AlertAction::Notify,
                format!(
                    "Session at {:.0} min; {:.0} min is the recommended cap",
                    mins, self.policy.duration_recommended_mins
                ),
            );
        }
    }

    fn raise(
        &mut self,
        alert_type: AlertType,
        category: AlertCategory,
        action: AlertAction,
        message: String,
    ) {
        self.trigger_alert(SafetyAlert {
            alert_type,
            category,
            message,
            action,
            timestamp: Utc::now(),
            at_secs: self.clock_secs,
        });
    }
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self::new(SafetyPolicy::default())
    }
}
