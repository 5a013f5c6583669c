//! Safety Enforcement Tests
//!
//! End-to-end tests for the safety domain: forced threshold breaches, the
//! corrective pipeline from monitor to audio/visual collaborators, alert
//! subscriptions, and duration escalation.

use gaa_core::audio::{AudioSink, VoiceId, VoiceParams};
use gaa_core::biofeedback::SimulatedBiofeedbackSource;
use gaa_core::safety::{AlertCategory, AlertType, SafetyAlert, SafetyLevel, SafetyPolicy};
use gaa_core::visual::{VisualDirectives, VisualRenderer};
use gaa_core::{EngineConfig, SessionOrchestrator};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Sink that only tracks master-gain writes.
#[derive(Clone, Default)]
struct GainTrackingSink {
    gains: Arc<Mutex<Vec<f32>>>,
}

impl AudioSink for GainTrackingSink {
    fn start_voice(&mut self, _id: VoiceId, _params: VoiceParams) {}

    fn update_voice(&mut self, _id: VoiceId, _params: VoiceParams, _ramp_ms: f32) {}

    fn stop_voice(&mut self, _id: VoiceId, _ramp_ms: f32) {}

    fn set_master_gain(&mut self, gain: f32) {
        self.gains.lock().push(gain);
    }
}

/// Renderer that tracks corrective attenuation factors.
#[derive(Clone, Default)]
struct AttenuationTrackingRenderer {
    factors: Arc<Mutex<Vec<f32>>>,
}

impl VisualRenderer for AttenuationTrackingRenderer {
    fn apply(&mut self, _directives: &VisualDirectives) {}

    fn apply_attenuation(&mut self, factor: f32) {
        self.factors.lock().push(factor);
    }
}

fn recording_observer() -> (Arc<Mutex<Vec<SafetyAlert>>>, impl Fn(&SafetyAlert) + Send) {
    let _ = env_logger::builder().is_test(true).try_init();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    (log, move |alert: &SafetyAlert| sink.lock().push(alert.clone()))
}

// === Forced audio breach ===

#[test]
fn test_sustained_loud_audio_deduplicates_and_attenuates() {
    // Drop the peak bound below nominal output so every tick breaches it
    let policy = SafetyPolicy {
        audio_peak_critical: 0.1,
        ..Default::default()
    };
    let sink = GainTrackingSink::default();
    let mut session = SessionOrchestrator::new(EngineConfig::default())
        .with_audio_sink(Box::new(sink.clone()))
        .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(3)))
        .with_safety_policy(policy);
    session.initialize().unwrap();

    let (alerts, observer) = recording_observer();
    session.subscribe_alerts(observer);

    session.start().unwrap();
    session.tick(1.0 / 60.0);
    for _ in 0..3 {
        session.safety_tick(1.0);
    }

    // Three breaches inside the dedupe window record exactly one alert
    let audio_alerts: Vec<SafetyAlert> = alerts
        .lock()
        .iter()
        .filter(|a| a.category == AlertCategory::Audio)
        .cloned()
        .collect();
    assert_eq!(audio_alerts.len(), 1);
    assert_eq!(audio_alerts[0].alert_type, AlertType::Critical);

    assert_eq!(session.safety().safety_status(), SafetyLevel::Critical);

    // Master gain pulled down by the 0.7 audio correction (0.8 * 0.7)
    let last_gain = *sink.gains.lock().last().unwrap();
    assert!((last_gain - 0.56).abs() < 1e-6, "last gain {}", last_gain);
    assert!(session.is_playing());
}

#[test]
fn test_breach_past_dedupe_window_fires_again() {
    let policy = SafetyPolicy {
        audio_peak_critical: 0.1,
        ..Default::default()
    };
    let mut session = SessionOrchestrator::new(EngineConfig::default())
        .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(3)))
        .with_safety_policy(policy);
    session.initialize().unwrap();

    let (alerts, observer) = recording_observer();
    session.subscribe_alerts(observer);

    session.start().unwrap();
    session.tick(1.0 / 60.0);
    session.safety_tick(1.0);
    session.safety_tick(6.0);

    let audio_alerts = alerts
        .lock()
        .iter()
        .filter(|a| a.category == AlertCategory::Audio)
        .count();
    assert_eq!(audio_alerts, 2);
}

// === Visual corrections ===

#[test]
fn test_brightness_warning_attenuates_renderer() {
    // Any nonzero brightness breaches this policy
    let policy = SafetyPolicy {
        brightness_warning: 0.0,
        ..Default::default()
    };
    let renderer = AttenuationTrackingRenderer::default();
    let mut session = SessionOrchestrator::new(EngineConfig::default())
        .with_visual_renderer(Box::new(renderer.clone()))
        .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(5)))
        .with_safety_policy(policy);
    session.initialize().unwrap();
    session.start().unwrap();

    session.tick(1.0 / 60.0);
    session.safety_tick(1.0);

    let factors = renderer.factors.lock().clone();
    assert_eq!(factors.len(), 1);
    assert!((factors[0] - 0.8).abs() < 1e-6);
    assert!(session.is_playing());
}

// === Escalation to stop ===

#[test]
fn test_duration_critical_stops_session() {
    let mut session = SessionOrchestrator::new(EngineConfig::default())
        .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(9)));
    session.initialize().unwrap();

    let (alerts, observer) = recording_observer();
    session.subscribe_alerts(observer);

    session.start().unwrap();
    session.safety_tick(46.0 * 60.0);

    assert!(!session.is_playing());
    assert_eq!(session.snapshot().active_voice_count, 0);

    let duration_criticals = alerts
        .lock()
        .iter()
        .filter(|a| a.category == AlertCategory::Duration && a.alert_type == AlertType::Critical)
        .count();
    assert_eq!(duration_criticals, 1);
}

#[test]
fn test_hyperventilation_stops_session() {
    // Force the critical bound below the simulated breathing band
    let policy = SafetyPolicy {
        breathing_rate_critical_bpm: 1.0,
        ..Default::default()
    };
    let mut session = SessionOrchestrator::new(EngineConfig::default())
        .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(13)))
        .with_safety_policy(policy);
    session.initialize().unwrap();
    session.start().unwrap();

    session.tick(1.0 / 60.0);
    session.safety_tick(1.0);

    assert!(!session.is_playing());
}

// === Subscriptions ===

#[test]
fn test_unsubscribe_stops_notifications() {
    let policy = SafetyPolicy {
        audio_peak_critical: 0.1,
        ..Default::default()
    };
    let mut session = SessionOrchestrator::new(EngineConfig::default())
        .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(17)))
        .with_safety_policy(policy);
    session.initialize().unwrap();

    let (alerts, observer) = recording_observer();
    let id = session.subscribe_alerts(observer);

    session.start().unwrap();
    session.tick(1.0 / 60.0);
    session.safety_tick(1.0);
    let seen = alerts.lock().len();
    assert!(seen >= 1);

    assert!(session.unsubscribe_alerts(id));
    assert!(!session.unsubscribe_alerts(id));

    session.safety_tick(6.0);
    assert_eq!(alerts.lock().len(), seen);
}

// === Restart hygiene ===

#[test]
fn test_restart_resets_safety_clock() {
    let mut session = SessionOrchestrator::new(EngineConfig::default())
        .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(19)));
    session.initialize().unwrap();
    session.start().unwrap();

    session.safety_tick(46.0 * 60.0);
    assert!(!session.is_playing());

    // A fresh start must not inherit the expired duration budget
    session.start().unwrap();
    session.safety_tick(60.0);
    assert!(session.is_playing());
    assert_eq!(session.safety().safety_status(), SafetyLevel::Safe);
}
