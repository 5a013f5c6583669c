//! Session orchestrator.
//!
//! Single owner and mutator of all engine state. The orchestrator is
//! deliberately synchronous: the render-rate pipeline runs in `tick()` and
//! the safety-rate pipeline in `safety_tick()`, each driven externally
//! (by [`crate::session::SessionRunner`] in production, directly in tests)
//! so the two domains never share a scheduling queue.

use crate::audio::{AudioSink, NullAudioSink, VoiceId};
use crate::biofeedback::{BiofeedbackMetrics, BiofeedbackSource, SimulatedBiofeedbackSource};
use crate::config::EngineConfig;
use crate::error::{GaaError, Result};
use crate::geometry::{GeometryLayerManager, GeometryPoint, ScaleLayer};
use crate::safety::{SafetyAlert, SafetyMonitor, SafetyPolicy, SubscriptionId};
use crate::session::snapshot::SessionSnapshot;
use crate::shadow::{PolarityProtocol, ShadowPolarityEngine};
use crate::visual::{NullRenderer, VisualDirectives, VisualRenderer};
use crate::voice::OscillatorVoicePool;
use log::{debug, info, warn};
use uuid::Uuid;

/// Composes the GAA engine components into one controllable session.
pub struct SessionOrchestrator {
    config: EngineConfig,

    sink: Box<dyn AudioSink>,
    renderer: Box<dyn VisualRenderer>,
    biofeedback: Box<dyn BiofeedbackSource>,

    geometry: GeometryLayerManager,
    pool: OscillatorVoicePool,
    shadow: ShadowPolarityEngine,
    safety: SafetyMonitor,

    is_initialized: bool,
    is_playing: bool,
    session_id: Option<Uuid>,

    voice_count: usize,
    current_geometry: Vec<GeometryPoint>,
    latest_metrics: Option<BiofeedbackMetrics>,
    directives: VisualDirectives,
}

impl SessionOrchestrator {
    /// Create an orchestrator with null external collaborators and a
    /// simulated biofeedback source.
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        Self {
            geometry: GeometryLayerManager::new(config.breath_rate),
            pool: OscillatorVoicePool::new(
                config.base_frequency,
                config.gain_level,
                config.ramp_ms,
            ),
            shadow: ShadowPolarityEngine::new(config.phase_duration_secs),
            safety: SafetyMonitor::new(SafetyPolicy::default()),
            sink: Box::new(NullAudioSink),
            renderer: Box::new(NullRenderer),
            biofeedback: Box::new(SimulatedBiofeedbackSource::new()),
            is_initialized: false,
            is_playing: false,
            session_id: None,
            voice_count: config.default_voice_count,
            current_geometry: Vec::new(),
            latest_metrics: None,
            directives: VisualDirectives::default(),
            config,
        }
    }

    /// Inject the audio output adapter. Must be called before `initialize()`.
    pub fn with_audio_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Inject the visual renderer.
    pub fn with_visual_renderer(mut self, renderer: Box<dyn VisualRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Inject the biosignal source (hardware adapter or simulated fallback).
    pub fn with_biofeedback_source(mut self, source: Box<dyn BiofeedbackSource>) -> Self {
        self.biofeedback = source;
        self
    }

    /// Inject a non-default safety policy.
    pub fn with_safety_policy(mut self, policy: SafetyPolicy) -> Self {
        self.safety = SafetyMonitor::new(policy);
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Acquire the audio output context and assign a session id.
    ///
    /// On failure the engine stays uninitialized; calling again is allowed
    /// and safe.
    pub fn initialize(&mut self) -> Result<()> {
        if self.is_initialized {
            debug!("[SESSION] Already initialized");
            return Ok(());
        }
        self.sink.acquire()?;
        let id = Uuid::new_v4();
        self.session_id = Some(id);
        self.is_initialized = true;
        info!("[SESSION] Initialized session {}", id);
        Ok(())
    }

    /// Generate initial geometry, create one voice per point, and start the
    /// polarity engine.
    pub fn start(&mut self) -> Result<()> {
        if !self.is_initialized {
            return Err(GaaError::NotInitialized { operation: "start" });
        }
        if self.is_playing {
            debug!("[SESSION] Already playing");
            return Ok(());
        }

        self.safety.reset();
        self.current_geometry = self.geometry.generate_composite_geometry(self.voice_count);
        for point in &self.current_geometry {
            self.pool.create_voice(
                self.sink.as_mut(),
                point.index as VoiceId,
                point,
                self.config.harmonic_depth,
            );
        }
        self.sink.set_master_gain(self.config.gain_level);
        self.shadow.start();
        self.is_playing = true;
        info!("[SESSION] Started with {} voices", self.pool.active_count());
        Ok(())
    }

    /// Stop all voices, halt the polarity engine, and release the audio
    /// context. Idempotent and safe from any state, including before a
    /// successful `start()`.
    pub fn stop(&mut self) {
        if self.is_playing {
            info!("[SESSION] Stopping");
        }
        self.pool.stop_all(self.sink.as_mut());
        self.shadow.stop();
        self.sink.release();
        self.is_playing = false;
        self.current_geometry.clear();
    }

    /// Stop and recreate the voice set at a new cardinality without
    /// restarting the whole session.
    pub fn set_oscillator_count(&mut self, count: usize) {
        self.voice_count = count;
        if !self.is_playing {
            return;
        }
        self.pool.stop_all(self.sink.as_mut());
        self.current_geometry = self.geometry.generate_composite_geometry(count);
        for point in &self.current_geometry {
            self.pool.create_voice(
                self.sink.as_mut(),
                point.index as VoiceId,
                point,
                self.config.harmonic_depth,
            );
        }
        debug!("[SESSION] Voice count set to {}", self.pool.active_count());
    }

    // ========================================================================
    // Render-rate pipeline (~60 Hz)
    // ========================================================================

    /// One render tick: advance breath phase, regenerate geometry, update
    /// voices, derive biofeedback, modulate by polarity, and hand visual
    /// directives to the renderer.
    ///
    /// Never fails; malformed samples degrade to clamped values.
    pub fn tick(&mut self, dt: f32) {
        if !self.is_playing {
            return;
        }

        self.geometry.update_breath_phase(dt);
        self.current_geometry = self.geometry.generate_composite_geometry(self.voice_count);
        for point in &self.current_geometry {
            self.pool.update_voice(
                self.sink.as_mut(),
                point.index as VoiceId,
                point,
                self.config.harmonic_depth,
            );
        }

        let metrics = self.biofeedback.sample(dt as f64);
        self.shadow.tick(dt as f64, &metrics);
        self.latest_metrics = Some(metrics);

        // Polarity modulation on top of the geometry mapping
        for index in 0..self.current_geometry.len() {
            let gain = self.shadow.voice_gain(index);
            self.pool
                .scale_voice_amplitude(self.sink.as_mut(), index as VoiceId, gain);
        }

        self.update_visual_directives();
        let directives = self.directives;
        self.renderer.apply(&directives);
    }

    // ========================================================================
    // Safety-rate pipeline (~1 Hz)
    // ========================================================================

    /// One safety tick: advance the safety clock, feed current metrics,
    /// and apply corrective attenuation. Pause/stop escalations are honored
    /// immediately by stopping the session.
    pub fn safety_tick(&mut self, dt: f64) {
        if !self.is_playing {
            return;
        }

        self.safety.tick(dt);
        self.safety.update_audio_metrics(
            self.pool.peak_amplitude() * self.config.gain_level,
            self.pool.rms_amplitude() * self.config.gain_level,
            self.pool.mean_frequency(),
        );
        self.safety.update_visual_metrics(
            self.directives.flash_rate,
            self.directives.brightness,
            self.directives.contrast,
        );
        if let Some(metrics) = &self.latest_metrics {
            let target = 60.0 * self.config.breath_rate / std::f32::consts::TAU;
            self.safety.update_breathing_metrics(
                metrics.breathing_pattern.rate,
                target,
                metrics.breathing_pattern.coherence,
            );
        }

        let corrections = self.safety.apply_safety_corrections();
        if corrections.audio_reduction < 1.0 {
            self.sink
                .set_master_gain(self.config.gain_level * corrections.audio_reduction);
        }
        if corrections.visual_reduction < 1.0 {
            self.renderer.apply_attenuation(corrections.visual_reduction);
        }
        if corrections.pause_required {
            warn!("[SESSION] Safety escalation, stopping session");
            self.stop();
        }
    }

    // ========================================================================
    // Commands and queries
    // ========================================================================

    /// Flip a scale layer; the next render tick reflects it.
    pub fn toggle_layer(&mut self, layer: ScaleLayer) {
        self.geometry.toggle_layer(layer);
    }

    /// Replace the polarity protocol wholesale.
    pub fn update_polarity_protocol(&mut self, protocol: PolarityProtocol) {
        self.shadow.update_polarity_protocol(protocol);
    }

    /// Set the polarity balance in [-1, 1].
    pub fn set_polarity_balance(&mut self, balance: f32) {
        self.shadow.set_polarity_balance(balance);
    }

    /// Toggle visual manifestation while the dark channel dominates.
    pub fn enable_manifest_in_dark(&mut self, enabled: bool) {
        self.shadow.enable_manifest_in_dark(enabled);
    }

    /// Force an immediate shadow phase advance.
    pub fn trigger_shadow_phase(&mut self) {
        self.shadow.trigger_shadow_phase();
    }

    /// Subscribe to the safety alert stream.
    pub fn subscribe_alerts<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&SafetyAlert) + Send + 'static,
    {
        self.safety.subscribe(observer)
    }

    /// Drop an alert subscription.
    pub fn unsubscribe_alerts(&mut self, id: SubscriptionId) -> bool {
        self.safety.unsubscribe(id)
    }

    /// Build an immutable snapshot of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_initialized: self.is_initialized,
            is_playing: self.is_playing,
            current_geometry: self.current_geometry.clone(),
            active_voice_count: self.pool.active_count(),
            breath_phase: self.geometry.breath_phase(),
            shadow_engine_state: self.shadow.state(),
            polarity_protocol: *self.shadow.protocol(),
            biofeedback_metrics: self.latest_metrics,
            session_id: self.session_id.map(|id| id.to_string()),
        }
    }

    /// Read access to the safety monitor.
    pub fn safety(&self) -> &SafetyMonitor {
        &self.safety
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Derive the current visual directives from the shadow engine state.
    fn update_visual_directives(&mut self) {
        let state = self.shadow.state();
        let permitted = self.shadow.is_manifest_permitted();

        let brightness = if permitted {
            0.3 + 0.5 * state.light_dominance
        } else {
            0.0
        };
        let contrast = 0.4 + 0.4 * state.neural_entrainment;
        // Visual pulse follows the breath cycle, well under the flicker cap
        let flash_rate = self.config.breath_rate / std::f32::consts::TAU;

        self.directives = VisualDirectives {
            brightness,
            contrast,
            flash_rate,
        }
        .sanitized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::DeniedAudioSink;

    fn ready_session() -> SessionOrchestrator {
        let mut session = SessionOrchestrator::new(EngineConfig::default())
            .with_biofeedback_source(Box::new(SimulatedBiofeedbackSource::with_seed(11)));
        session.initialize().unwrap();
        session
    }

    #[test]
    fn test_initialize_assigns_session_id() {
        let mut session = SessionOrchestrator::new(EngineConfig::default());
        assert!(session.snapshot().session_id.is_none());

        session.initialize().unwrap();
        let snapshot = session.snapshot();
        assert!(snapshot.is_initialized);
        assert!(snapshot.session_id.is_some());
    }

    #[test]
    fn test_initialize_failure_is_retryable() {
        let mut session =
            SessionOrchestrator::new(EngineConfig::default()).with_audio_sink(Box::new(DeniedAudioSink));

        let err = session.initialize().unwrap_err();
        assert_eq!(err.error_code(), "INITIALIZATION_FAILED");
        assert!(!session.is_initialized());
        assert!(session.snapshot().session_id.is_none());

        // Retry with output available
        session = session.with_audio_sink(Box::new(NullAudioSink));
        assert!(session.initialize().is_ok());
        assert!(session.is_initialized());
    }

    #[test]
    fn test_start_before_initialize_fails() {
        let mut session = SessionOrchestrator::new(EngineConfig::default());
        let err = session.start().unwrap_err();
        assert_eq!(err.error_code(), "NOT_INITIALIZED");
    }

    #[test]
    fn test_start_creates_default_voices() {
        let mut session = ready_session();
        session.start().unwrap();

        let snapshot = session.snapshot();
        assert!(snapshot.is_playing);
        assert_eq!(snapshot.active_voice_count, 8);
        assert_eq!(snapshot.current_geometry.len(), 8);
        assert!(snapshot.shadow_engine_state.is_active);
    }

    #[test]
    fn test_stop_is_idempotent_from_any_state() {
        // Before initialize
        let mut session = SessionOrchestrator::new(EngineConfig::default());
        session.stop();
        session.stop();
        assert!(!session.is_playing());

        // After a full start
        let mut session = ready_session();
        session.start().unwrap();
        session.stop();
        assert!(!session.is_playing());
        assert_eq!(session.snapshot().active_voice_count, 0);

        session.stop();
        assert!(!session.is_playing());
        assert_eq!(session.snapshot().active_voice_count, 0);
    }

    #[test]
    fn test_set_oscillator_count_live() {
        let mut session = ready_session();
        session.start().unwrap();

        session.set_oscillator_count(16);
        assert_eq!(session.snapshot().active_voice_count, 16);
        assert!(session.is_playing());

        session.set_oscillator_count(3);
        assert_eq!(session.snapshot().active_voice_count, 3);
    }

    #[test]
    fn test_set_oscillator_count_while_stopped_applies_at_start() {
        let mut session = ready_session();
        session.set_oscillator_count(5);
        session.start().unwrap();
        assert_eq!(session.snapshot().active_voice_count, 5);
    }

    #[test]
    fn test_tick_noop_before_start() {
        let mut session = ready_session();
        session.tick(1.0 / 60.0);
        session.safety_tick(1.0);
        assert_eq!(session.snapshot().breath_phase, 0.0);
    }

    #[test]
    fn test_tick_advances_breath_and_keeps_voices() {
        let mut session = ready_session();
        session.start().unwrap();

        for _ in 0..100 {
            session.tick(1.0 / 60.0);
            let snapshot = session.snapshot();
            assert_eq!(snapshot.active_voice_count, 8);
            assert!(snapshot.breath_phase >= 0.0);
            assert!(snapshot.breath_phase < std::f32::consts::TAU);
        }
        assert!(session.snapshot().breath_phase > 0.0);
    }

    #[test]
    fn test_duration_escalation_stops_session() {
        let policy = SafetyPolicy {
            duration_critical_mins: 1.0,
            ..Default::default()
        };
        let mut session = SessionOrchestrator::new(EngineConfig::default())
            .with_safety_policy(policy);
        session.initialize().unwrap();
        session.start().unwrap();

        session.safety_tick(61.0);
        assert!(!session.is_playing());
        assert_eq!(session.snapshot().active_voice_count, 0);
    }

    #[test]
    fn test_commands_delegate() {
        let mut session = ready_session();
        session.start().unwrap();

        session.set_polarity_balance(0.5);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.shadow_engine_state.polarity_balance, 0.5);
        assert!((snapshot.polarity_protocol.light_channel.amplitude - 0.75).abs() < 1e-6);

        let phase_before = snapshot.shadow_engine_state.current_phase;
        session.trigger_shadow_phase();
        assert_eq!(
            session.snapshot().shadow_engine_state.current_phase,
            phase_before.next()
        );

        session.toggle_layer(ScaleLayer::Cosmic);
        session.tick(1.0 / 60.0);
        assert!(session
            .snapshot()
            .current_geometry
            .iter()
            .all(|p| p.scale_level != ScaleLayer::Cosmic));
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut session = ready_session();
        session.start().unwrap();
        let snapshot = session.snapshot();

        session.tick(0.5);
        // Earlier snapshot is unaffected by later mutation
        assert_eq!(snapshot.breath_phase, 0.0);
        assert_ne!(session.snapshot().breath_phase, snapshot.breath_phase);
    }
}
