//! Audio output sink boundary.
//!
//! The engine never talks to audio hardware directly. It drives an
//! [`AudioSink`] implementation supplied by the host: a platform adapter in
//! production, [`NullAudioSink`] when running headless, or a recording fake
//! in tests. Sinks are constructed and injected explicitly; there is no
//! ambient global output.

use crate::error::{GaaError, Result};
use serde::{Deserialize, Serialize};

/// Identifier for a voice slot. Voices are referenced by id only and are
/// never aliased across the boundary.
pub type VoiceId = u32;

/// Synthesis parameters for one voice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceParams {
    /// Frequency in Hz, always finite and positive
    pub frequency: f32,

    /// Amplitude in [0, gain_level]
    pub amplitude: f32,

    /// Stereo pan in [-1, 1]
    pub pan: f32,
}

/// Audio output sink exposed by the external audio collaborator.
///
/// `update_voice` must re-map parameters on the existing slot using the
/// given ramp time, never retriggering the voice.
pub trait AudioSink: Send {
    /// Acquire the underlying output context.
    ///
    /// Called once during session `initialize()`; this is the only point
    /// where audio setup may fail (e.g. output permission denied). The
    /// default implementation always succeeds.
    fn acquire(&mut self) -> Result<()> {
        Ok(())
    }

    /// Start audible output for a new voice.
    fn start_voice(&mut self, id: VoiceId, params: VoiceParams);

    /// Ramp an existing voice to new parameters over `ramp_ms` milliseconds.
    fn update_voice(&mut self, id: VoiceId, params: VoiceParams, ramp_ms: f32);

    /// Ramp a voice to silence and release its slot.
    fn stop_voice(&mut self, id: VoiceId, ramp_ms: f32);

    /// Set the global output gain in [0, 1].
    fn set_master_gain(&mut self, gain: f32);

    /// Release the output context. Must be idempotent.
    fn release(&mut self) {}
}

/// Sink that accepts every call and produces no output.
///
/// Used for headless sessions and as the default before a host adapter is
/// injected.
#[derive(Debug, Default, Clone)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn start_voice(&mut self, _id: VoiceId, _params: VoiceParams) {}

    fn update_voice(&mut self, _id: VoiceId, _params: VoiceParams, _ramp_ms: f32) {}

    fn stop_voice(&mut self, _id: VoiceId, _ramp_ms: f32) {}

    fn set_master_gain(&mut self, _gain: f32) {}
}

/// Sink that always fails acquisition, for exercising initialization
/// failure paths.
#[derive(Debug, Default, Clone)]
pub struct DeniedAudioSink;

impl AudioSink for DeniedAudioSink {
    fn acquire(&mut self) -> Result<()> {
        Err(GaaError::InitializationFailed {
            reason: "audio output denied".to_string(),
        })
    }

    fn start_voice(&mut self, _id: VoiceId, _params: VoiceParams) {}

    fn update_voice(&mut self, _id: VoiceId, _params: VoiceParams, _ramp_ms: f32) {}

    fn stop_voice(&mut self, _id: VoiceId, _ramp_ms: f32) {}

    fn set_master_gain(&mut self, _gain: f32) {}
}
