//! Audio Output Module
//!
//! Boundary interface to the external audio collaborator:
//! - Voice create/update/stop and master gain control
//! - Headless null sink for tests and silent operation

pub mod sink;

pub use sink::{AudioSink, DeniedAudioSink, NullAudioSink, VoiceId, VoiceParams};
