//! GAA Core - Geometrically-Aligned Audio synthesis engine
//!
//! Real-time synthesis driven by procedural geometry rather than fixed
//! waveforms, paired with an independent safety-envelope monitor.
//!
//! # Architecture
//!
//! Five components, composed by the session orchestrator:
//! - `geometry`: nested scale layers and the breath-phase clock
//! - `voice`: geometry-to-oscillator mapping over a fixed slot arena
//! - `shadow`: dual light/dark polarity protocol and the four-phase cycle
//! - `safety`: threshold monitor with graded alerts and corrections
//! - `session`: lifecycle, per-tick pipelines, and external snapshots
//!
//! The engine never touches hardware directly; audio output, visual
//! rendering, and biosignal input arrive through injected traits
//! (`audio::AudioSink`, `visual::VisualRenderer`,
//! `biofeedback::BiofeedbackSource`). Two independent scheduling domains
//! drive it: a render-rate loop for geometry and voices, and a safety-rate
//! loop for threshold enforcement.

pub mod audio;
pub mod biofeedback;
pub mod config;
pub mod error;
pub mod geometry;
pub mod safety;
pub mod session;
pub mod shadow;
pub mod visual;
pub mod voice;

pub use config::EngineConfig;
pub use error::{GaaError, Result};
pub use session::{SessionOrchestrator, SessionRunner, SessionSnapshot};
