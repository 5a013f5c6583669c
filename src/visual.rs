//! Visual renderer boundary.
//!
//! The engine computes brightness/contrast/flash-rate directives and
//! corrective attenuation; an external renderer draws them. Like the audio
//! sink, renderers are injected explicitly.

use serde::{Deserialize, Serialize};

/// Directives handed to the external visual renderer each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualDirectives {
    /// Target brightness in [0, 1]
    pub brightness: f32,

    /// Target contrast in [0, 1]
    pub contrast: f32,

    /// Flash rate in Hz
    pub flash_rate: f32,
}

impl Default for VisualDirectives {
    fn default() -> Self {
        Self {
            brightness: 0.5,
            contrast: 0.5,
            flash_rate: 0.0,
        }
    }
}

impl VisualDirectives {
    /// Clamp all fields to their valid ranges; non-finite values collapse
    /// to the lower bound.
    pub fn sanitized(mut self) -> Self {
        self.brightness = sanitize_unit(self.brightness);
        self.contrast = sanitize_unit(self.contrast);
        self.flash_rate = if self.flash_rate.is_finite() {
            self.flash_rate.max(0.0)
        } else {
            0.0
        };
        self
    }
}

fn sanitize_unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Visual renderer exposed by the external presentation collaborator.
pub trait VisualRenderer: Send {
    /// Apply new directives for the current frame.
    fn apply(&mut self, directives: &VisualDirectives);

    /// Apply a multiplicative corrective attenuation from the safety
    /// monitor (1.0 = no attenuation).
    fn apply_attenuation(&mut self, factor: f32);
}

/// Renderer that discards all directives, for headless operation.
#[derive(Debug, Default, Clone)]
pub struct NullRenderer;

impl VisualRenderer for NullRenderer {
    fn apply(&mut self, _directives: &VisualDirectives) {}

    fn apply_attenuation(&mut self, _factor: f32) {}
}
