//! Scale layer hierarchy and breath-phase clock.
//!
//! Four nested scale layers (micro through cosmic) can be enabled
//! independently; the breath phase advances monotonically and wraps
//! modulo 2π, driving how generated geometry "breathes."

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;

/// Nested scale layers, smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleLayer {
    Micro,
    Meso,
    Macro,
    Cosmic,
}

impl ScaleLayer {
    /// All layers, smallest to largest.
    pub const ALL: [ScaleLayer; 4] = [
        ScaleLayer::Micro,
        ScaleLayer::Meso,
        ScaleLayer::Macro,
        ScaleLayer::Cosmic,
    ];

    /// Base radius of this layer within the normalized [-1, 1] cube.
    pub fn radius(&self) -> f32 {
        match self {
            ScaleLayer::Micro => 0.25,
            ScaleLayer::Meso => 0.5,
            ScaleLayer::Macro => 0.75,
            ScaleLayer::Cosmic => 1.0,
        }
    }

    /// Index of this layer within [`ScaleLayer::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ScaleLayer::Micro => 0,
            ScaleLayer::Meso => 1,
            ScaleLayer::Macro => 2,
            ScaleLayer::Cosmic => 3,
        }
    }
}

impl fmt::Display for ScaleLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleLayer::Micro => write!(f, "micro"),
            ScaleLayer::Meso => write!(f, "meso"),
            ScaleLayer::Macro => write!(f, "macro"),
            ScaleLayer::Cosmic => write!(f, "cosmic"),
        }
    }
}

/// Per-scale enabled flags plus the breath-phase clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerHierarchy {
    enabled: [bool; 4],

    /// Breath phase in [0, 2π), monotonically advancing, wraps modulo 2π
    breath_phase: f32,

    /// Phase advance rate in radians per second (slower = deeper states)
    breath_rate: f32,
}

impl LayerHierarchy {
    /// Create a hierarchy with all layers enabled and phase at zero.
    ///
    /// # Arguments
    /// * `breath_rate` - Phase advance rate in radians per second
    pub fn new(breath_rate: f32) -> Self {
        Self {
            enabled: [true; 4],
            breath_phase: 0.0,
            breath_rate,
        }
    }

    /// Advance the breath phase by `dt * rate`, wrapped modulo 2π.
    ///
    /// Negative or non-finite `dt` is treated as zero; the clock never
    /// reverses.
    pub fn update_breath_phase(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.breath_phase = (self.breath_phase + dt * self.breath_rate).rem_euclid(TAU);
    }

    /// Flip the enabled flag for a layer.
    ///
    /// Subsequent generation calls immediately reflect the change.
    pub fn toggle_layer(&mut self, layer: ScaleLayer) {
        self.enabled[layer.index()] = !self.enabled[layer.index()];
    }

    /// Check whether a layer is currently enabled.
    pub fn is_enabled(&self, layer: ScaleLayer) -> bool {
        self.enabled[layer.index()]
    }

    /// Layers currently enabled, smallest to largest.
    pub fn enabled_layers(&self) -> Vec<ScaleLayer> {
        ScaleLayer::ALL
            .iter()
            .copied()
            .filter(|l| self.enabled[l.index()])
            .collect()
    }

    /// Current breath phase in [0, 2π).
    pub fn breath_phase(&self) -> f32 {
        self.breath_phase
    }

    /// Current breath rate in radians per second.
    pub fn breath_rate(&self) -> f32 {
        self.breath_rate
    }
}
