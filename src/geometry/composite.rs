//! Composite geometry generation.
//!
//! Points are placed on a golden-angle spiral per scale layer and modulated
//! by the breath phase, so the shape is deterministic for a given phase but
//! visibly "breathes" as the phase advances. Points are ephemeral and
//! regenerated every render tick.

use crate::geometry::layers::{LayerHierarchy, ScaleLayer};
use serde::{Deserialize, Serialize};

/// Golden angle in radians, used for even angular distribution.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Fraction of layer radius the breath modulation swings through.
const BREATH_RADIAL_DEPTH: f32 = 0.2;

/// Vertical lift step per point index.
const AXIAL_STEP: f32 = 0.37;

/// A single generated point within the normalized [-1, 1]³ cube.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,

    /// Scale layer this point belongs to
    pub scale_level: ScaleLayer,

    /// Index of this point within the generated set
    pub index: usize,
}

impl GeometryPoint {
    /// Radial distance from the origin.
    pub fn radial_distance(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Generates normalized 3D point sets across nested scale layers and
/// advances the breath-phase clock that drives their evolution.
#[derive(Debug, Clone)]
pub struct GeometryLayerManager {
    hierarchy: LayerHierarchy,
}

impl GeometryLayerManager {
    /// Create a manager with all layers enabled.
    ///
    /// # Arguments
    /// * `breath_rate` - Breath-phase advance rate in radians per second
    pub fn new(breath_rate: f32) -> Self {
        Self {
            hierarchy: LayerHierarchy::new(breath_rate),
        }
    }

    /// Generate a composite point set of size `count`, distributed only
    /// across currently-enabled scale layers.
    ///
    /// `count = 0` yields an empty set. If no layers are enabled, points
    /// collapse onto the micro layer so the requested cardinality is
    /// always honored.
    pub fn generate_composite_geometry(&self, count: usize) -> Vec<GeometryPoint> {
        let layers = self.hierarchy.enabled_layers();
        let phase = self.hierarchy.breath_phase();

        let mut points = Vec::with_capacity(count);
        for index in 0..count {
            let layer = if layers.is_empty() {
                ScaleLayer::Micro
            } else {
                layers[index % layers.len()]
            };
            points.push(self.place_point(index, layer, phase));
        }
        points
    }

    /// Place a single point on its layer's breathing spiral.
    fn place_point(&self, index: usize, layer: ScaleLayer, phase: f32) -> GeometryPoint {
        let i = index as f32;

        // Radius expands and contracts with the breath phase
        let radius = layer.radius() * (1.0 + BREATH_RADIAL_DEPTH * phase.sin());

        // Golden-angle spiral, slowly rotated by the breath phase
        let theta = i * GOLDEN_ANGLE + phase * 0.25;

        let x = (radius * theta.cos()).clamp(-1.0, 1.0);
        let y = (radius * theta.sin()).clamp(-1.0, 1.0);
        let z = (radius * (i * AXIAL_STEP + phase).sin()).clamp(-1.0, 1.0);

        GeometryPoint {
            x,
            y,
            z,
            scale_level: layer,
            index,
        }
    }

    /// Advance the breath phase by `dt * rate`, wrapped modulo 2π.
    pub fn update_breath_phase(&mut self, dt: f32) {
        self.hierarchy.update_breath_phase(dt);
    }

    /// Flip a layer's enabled flag; the next generation call reflects it.
    pub fn toggle_layer(&mut self, layer: ScaleLayer) {
        self.hierarchy.toggle_layer(layer);
    }

    /// Current breath phase in [0, 2π).
    pub fn breath_phase(&self) -> f32 {
        self.hierarchy.breath_phase()
    }

    /// Read access to the layer hierarchy.
    pub fn hierarchy(&self) -> &LayerHierarchy {
        &self.hierarchy
    }
}
