//! Geometry Layer Module
//!
//! Procedural geometry generation across nested scale layers:
//! - Layer hierarchy with per-scale enabled flags
//! - Breath-phase clock driving geometry evolution
//! - Composite point-set generation

pub mod composite;
pub mod layers;

pub use composite::{GeometryLayerManager, GeometryPoint};
pub use layers::{LayerHierarchy, ScaleLayer};
