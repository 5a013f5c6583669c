//! Immutable session state snapshot.
//!
//! External consumers (UI, telemetry) never receive live references into
//! the engine; they poll or observe snapshots built from copies of the
//! current state.

use crate::biofeedback::BiofeedbackMetrics;
use crate::geometry::GeometryPoint;
use crate::shadow::{PolarityProtocol, ShadowEngineState};
use serde::{Deserialize, Serialize};

/// Read-only view of a session at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub is_initialized: bool,
    pub is_playing: bool,

    /// Geometry generated by the most recent render tick
    pub current_geometry: Vec<GeometryPoint>,

    pub active_voice_count: usize,

    /// Breath phase in [0, 2π)
    pub breath_phase: f32,

    pub shadow_engine_state: ShadowEngineState,
    pub polarity_protocol: PolarityProtocol,

    /// Latest biofeedback sample, if any has been taken
    pub biofeedback_metrics: Option<BiofeedbackMetrics>,

    /// Session id assigned at initialize()
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = SessionSnapshot {
            is_initialized: true,
            is_playing: false,
            current_geometry: Vec::new(),
            active_voice_count: 0,
            breath_phase: 1.25,
            shadow_engine_state: ShadowEngineState::default(),
            polarity_protocol: PolarityProtocol::default(),
            biofeedback_metrics: None,
            session_id: Some("test-session".to_string()),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert!(restored.is_initialized);
        assert_eq!(restored.breath_phase, 1.25);
    }
}
