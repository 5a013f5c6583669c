//! Safety Envelope Module
//!
//! Independent monitor bounding sensory exposure and session length:
//! - Fixed policy thresholds for audio, visual, breathing, and duration
//! - Graded alerts with dedupe and a capped log
//! - Observer registry with explicit unsubscribe handles
//! - Corrective attenuation factors for the orchestrator to apply

pub mod monitor;
pub mod policy;

pub use monitor::{
    AlertAction, AlertCategory, AlertType, SafetyAlert, SafetyCorrections, SafetyLevel,
    SafetyMetrics, SafetyMonitor, SubscriptionId,
};
pub use policy::SafetyPolicy;
