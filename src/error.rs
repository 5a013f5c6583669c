//! Error handling for the GAA engine.
//!
//! The error surface is deliberately small: mid-stream faults in a real-time
//! sensory system are worse than silent correction, so invalid numeric
//! parameters are clamped rather than raised, safety breaches are modeled as
//! graded alerts, and teardown is always idempotent. Only lifecycle failures
//! (audio sink acquisition, start-before-initialize) surface as errors.

use thiserror::Error;

/// Result type alias for GAA engine operations
pub type Result<T> = std::result::Result<T, GaaError>;

/// Main error type for GAA engine operations
#[derive(Error, Debug)]
pub enum GaaError {
    /// Audio output acquisition failed during `initialize()`.
    ///
    /// The engine remains uninitialized; retrying is allowed and safe.
    #[error("Initialization failed: {reason}")]
    InitializationFailed { reason: String },

    /// A lifecycle operation was requested before `initialize()` succeeded.
    #[error("Engine not initialized: {operation} requires a successful initialize()")]
    NotInitialized { operation: &'static str },

    /// State snapshot or protocol serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GaaError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            GaaError::InitializationFailed { .. } => "INITIALIZATION_FAILED",
            GaaError::NotInitialized { .. } => "NOT_INITIALIZED",
            GaaError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Initialization may be retried once the audio output is granted
            GaaError::InitializationFailed { .. } => true,
            GaaError::NotInitialized { .. } => true,
            GaaError::Serialization(_) => false,
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            GaaError::InitializationFailed { .. } => vec![
                "Check that an audio output device is available",
                "The user may need to grant audio permission",
                "Call initialize() again once output is available",
            ],
            GaaError::NotInitialized { .. } => vec![
                "Call initialize() before start()",
                "Check the result of the previous initialize() call",
            ],
            _ => vec![],
        }
    }
}
