//! Error types.
//!
//! Start failures are surfaced to the user; persistence failures are logged
//! and the session keeps running on its in-memory state.

use std::io;

use thiserror::Error;

/// Errors that prevent a counting session from starting.
///
/// The `Display` text is meant to be shown to the user as is.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("motion sensor is not available on this device")]
    SensorUnavailable,

    #[error("motion sensor access was denied; enable motion access in the device settings")]
    PermissionDenied,
}

/// Persistence failures. Never fatal to a running session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("storage serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage rejected write to {key}: {reason}")]
    Rejected { key: String, reason: String },
}
