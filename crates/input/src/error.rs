//! Error types for key-chord synthesis.

use thiserror::Error;

/// Errors that can occur while synthesizing a key chord.
#[derive(Debug, Error)]
pub enum InputError {
    /// Accessibility permission not granted (macOS).
    #[error("accessibility permission not granted - open System Settings > Privacy & Security > Accessibility")]
    AccessibilityNotGranted,

    /// Failed to initialize the platform input backend.
    #[error("failed to initialize input backend: {0}")]
    InitFailed(String),

    /// Failed to simulate a key press or release.
    #[error("failed to simulate key: {0}")]
    KeyFailed(String),

    /// The chord description could not be parsed.
    #[error("invalid key chord: {0}")]
    InvalidChord(String),
}
