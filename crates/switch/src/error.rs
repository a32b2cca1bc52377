//! Error types for switching strategies.

use crate::config::StrategyKind;
use inputshift_input::InputError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for switching operations.
pub type SwitchResult<T> = Result<T, SwitchError>;

/// Errors that can occur while querying or changing the input source.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// A required external tool or helper is not installed.
    #[error("{what} not found - {guidance}")]
    Unavailable { what: String, guidance: String },

    /// The tool or helper ran but reported failure or produced output we
    /// could not understand.
    #[error("switch failed: {0}")]
    Execution(String),

    /// No strategy of this kind exists for the running platform.
    #[error("{kind} switching is not supported on {platform}")]
    UnsupportedPlatform {
        kind: StrategyKind,
        platform: &'static str,
    },

    /// The process could not be started at all.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Synthesizing the toggle shortcut failed.
    #[error(transparent)]
    Chord(#[from] InputError),
}

impl SwitchError {
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, SwitchError::UnsupportedPlatform { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SwitchError::Unavailable { .. })
    }
}
