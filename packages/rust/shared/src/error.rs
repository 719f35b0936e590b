//! Error types for briefwright.
//!
//! Library crates use [`BriefwrightError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only two kinds of failure propagate out of a content build: the outline
//! collaborator failing, and [`ThresholdFailure`] when a task that requires
//! rigorous sourcing cannot reach its minimum vetted-source count.

use std::path::PathBuf;

use crate::types::RoundTag;

/// Top-level error type for all briefwright operations.
#[derive(Debug, thiserror::Error)]
pub enum BriefwrightError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to a collaborator.
    #[error("network error: {0}")]
    Network(String),

    /// Response or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad prompt, empty outline, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// An external collaborator (outline generator) failed.
    #[error("collaborator error: {0}")]
    Collaborator(String),

    /// Not enough vetted sources after every harvest round.
    #[error(transparent)]
    Threshold(#[from] ThresholdFailure),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BriefwrightError>;

impl BriefwrightError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The threshold failure carried by this error, if any.
    pub fn as_threshold(&self) -> Option<&ThresholdFailure> {
        match self {
            Self::Threshold(failure) => Some(failure),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ThresholdFailure
// ---------------------------------------------------------------------------

/// Raised when a rigorous-sourcing task exhausts all harvest rounds below
/// its required vetted-source count. Must abort before any rendering work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "insufficient vetted sources: achieved {achieved} of {required} required after rounds {}",
    format_rounds(.rounds_completed)
)]
pub struct ThresholdFailure {
    /// Vetted sources collected before giving up.
    pub achieved: usize,
    /// Minimum the task demanded.
    pub required: usize,
    /// Every round that ran, in execution order.
    pub rounds_completed: Vec<RoundTag>,
}

fn format_rounds(rounds: &[RoundTag]) -> String {
    if rounds.is_empty() {
        return "(none)".to_string();
    }
    rounds
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
