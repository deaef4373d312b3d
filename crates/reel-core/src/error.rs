//! Error types for Reel Core
//!
//! Agent failures are not errors at this level: they are recorded on the
//! failing stage's run and never propagated. The types here cover:
//! - Configuration loading
//! - Stage lifecycle transitions
//! - View rendering faults

use crate::types::StageStatus;
use reel_stages::StageError;
use std::path::PathBuf;

/// Main studio error type
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unknown stage or scope name
    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    /// Illegal lifecycle transition
    #[error("transition error: {0}")]
    Transition(#[from] TransitionError),

    /// View could not be rendered
    #[error("view error: {0}")]
    View(#[from] ViewError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::StudioConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Agent override names a stage that does not exist
    #[error("agent override for unknown stage: {0}")]
    UnknownStage(String),

    /// Environment override has an unusable value
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Value found
        value: String,
    },
}

/// Stage run lifecycle violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition not permitted by the lifecycle
    #[error("illegal transition: {from:?} -> {to:?}")]
    Illegal {
        /// Current status
        from: StageStatus,
        /// Requested status
        to: StageStatus,
    },
}

/// Failure reported by an agent invocation
///
/// Stored as text on exactly one stage run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvocationError {
    /// Human-readable failure text
    pub message: String,
}

impl InvocationError {
    /// Message used when the collaborator supplies none
    pub const DEFAULT_MESSAGE: &'static str = "Agent call failed";

    /// Wrap a failure message; an empty message becomes [`Self::DEFAULT_MESSAGE`]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            Self {
                message: Self::DEFAULT_MESSAGE.to_string(),
            }
        } else {
            Self { message }
        }
    }
}

/// Fault raised while rendering a view
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RenderFault {
    /// Fault description
    pub message: String,
}

impl RenderFault {
    /// Create a render fault
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`crate::ViewBoundary`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The render closure failed; the boundary is now latched
    #[error("render fault: {0}")]
    Fault(#[from] RenderFault),

    /// The boundary is latched from an earlier fault
    #[error("view faulted ({0}); reset to retry")]
    Faulted(RenderFault),
}

/// Result type for studio operations
pub type StudioResult<T> = Result<T, StudioError>;
