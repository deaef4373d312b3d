//! Pipeline events
//!
//! Published on a `tokio::sync::broadcast` channel for every lifecycle change.
//! Subscribers that fall behind lose the oldest events; the orchestrator never
//! waits on them.

use crate::types::InvocationId;
use reel_stages::{AgentId, BrandScope, StageId};
use serde::Serialize;

/// Default broadcast buffer size
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Largest broadcast buffer the orchestrator will allocate
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// Status banner severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral progress
    Info,
    /// Completed work
    Success,
    /// Failed work
    Error,
}

/// A lifecycle change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PipelineEvent {
    /// Invocation started
    Started {
        /// Stage invoked
        stage: StageId,
        /// Agent called
        agent: AgentId,
        /// Invocation id
        invocation: InvocationId,
    },
    /// Invocation succeeded and its result was applied
    Completed {
        /// Stage invoked
        stage: StageId,
        /// Invocation id
        invocation: InvocationId,
    },
    /// Invocation failed and the failure was applied
    Failed {
        /// Stage invoked
        stage: StageId,
        /// Invocation id
        invocation: InvocationId,
        /// Failure text
        error: String,
    },
    /// Completion arrived after a newer invocation started and was dropped
    Discarded {
        /// Stage invoked
        stage: StageId,
        /// Invocation id of the dropped completion
        invocation: InvocationId,
    },
    /// Active brand scope changed
    ScopeChanged {
        /// New scope
        scope: BrandScope,
    },
    /// Sample mode toggled
    FallbackModeChanged {
        /// New setting
        enabled: bool,
    },
}

impl PipelineEvent {
    /// Banner severity
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Completed { .. } => Severity::Success,
            Self::Failed { .. } => Severity::Error,
            Self::Started { .. }
            | Self::Discarded { .. }
            | Self::ScopeChanged { .. }
            | Self::FallbackModeChanged { .. } => Severity::Info,
        }
    }

    /// Banner text
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Started { stage, .. } => format!("Running {stage}..."),
            Self::Completed { stage, .. } => format!("{stage} completed successfully"),
            Self::Failed { error, .. } => error.clone(),
            Self::Discarded { stage, invocation } => {
                format!("Discarded stale {stage} result {invocation}")
            }
            Self::ScopeChanged { scope } => format!("Brand scope set to {scope}"),
            Self::FallbackModeChanged { enabled: true } => "Sample data enabled".to_string(),
            Self::FallbackModeChanged { enabled: false } => "Sample data disabled".to_string(),
        }
    }

    /// Stage the event concerns, if any
    #[must_use]
    pub fn stage(&self) -> Option<StageId> {
        match self {
            Self::Started { stage, .. }
            | Self::Completed { stage, .. }
            | Self::Failed { stage, .. }
            | Self::Discarded { stage, .. } => Some(*stage),
            Self::ScopeChanged { .. } | Self::FallbackModeChanged { .. } => None,
        }
    }
}
