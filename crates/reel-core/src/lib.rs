//! Reel Core - pipeline orchestration
//!
//! Runs the seven-stage production pipeline against external agents:
//! - [`StageOrchestrator`]: invocations, approvals, brand scope, sample mode
//! - [`InputComposer`]: stage requests from upstream effective output
//! - [`ApprovalLedger`]: human approve/reject decisions on hooks
//! - [`PipelineProgress`] and [`views`]: read-side projections
//! - [`ViewBoundary`]: latching fault boundary for renderers
//!
//! # Example
//!
//! ```rust,ignore
//! use reel_core::{StageOrchestrator, StudioConfig};
//! use reel_stages::StageId;
//! use std::sync::Arc;
//!
//! # async fn example(invoker: Arc<dyn reel_core::AgentInvoker>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = StudioConfig::load("reel.toml")?.apply_env()?;
//! let orchestrator = StageOrchestrator::from_config(&config, invoker)?;
//!
//! let runs = orchestrator.invoke_chain(StageId::TrendScout).await;
//! println!("{} stages ran, {} posts", runs.len(), orchestrator.progress().posts);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod boundary;
pub mod compose;
pub mod config;
pub mod error;
pub mod events;
pub mod invoker;
pub mod ledger;
pub mod orchestrator;
pub mod progress;
pub mod transitions;
pub mod types;
pub mod views;

// Re-exports for convenience
pub use boundary::ViewBoundary;
pub use compose::{hook_concatenation, ComposedInput, InputComposer};
pub use config::StudioConfig;
pub use error::{
    ConfigError, InvocationError, RenderFault, StudioError, StudioResult, TransitionError,
    ViewError,
};
pub use events::{PipelineEvent, Severity};
pub use invoker::{AgentInvoker, AgentReply};
pub use ledger::{item_key, ApprovalCounts, ApprovalLedger, ApprovalStatus};
pub use orchestrator::StageOrchestrator;
pub use progress::{brand_breakdown, BrandTally, PipelineProgress};
pub use transitions::{allowed_transitions, validate_transition};
pub use types::{InvocationId, PipelineSnapshot, StageRun, StageStatus, StudioState};
pub use views::{HookFilter, SectionView};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Reel Core
    pub use crate::{
        AgentInvoker, AgentReply, ApprovalStatus, PipelineEvent, StageOrchestrator, StageRun,
        StageStatus, StudioConfig, StudioState,
    };
    pub use reel_stages::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
