//! Reel Studio stage model
//!
//! Static and read-side building blocks for the production pipeline:
//! - [`StageRegistry`]: the seven stages, their upstream dependency and agent
//! - [`BrandScope`] and [`filter_by_brand`]: the cross-cutting brand filter
//! - [`StageOutput`]: typed, leniently decoded agent results
//! - [`effective_output`]: live result vs. seed dataset resolution
//!
//! # Example
//!
//! ```rust
//! use reel_stages::{effective_output, StageId, StageRegistry};
//!
//! let registry = StageRegistry::with_defaults();
//! assert_eq!(registry.upstream(StageId::ScriptEngine), Some(StageId::HookLab));
//!
//! // No live result yet: fallback mode serves the seed dataset
//! let seed = effective_output(StageId::TrendScout, None, true);
//! assert!(seed.is_some());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod brand;
pub mod error;
pub mod fallback;
pub mod lenient;
pub mod output;
pub mod seed;
pub mod stage;

// Re-exports
pub use brand::{filter_by_brand, Brand, BrandScope, Branded};
pub use error::StageError;
pub use fallback::effective_output;
pub use lenient::Lenient;
pub use output::{
    AbTest, AnalyticsReport, BatchSummary, Captions, DistributionPlan, DistributionSummary,
    FunnelAnalysis, FunnelMetrics, FunnelReport, GenerationStats, Hook, HookBatch, HooksByBrand,
    Kpis, Loser, Recommendations, RenderBatch, RenderJob, RenderSpecs, ScheduledPost, Script,
    ScriptBatch, StageOutput, TrendBrief, TrendReport, VoiceConfig, Winner,
};
pub use seed::seed_output;
pub use stage::{AgentId, Stage, StageId, StageRegistry};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with stages
    pub use crate::{
        effective_output, filter_by_brand, AgentId, Brand, BrandScope, Branded, Stage, StageId,
        StageOutput, StageRegistry,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
