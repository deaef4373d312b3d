//! Stage identifiers and the static stage registry
//!
//! The pipeline has a fixed set of seven stages. Five form a dependency chain
//! (trendScout → hookLab → scriptEngine → production → distribution); analytics
//! and funnelOptimizer stand alone.

use crate::error::StageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of one pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageId {
    /// Trend research, produces inspiration briefs
    TrendScout,
    /// Hook generation per brand
    HookLab,
    /// Script writing from approved hooks
    ScriptEngine,
    /// Render job specification
    Production,
    /// Posting schedule
    Distribution,
    /// Performance analytics
    Analytics,
    /// Quiz funnel optimization
    FunnelOptimizer,
}

impl StageId {
    /// All stages in pipeline order
    pub const ALL: [StageId; 7] = [
        StageId::TrendScout,
        StageId::HookLab,
        StageId::ScriptEngine,
        StageId::Production,
        StageId::Distribution,
        StageId::Analytics,
        StageId::FunnelOptimizer,
    ];

    /// Wire identifier (`trendScout`, `hookLab`, ...)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StageId::TrendScout => "trendScout",
            StageId::HookLab => "hookLab",
            StageId::ScriptEngine => "scriptEngine",
            StageId::Production => "production",
            StageId::Distribution => "distribution",
            StageId::Analytics => "analytics",
            StageId::FunnelOptimizer => "funnelOptimizer",
        }
    }

    /// Human readable name
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            StageId::TrendScout => "Trend Scout",
            StageId::HookLab => "Hook Lab",
            StageId::ScriptEngine => "Script Engine",
            StageId::Production => "Production",
            StageId::Distribution => "Distribution",
            StageId::Analytics => "Analytics",
            StageId::FunnelOptimizer => "Funnel Optimizer",
        }
    }

    /// Title of the dashboard section this stage feeds
    #[must_use]
    pub const fn section_title(&self) -> &'static str {
        match self {
            StageId::TrendScout => "Command Center",
            StageId::HookLab => "Hook Bank",
            StageId::ScriptEngine => "Script Queue",
            StageId::Production => "Render Pipeline",
            StageId::Distribution => "Distribution Calendar",
            StageId::Analytics => "Analytics Dashboard",
            StageId::FunnelOptimizer => "Funnel Lab",
        }
    }

    /// Label of the action that invokes this stage
    #[must_use]
    pub const fn action_label(&self) -> &'static str {
        match self {
            StageId::TrendScout => "Run Trend Scout",
            StageId::HookLab => "Generate Hooks",
            StageId::ScriptEngine => "Generate Scripts",
            StageId::Production => "Render Batch",
            StageId::Distribution => "Queue Distribution",
            StageId::Analytics => "Run Analytics",
            StageId::FunnelOptimizer => "Optimize Funnels",
        }
    }

    /// Zero-based position in [`StageId::ALL`]
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = StageError;

    /// Accepts the wire identifier in any case, with or without `_`/`-`
    /// separators (`hookLab`, `hook_lab`, `HOOK-LAB`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| *c != '_' && *c != '-').collect();

        StageId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| StageError::UnknownStage(s.to_string()))
    }
}

/// Reference to the external agent bound to a stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create a new agent reference
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Immutable stage descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Stage identifier
    pub id: StageId,
    /// Stage whose effective output feeds this one
    pub depends_on: Option<StageId>,
    /// Agent invoked for this stage
    pub agent: AgentId,
}

/// Static metadata for all seven stages
///
/// Indexed by [`StageId::index`]; one entry per stage, always.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRegistry {
    stages: Vec<Stage>,
}

impl StageRegistry {
    /// Registry bound to the production agent deployment
    #[must_use]
    pub fn with_defaults() -> Self {
        let agent = |id: StageId| -> AgentId {
            AgentId::new(match id {
                StageId::TrendScout => "699da78a1ff1ae52f0fc4836",
                StageId::HookLab => "699da7ee1581246eff69d3df",
                StageId::ScriptEngine => "699da7efc9d1ec5e71789904",
                StageId::Production => "699da7ef4d9b8b973a73e422",
                StageId::Distribution => "699da7ef1581246eff69d3e1",
                StageId::Analytics => "699da7f0c9d1ec5e71789906",
                StageId::FunnelOptimizer => "699da7f07c54a9ee105c172e",
            })
        };

        let stages = StageId::ALL
            .into_iter()
            .map(|id| Stage {
                id,
                depends_on: Self::dependency_of(id),
                agent: agent(id),
            })
            .collect();

        Self { stages }
    }

    fn dependency_of(id: StageId) -> Option<StageId> {
        match id {
            StageId::HookLab => Some(StageId::TrendScout),
            StageId::ScriptEngine => Some(StageId::HookLab),
            StageId::Production => Some(StageId::ScriptEngine),
            StageId::Distribution => Some(StageId::Production),
            StageId::TrendScout | StageId::Analytics | StageId::FunnelOptimizer => None,
        }
    }

    /// Rebind a stage to a different agent
    pub fn set_agent(&mut self, id: StageId, agent: AgentId) {
        self.stages[id.index()].agent = agent;
    }

    /// With a stage rebound to a different agent
    #[must_use]
    pub fn with_agent(mut self, id: StageId, agent: AgentId) -> Self {
        self.set_agent(id, agent);
        self
    }

    /// Get stage descriptor
    #[inline]
    #[must_use]
    pub fn get(&self, id: StageId) -> &Stage {
        &self.stages[id.index()]
    }

    /// Agent bound to a stage
    #[inline]
    #[must_use]
    pub fn agent(&self, id: StageId) -> &AgentId {
        &self.get(id).agent
    }

    /// Upstream stage, if any
    #[inline]
    #[must_use]
    pub fn upstream(&self, id: StageId) -> Option<StageId> {
        self.get(id).depends_on
    }

    /// Stage that consumes this stage's output, if any
    #[must_use]
    pub fn downstream(&self, id: StageId) -> Option<StageId> {
        self.stages
            .iter()
            .find(|s| s.depends_on == Some(id))
            .map(|s| s.id)
    }

    /// `id` followed by every stage downstream of it, in dependency order
    #[must_use]
    pub fn chain_from(&self, id: StageId) -> Vec<StageId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(next) = self.downstream(current) {
            chain.push(next);
            current = next;
        }
        chain
    }

    /// Find the stage bound to an agent
    #[must_use]
    pub fn stage_for_agent(&self, agent: &AgentId) -> Option<StageId> {
        self.stages.iter().find(|s| &s.agent == agent).map(|s| s.id)
    }

    /// Iterate stages in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    /// Number of stages (always seven)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
