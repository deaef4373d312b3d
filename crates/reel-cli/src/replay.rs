//! Offline agent invoker
//!
//! Answers every call with the seed dataset of the stage bound to the called
//! agent, so the full pipeline can run without network access.

use async_trait::async_trait;
use reel_core::{AgentInvoker, AgentReply};
use reel_stages::{seed_output, AgentId, StageId, StageRegistry};
use std::collections::BTreeSet;

/// Replays seed datasets; selected stages fail instead
#[derive(Debug, Clone)]
pub(crate) struct SeedReplayInvoker {
    registry: StageRegistry,
    failing: BTreeSet<StageId>,
}

impl SeedReplayInvoker {
    pub(crate) fn new(registry: StageRegistry) -> Self {
        Self {
            registry,
            failing: BTreeSet::new(),
        }
    }

    pub(crate) fn failing(mut self, stages: impl IntoIterator<Item = StageId>) -> Self {
        self.failing.extend(stages);
        self
    }
}

#[async_trait]
impl AgentInvoker for SeedReplayInvoker {
    async fn invoke(&self, prompt: &str, agent: &AgentId) -> AgentReply {
        let Some(stage) = self.registry.stage_for_agent(agent) else {
            tracing::warn!(%agent, "no stage bound to agent");
            return AgentReply::failure(format!("unknown agent {agent}"));
        };
        tracing::debug!(%stage, prompt_len = prompt.len(), "replaying seed result");

        if self.failing.contains(&stage) {
            AgentReply::failure(format!("{stage} failed (simulated)"))
        } else {
            AgentReply::success(seed_output(stage).clone())
        }
    }
}
