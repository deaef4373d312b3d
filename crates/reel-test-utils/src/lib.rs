//! Testing utilities for the Reel Studio workspace
//!
//! Scripted and gated agent invokers plus result fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use reel_core::{AgentInvoker, AgentReply, StageOrchestrator, StudioConfig};
use reel_stages::{AgentId, StageId, StageRegistry};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Recorded agent call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub stage: Option<StageId>,
    pub agent: AgentId,
    pub prompt: String,
}

/// Replies from per-stage queues; an empty queue replies `{}`
#[derive(Debug)]
pub struct ScriptedInvoker {
    registry: StageRegistry,
    replies: Mutex<HashMap<StageId, VecDeque<AgentReply>>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for ScriptedInvoker {
    fn default() -> Self {
        Self::new(StageRegistry::with_defaults())
    }
}

impl ScriptedInvoker {
    pub fn new(registry: StageRegistry) -> Self {
        Self {
            registry,
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, stage: StageId, reply: AgentReply) -> Self {
        self.push(stage, reply);
        self
    }

    pub fn succeed(self, stage: StageId, result: Value) -> Self {
        self.reply(stage, AgentReply::success(result))
    }

    pub fn fail(self, stage: StageId, error: &str) -> Self {
        self.reply(stage, AgentReply::failure(error))
    }

    pub fn push(&self, stage: StageId, reply: AgentReply) {
        self.replies.lock().entry(stage).or_default().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn prompts_for(&self, stage: StageId) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.stage == Some(stage))
            .map(|c| c.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl AgentInvoker for ScriptedInvoker {
    async fn invoke(&self, prompt: &str, agent: &AgentId) -> AgentReply {
        let stage = self.registry.stage_for_agent(agent);
        self.calls.lock().push(Call {
            stage,
            agent: agent.clone(),
            prompt: prompt.to_string(),
        });
        stage
            .and_then(|s| self.replies.lock().get_mut(&s).and_then(VecDeque::pop_front))
            .unwrap_or_else(|| AgentReply::success(json!({})))
    }
}

/// A call held open until the test resolves it
#[derive(Debug)]
pub struct PendingCall {
    pub agent: AgentId,
    pub prompt: String,
    reply: oneshot::Sender<AgentReply>,
}

impl PendingCall {
    pub fn resolve(self, reply: AgentReply) {
        let _ = self.reply.send(reply);
    }
}

/// Invoker whose calls block until resolved through [`GateController`]
#[derive(Debug)]
pub struct GatedInvoker {
    calls: mpsc::UnboundedSender<PendingCall>,
}

/// Test side of a [`GatedInvoker`]
#[derive(Debug)]
pub struct GateController {
    calls: mpsc::UnboundedReceiver<PendingCall>,
}

impl GatedInvoker {
    pub fn new() -> (Self, GateController) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { calls: tx }, GateController { calls: rx })
    }
}

impl GateController {
    /// Next call made through the gate, in start order
    pub async fn next_call(&mut self) -> PendingCall {
        self.calls.recv().await.expect("gated invoker dropped")
    }
}

#[async_trait]
impl AgentInvoker for GatedInvoker {
    async fn invoke(&self, prompt: &str, agent: &AgentId) -> AgentReply {
        let (tx, rx) = oneshot::channel();
        let call = PendingCall {
            agent: agent.clone(),
            prompt: prompt.to_string(),
            reply: tx,
        };
        if self.calls.send(call).is_err() {
            return AgentReply::failure("gate closed");
        }
        rx.await
            .unwrap_or_else(|_| AgentReply::failure("gate dropped"))
    }
}

pub fn orchestrator(invoker: impl AgentInvoker + 'static) -> StageOrchestrator {
    StageOrchestrator::new(Arc::new(invoker))
}

pub fn orchestrator_with(
    config: &StudioConfig,
    invoker: impl AgentInvoker + 'static,
) -> StageOrchestrator {
    StageOrchestrator::from_config(config, Arc::new(invoker)).unwrap()
}

/// trendScout result with `n` briefs cycling through the brands
pub fn trend_output(n: usize) -> Value {
    let niches = ["newborns", "toddlers", "teenagers"];
    let briefs: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "trend_title": format!("trend-{i}"),
                "target_niche": niches[i % niches.len()],
                "brand_fit_score": 8.0,
            })
        })
        .collect();
    json!({"inspiration_briefs": briefs, "summary": "fixture", "research_date": "2026-01-05"})
}

/// hookLab result with the given number of hooks per brand
pub fn hook_output(newborns: usize, toddlers: usize, teenagers: usize) -> Value {
    let list = |prefix: &str, n: usize| -> Vec<Value> {
        (0..n)
            .map(|i| {
                json!({
                    "hook_text": format!("{prefix}-{i}"),
                    "compliance_risk": if i % 2 == 0 { "LOW" } else { "HIGH" },
                })
            })
            .collect()
    };
    json!({
        "hooks_by_brand": {
            "newborns": list("newborns", newborns),
            "toddlers": list("toddlers", toddlers),
            "teenagers": list("teenagers", teenagers),
        },
        "generation_stats": {"total_hooks": newborns + toddlers + teenagers},
    })
}

/// scriptEngine result with one script per brand key given
pub fn script_output(brands: &[&str]) -> Value {
    let scripts: Vec<Value> = brands
        .iter()
        .enumerate()
        .map(|(i, brand)| json!({"script_id": format!("s-{i}"), "brand": brand}))
        .collect();
    json!({"scripts": scripts, "total_scripts": brands.len()})
}

/// `hook_text` of each composed item
pub fn hook_texts(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| item["hook_text"].as_str().unwrap_or_default().to_string())
        .collect()
}
