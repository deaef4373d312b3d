//! Stage orchestrator
//!
//! Owns the pipeline snapshot, the approval ledger, the brand scope and the
//! sample-mode flag. All mutation goes through its commands; reads return
//! owned copies.
//!
//! # Concurrency
//!
//! State sits behind one `parking_lot::Mutex` that is only held for short,
//! synchronous sections and never across the agent call. Invocations of
//! different stages, or overlapping invocations of the same stage, may be
//! outstanding at once. Completions apply in the order they resolve, so by
//! default the last invocation to resolve owns the stage's run. With
//! `reject_stale_completions` on, only the most recently started invocation
//! of a stage may settle it.

use crate::compose::{ComposedInput, InputComposer};
use crate::config::StudioConfig;
use crate::error::{ConfigError, InvocationError};
use crate::events::{PipelineEvent, MAX_EVENT_CAPACITY};
use crate::invoker::AgentInvoker;
use crate::ledger::ApprovalStatus;
use crate::progress::PipelineProgress;
use crate::types::{InvocationId, PipelineSnapshot, StageRun, StageStatus, StudioState};
use chrono::Utc;
use parking_lot::Mutex;
use reel_stages::{AgentId, BrandScope, StageId, StageRegistry};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Mutable state guarded by the orchestrator lock
#[derive(Debug, Default)]
struct Inner {
    studio: StudioState,
    next_invocation: u64,
    /// Latest invocation started per stage
    latest: [Option<InvocationId>; 7],
    /// Outstanding invocations, in start order
    outstanding: BTreeMap<InvocationId, StageId>,
}

impl Inner {
    fn start(&mut self, stage: StageId) -> InvocationId {
        self.next_invocation += 1;
        let invocation = InvocationId(self.next_invocation);
        self.latest[stage.index()] = Some(invocation);
        self.outstanding.insert(invocation, stage);
        invocation
    }

    fn is_latest(&self, stage: StageId, invocation: InvocationId) -> bool {
        self.latest[stage.index()] == Some(invocation)
    }
}

/// Clears an outstanding invocation whose future is dropped before it settles
///
/// The stage's run stays `Running` until a later invocation settles it.
struct Outstanding<'a> {
    state: &'a Mutex<Inner>,
    stage: StageId,
    invocation: InvocationId,
    settled: bool,
}

impl Drop for Outstanding<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.state.lock().outstanding.remove(&self.invocation);
            tracing::debug!(
                stage = %self.stage,
                invocation = %self.invocation,
                "invocation dropped before completion"
            );
        }
    }
}

/// Drives stage invocations and holds all pipeline state
pub struct StageOrchestrator {
    registry: StageRegistry,
    composer: InputComposer,
    invoker: Arc<dyn AgentInvoker>,
    reject_stale: bool,
    state: Mutex<Inner>,
    events: broadcast::Sender<PipelineEvent>,
}

impl std::fmt::Debug for StageOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageOrchestrator")
            .field("registry", &self.registry)
            .field("composer", &self.composer)
            .field("reject_stale", &self.reject_stale)
            .finish_non_exhaustive()
    }
}

impl StageOrchestrator {
    /// Create an orchestrator with the default registry and configuration
    #[must_use]
    pub fn new(invoker: Arc<dyn AgentInvoker>) -> Self {
        Self::with_registry(StageRegistry::with_defaults(), &StudioConfig::default(), invoker)
    }

    /// Create an orchestrator from configuration
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownStage`] if an agent override names an
    /// unknown stage.
    pub fn from_config(
        config: &StudioConfig,
        invoker: Arc<dyn AgentInvoker>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::with_registry(config.registry()?, config, invoker))
    }

    /// Create with an explicit registry
    #[must_use]
    pub fn with_registry(
        registry: StageRegistry,
        config: &StudioConfig,
        invoker: Arc<dyn AgentInvoker>,
    ) -> Self {
        let (events, _) =
            broadcast::channel(config.event_capacity.clamp(1, MAX_EVENT_CAPACITY));
        let studio = StudioState {
            scope: config.initial_scope,
            fallback_enabled: config.fallback_enabled,
            ..StudioState::default()
        };
        Self {
            registry,
            composer: InputComposer::new(config.script_fallback_limit),
            invoker,
            reject_stale: config.reject_stale_completions,
            state: Mutex::new(Inner {
                studio,
                ..Inner::default()
            }),
            events,
        }
    }

    /// Stage registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Subscribe to lifecycle events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: PipelineEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    /// Invoke a stage
    ///
    /// Always allowed, including while an earlier invocation of the same
    /// stage is outstanding. Returns the stage's run as left by this
    /// invocation's completion. Agent failures are recorded on the run, not
    /// returned.
    pub async fn invoke(&self, stage: StageId) -> StageRun {
        let agent = self.registry.agent(stage).clone();

        let (invocation, input) = {
            let mut inner = self.state.lock();
            let input = self.compose_locked(&inner.studio, stage);
            if let Err(err) = inner.studio.snapshot.run_mut(stage).begin() {
                tracing::error!(%stage, %err, "unexpected lifecycle state on invoke");
            }
            (inner.start(stage), input)
        };

        let mut pending = Outstanding {
            state: &self.state,
            stage,
            invocation,
            settled: false,
        };

        tracing::info!(%stage, %agent, %invocation, "invoking stage");
        self.publish(PipelineEvent::Started {
            stage,
            agent: agent.clone(),
            invocation,
        });

        let outcome = self.invoker.invoke(&input.prompt, &agent).await.into_result();
        pending.settled = true;
        self.settle(stage, invocation, outcome)
    }

    fn settle(
        &self,
        stage: StageId,
        invocation: InvocationId,
        outcome: Result<Value, InvocationError>,
    ) -> StageRun {
        let (run, event) = {
            let mut inner = self.state.lock();
            inner.outstanding.remove(&invocation);

            if self.reject_stale && !inner.is_latest(stage, invocation) {
                tracing::debug!(%stage, %invocation, "discarding stale completion");
                let run = inner.studio.snapshot.run(stage).clone();
                (run, PipelineEvent::Discarded { stage, invocation })
            } else {
                let run = inner.studio.snapshot.run_mut(stage);
                let event = match outcome {
                    Ok(data) => {
                        if let Err(err) = run.succeed(data, Utc::now()) {
                            tracing::error!(%stage, %err, "unexpected lifecycle state on success");
                        }
                        tracing::info!(%stage, %invocation, "stage completed");
                        PipelineEvent::Completed { stage, invocation }
                    }
                    Err(failure) => {
                        if let Err(err) = run.fail(&failure) {
                            tracing::error!(%stage, %err, "unexpected lifecycle state on failure");
                        }
                        tracing::warn!(%stage, %invocation, error = %failure, "stage failed");
                        PipelineEvent::Failed {
                            stage,
                            invocation,
                            error: failure.message,
                        }
                    }
                };
                (run.clone(), event)
            }
        };

        self.publish(event);
        run
    }

    /// Invoke `from` and then every downstream stage in dependency order
    ///
    /// Each stage is awaited before the next is composed, so it sees its
    /// upstream's fresh output. Stops after the first failed stage.
    pub async fn invoke_chain(&self, from: StageId) -> Vec<(StageId, StageRun)> {
        let mut runs = Vec::new();
        for stage in self.registry.chain_from(from) {
            let run = self.invoke(stage).await;
            let failed = run.status == StageStatus::Failed;
            runs.push((stage, run));
            if failed {
                tracing::warn!(%stage, "chain stopped at failed stage");
                break;
            }
        }
        runs
    }

    /// Invoke several stages concurrently; runs are returned in input order
    pub async fn invoke_all(&self, stages: &[StageId]) -> Vec<(StageId, StageRun)> {
        let runs = futures::future::join_all(stages.iter().map(|stage| self.invoke(*stage))).await;
        stages.iter().copied().zip(runs).collect()
    }

    /// Toggle approval of an item; returns its new status
    pub fn approve(&self, key: &str) -> ApprovalStatus {
        let status = self.state.lock().studio.ledger.approve(key);
        tracing::debug!(key, %status, "approval toggled");
        status
    }

    /// Toggle rejection of an item; returns its new status
    pub fn reject(&self, key: &str) -> ApprovalStatus {
        let status = self.state.lock().studio.ledger.reject(key);
        tracing::debug!(key, %status, "rejection toggled");
        status
    }

    /// Change the active brand scope. Affects reads and future trendScout
    /// requests only.
    pub fn set_scope(&self, scope: BrandScope) {
        self.state.lock().studio.scope = scope;
        tracing::info!(%scope, "brand scope changed");
        self.publish(PipelineEvent::ScopeChanged { scope });
    }

    /// Active brand scope
    #[must_use]
    pub fn scope(&self) -> BrandScope {
        self.state.lock().studio.scope
    }

    /// Turn sample mode on or off
    pub fn set_fallback_mode(&self, enabled: bool) {
        self.state.lock().studio.fallback_enabled = enabled;
        tracing::info!(enabled, "sample mode changed");
        self.publish(PipelineEvent::FallbackModeChanged { enabled });
    }

    /// Whether sample mode is on
    #[must_use]
    pub fn fallback_enabled(&self) -> bool {
        self.state.lock().studio.fallback_enabled
    }

    /// Copy of every stage run
    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.state.lock().studio.snapshot.clone()
    }

    /// Copy of one stage run
    #[must_use]
    pub fn run(&self, stage: StageId) -> StageRun {
        self.state.lock().studio.snapshot.run(stage).clone()
    }

    /// Consistent copy of snapshot, ledger, scope and sample mode
    #[must_use]
    pub fn state(&self) -> StudioState {
        self.state.lock().studio.clone()
    }

    /// Effective output of a stage
    #[must_use]
    pub fn effective_output(&self, stage: StageId) -> Option<Value> {
        self.state.lock().studio.effective_output(stage).cloned()
    }

    /// Request that [`Self::invoke`] would send for `stage` right now
    #[must_use]
    pub fn compose(&self, stage: StageId) -> ComposedInput {
        let inner = self.state.lock();
        self.compose_locked(&inner.studio, stage)
    }

    fn compose_locked(&self, studio: &StudioState, stage: StageId) -> ComposedInput {
        let upstream = self
            .registry
            .upstream(stage)
            .and_then(|up| studio.effective_output(up));
        self.composer
            .compose(stage, upstream, &studio.ledger, studio.scope)
    }

    /// Progress counts over effective outputs
    #[must_use]
    pub fn progress(&self) -> PipelineProgress {
        PipelineProgress::from_state(&self.state.lock().studio)
    }

    /// Agent of the most recently started invocation still outstanding
    #[must_use]
    pub fn active_agent(&self) -> Option<AgentId> {
        let inner = self.state.lock();
        inner
            .outstanding
            .values()
            .next_back()
            .map(|stage| self.registry.agent(*stage).clone())
    }
}
