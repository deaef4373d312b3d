//! Core types for the studio pipeline

use crate::error::{InvocationError, TransitionError};
use crate::ledger::ApprovalLedger;
use crate::transitions::validate_transition;
use chrono::{DateTime, Utc};
use reel_stages::{BrandScope, StageId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Lifecycle status of a stage run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageStatus {
    /// Never invoked
    #[default]
    Idle,
    /// An invocation is outstanding
    Running,
    /// Last settled invocation succeeded
    Succeeded,
    /// Last settled invocation failed
    Failed,
}

impl StageStatus {
    /// Lower-case label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Idle => "idle",
            StageStatus::Running => "running",
            StageStatus::Succeeded => "succeeded",
            StageStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Identifier of one invocation, increasing in start order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(pub u64);

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Current run record of one stage
///
/// `data` is only ever replaced by a successful completion. A failure sets
/// `error` and leaves the previous `data` in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRun {
    /// Lifecycle status
    pub status: StageStatus,
    /// Last successful result
    pub data: Option<Value>,
    /// Failure text of the last settled invocation, if it failed
    pub error: Option<String>,
    /// When `data` was last replaced
    pub finished_at: Option<DateTime<Utc>>,
}

impl StageRun {
    /// An invocation is outstanding
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == StageStatus::Running
    }

    /// Mark an invocation as started; keeps `data`, clears `error`
    ///
    /// # Errors
    /// Never fails in practice; every status may be re-invoked.
    pub fn begin(&mut self) -> Result<(), TransitionError> {
        validate_transition(self.status, StageStatus::Running)?;
        self.status = StageStatus::Running;
        self.error = None;
        Ok(())
    }

    /// Apply a successful completion
    ///
    /// # Errors
    /// Returns [`TransitionError`] if the run was never started.
    pub fn succeed(&mut self, data: Value, at: DateTime<Utc>) -> Result<(), TransitionError> {
        validate_transition(self.status, StageStatus::Succeeded)?;
        self.status = StageStatus::Succeeded;
        self.data = Some(data);
        self.error = None;
        self.finished_at = Some(at);
        Ok(())
    }

    /// Apply a failed completion; `data` is untouched
    ///
    /// # Errors
    /// Returns [`TransitionError`] if the run was never started.
    pub fn fail(&mut self, error: &InvocationError) -> Result<(), TransitionError> {
        validate_transition(self.status, StageStatus::Failed)?;
        self.status = StageStatus::Failed;
        self.error = Some(error.message.clone());
        Ok(())
    }
}

/// One run record per stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSnapshot {
    runs: [StageRun; 7],
}

impl PipelineSnapshot {
    /// All stages idle
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run record of a stage
    #[inline]
    #[must_use]
    pub fn run(&self, stage: StageId) -> &StageRun {
        &self.runs[stage.index()]
    }

    /// Mutable run record of a stage
    #[inline]
    pub fn run_mut(&mut self, stage: StageId) -> &mut StageRun {
        &mut self.runs[stage.index()]
    }

    /// Live result of a stage
    #[inline]
    #[must_use]
    pub fn data(&self, stage: StageId) -> Option<&Value> {
        self.run(stage).data.as_ref()
    }

    /// Runs in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (StageId, &StageRun)> {
        StageId::ALL.into_iter().zip(self.runs.iter())
    }

    /// Stages with an outstanding invocation
    pub fn running(&self) -> impl Iterator<Item = StageId> + '_ {
        self.iter().filter(|(_, run)| run.is_running()).map(|(id, _)| id)
    }
}

impl Serialize for PipelineSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.runs.len()))?;
        for (id, run) in self.iter() {
            map.serialize_entry(id.as_str(), run)?;
        }
        map.end()
    }
}

/// Consistent copy of everything the read side needs
///
/// Taken under one lock, so the snapshot, approvals, scope and sample mode
/// always belong to the same moment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioState {
    /// Stage runs
    pub snapshot: PipelineSnapshot,
    /// Hook approvals
    pub ledger: ApprovalLedger,
    /// Active brand scope
    pub scope: BrandScope,
    /// Whether seed datasets stand in for missing results
    pub fallback_enabled: bool,
}

impl StudioState {
    /// Effective output of a stage: live data, or the seed in sample mode
    #[must_use]
    pub fn effective_output(&self, stage: StageId) -> Option<&Value> {
        reel_stages::effective_output(stage, self.snapshot.data(stage), self.fallback_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_keeps_previous_data() {
        let mut run = StageRun::default();
        run.begin().unwrap();
        run.succeed(json!({"scripts": [1]}), Utc::now()).unwrap();
        let finished = run.finished_at;

        run.begin().unwrap();
        assert_eq!(run.status, StageStatus::Running);
        assert_eq!(run.data, Some(json!({"scripts": [1]})));

        run.fail(&InvocationError::new("timeout")).unwrap();
        assert_eq!(run.status, StageStatus::Failed);
        assert_eq!(run.error.as_deref(), Some("timeout"));
        assert_eq!(run.data, Some(json!({"scripts": [1]})));
        assert_eq!(run.finished_at, finished);
    }

    #[test]
    fn begin_clears_error() {
        let mut run = StageRun::default();
        run.begin().unwrap();
        run.fail(&InvocationError::new("")).unwrap();
        assert_eq!(run.error.as_deref(), Some("Agent call failed"));
        run.begin().unwrap();
        assert!(run.error.is_none());
    }

    #[test]
    fn idle_run_cannot_settle() {
        let mut run = StageRun::default();
        assert!(run.succeed(json!({}), Utc::now()).is_err());
        assert!(run.fail(&InvocationError::new("x")).is_err());
        assert_eq!(run, StageRun::default());
    }

    #[test]
    fn snapshot_serializes_by_stage_id() {
        let mut snapshot = PipelineSnapshot::new();
        snapshot.run_mut(StageId::HookLab).begin().unwrap();
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["hookLab"]["status"], "Running");
        assert_eq!(value["trendScout"]["status"], "Idle");
        assert_eq!(value.as_object().unwrap().len(), 7);
        assert_eq!(snapshot.running().collect::<Vec<_>>(), vec![StageId::HookLab]);
    }

    #[test]
    fn studio_state_resolves_fallback() {
        let mut state = StudioState::default();
        assert!(state.effective_output(StageId::TrendScout).is_none());
        state.fallback_enabled = true;
        assert_eq!(
            state.effective_output(StageId::TrendScout),
            Some(reel_stages::seed_output(StageId::TrendScout))
        );
    }
}
