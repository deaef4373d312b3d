//! Stage run lifecycle
//!
//! `Idle -> Running -> Succeeded | Failed`, and any settled run may be invoked
//! again. There is no terminal state. Re-invoking a running stage is allowed,
//! and so is a settled run receiving a late completion from an overlapping
//! invocation. Only `Idle` is strict: a run that was never started cannot
//! settle.

use crate::error::TransitionError;
use crate::types::StageStatus;

/// Validate a status change
///
/// # Errors
/// Returns [`TransitionError::Illegal`] if `to` is not reachable from `from`.
pub fn validate_transition(from: StageStatus, to: StageStatus) -> Result<(), TransitionError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::Illegal { from, to })
    }
}

/// Statuses reachable from `from`
#[must_use]
pub fn allowed_transitions(from: StageStatus) -> Vec<StageStatus> {
    use StageStatus::{Failed, Idle, Running, Succeeded};
    match from {
        Idle => vec![Running],
        Running | Succeeded | Failed => vec![Running, Succeeded, Failed],
    }
}

fn allowed(from: StageStatus, to: StageStatus) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
