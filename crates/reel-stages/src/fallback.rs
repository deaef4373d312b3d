//! Effective output resolution
//!
//! A stage's effective output is its live result, or its seed dataset when
//! sample mode is on and no live result exists yet. A live result always wins
//! once it exists, even an empty one.

use crate::seed::seed_output;
use crate::stage::StageId;
use serde_json::Value;

/// Resolve the effective output of a stage
///
/// Stateless; safe to call on every read.
#[must_use]
pub fn effective_output(
    stage: StageId,
    live: Option<&Value>,
    fallback_enabled: bool,
) -> Option<&Value> {
    match live {
        Some(data) => Some(data),
        None if fallback_enabled => Some(seed_output(stage)),
        None => None,
    }
}
