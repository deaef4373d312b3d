//! Approval ledger
//!
//! Tracks human approve/reject decisions on generated hooks. Keys are
//! positional (`hook-<n>` in the brand-ordered concatenation) and are never
//! re-derived when hooks are regenerated; a stale approval simply points at
//! whatever now sits at that position.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Decision recorded for one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// No decision
    #[default]
    Pending,
    /// Approved for scripting
    Approved,
    /// Rejected
    Rejected,
}

impl ApprovalStatus {
    /// Lower-case label
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of the item at `position` in the hook concatenation
#[inline]
#[must_use]
pub fn item_key(position: usize) -> String {
    format!("hook-{position}")
}

/// Approved and rejected tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApprovalCounts {
    /// Items currently approved
    pub approved: usize,
    /// Items currently rejected
    pub rejected: usize,
}

/// Item key to approval status
///
/// Records are created on first toggle and never removed. An unknown key
/// reads as [`ApprovalStatus::Pending`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalLedger {
    records: BTreeMap<String, ApprovalStatus>,
}

impl ApprovalLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle approval: `Approved` goes back to `Pending`, anything else
    /// becomes `Approved`. Returns the new status.
    pub fn approve(&mut self, key: impl Into<String>) -> ApprovalStatus {
        self.toggle(key.into(), ApprovalStatus::Approved)
    }

    /// Toggle rejection; mirror image of [`Self::approve`]
    pub fn reject(&mut self, key: impl Into<String>) -> ApprovalStatus {
        self.toggle(key.into(), ApprovalStatus::Rejected)
    }

    fn toggle(&mut self, key: String, target: ApprovalStatus) -> ApprovalStatus {
        let entry = self.records.entry(key).or_default();
        *entry = if *entry == target {
            ApprovalStatus::Pending
        } else {
            target
        };
        *entry
    }

    /// Status of an item
    #[must_use]
    pub fn status_of(&self, key: &str) -> ApprovalStatus {
        self.records.get(key).copied().unwrap_or_default()
    }

    /// Whether an item is approved
    #[inline]
    #[must_use]
    pub fn is_approved(&self, key: &str) -> bool {
        self.status_of(key) == ApprovalStatus::Approved
    }

    /// Approved keys in key order
    #[must_use]
    pub fn approved_keys(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|(_, status)| **status == ApprovalStatus::Approved)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Approved and rejected tallies
    #[must_use]
    pub fn counts(&self) -> ApprovalCounts {
        self.records
            .values()
            .fold(ApprovalCounts::default(), |mut counts, status| {
                match status {
                    ApprovalStatus::Approved => counts.approved += 1,
                    ApprovalStatus::Rejected => counts.rejected += 1,
                    ApprovalStatus::Pending => {}
                }
                counts
            })
    }

    /// Number of records, including ones toggled back to pending
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No item was ever toggled
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
