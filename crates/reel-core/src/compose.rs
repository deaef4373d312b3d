//! Input composition
//!
//! Builds the request for a stage from its upstream stage's effective output,
//! the approval ledger and the active brand scope. Composition is pure: the
//! same inputs always yield the same prompt.
//!
//! Upstream lists are forwarded whole. The brand scope only changes the
//! audience phrase of trendScout; every downstream stage receives the full
//! list regardless of scope.

use crate::ledger::{item_key, ApprovalLedger};
use reel_stages::lenient;
use reel_stages::{Brand, BrandScope, StageId};
use serde::Serialize;
use serde_json::Value;

/// Number of hooks forwarded to scriptEngine when none are approved
pub const DEFAULT_SCRIPT_FALLBACK_LIMIT: usize = 10;

/// A composed stage request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedInput {
    /// Stage the request is for
    pub stage: StageId,
    /// Request text sent to the agent
    pub prompt: String,
    /// Exactly the list serialized into `prompt`; empty for stages without
    /// upstream input
    pub items: Vec<Value>,
}

/// Composes stage requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputComposer {
    script_fallback_limit: usize,
}

impl Default for InputComposer {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT_FALLBACK_LIMIT)
    }
}

impl InputComposer {
    /// Composer forwarding at most `script_fallback_limit` hooks when none
    /// are approved
    #[must_use]
    pub const fn new(script_fallback_limit: usize) -> Self {
        Self {
            script_fallback_limit,
        }
    }

    /// Compose the request for `stage`
    ///
    /// `upstream` is the effective output of the stage's upstream dependency;
    /// it is ignored for stages without one.
    #[must_use]
    pub fn compose(
        &self,
        stage: StageId,
        upstream: Option<&Value>,
        ledger: &ApprovalLedger,
        scope: BrandScope,
    ) -> ComposedInput {
        let (prompt, items) = match stage {
            StageId::TrendScout => (
                format!(
                    "Research trending parenting content for {} niche. Find viral hooks, \
                     content angles, and emotional triggers from competitor accounts on \
                     Instagram, TikTok, YouTube Shorts, and Facebook Reels.",
                    scope.audience()
                ),
                Vec::new(),
            ),
            StageId::HookLab => {
                let items = list_at(upstream, &["inspiration_briefs"]);
                (
                    format!(
                        "Based on these inspiration briefs: {}. Generate 50 hooks per brand. \
                         Apply weighted scoring. Flag compliance risks.",
                        to_json(&items)
                    ),
                    items,
                )
            }
            StageId::ScriptEngine => {
                let items = self.script_hooks(upstream, ledger);
                (
                    format!(
                        "Transform these approved hooks into video scripts: {}. Create 20-35s \
                         scripts with platform-specific captions for Instagram, TikTok, \
                         YouTube Shorts, and Facebook.",
                        to_json(&items)
                    ),
                    items,
                )
            }
            StageId::Production => {
                let items = list_at(upstream, &["scripts"]);
                (
                    format!(
                        "Generate render job specifications for these scripts: {}. Include \
                         voiceover instructions, subtitle styling, brand templates.",
                        to_json(&items)
                    ),
                    items,
                )
            }
            StageId::Distribution => {
                let items = list_at(upstream, &["render_jobs"]);
                (
                    format!(
                        "Create posting schedule for these rendered videos: {}. Follow brand \
                         posting cadence rules. Distribute across TikTok, Instagram, YouTube \
                         Shorts, and Facebook.",
                        to_json(&items)
                    ),
                    items,
                )
            }
            StageId::Analytics => (
                format!(
                    "Analyze performance data for {}. Calculate KPIs including saves/1k, \
                     shares/1k, follows/1k, completion rate, quiz CTR, RPM. Identify winners \
                     and losers. Generate weekly recommendations.",
                    BrandScope::All.audience()
                ),
                Vec::new(),
            ),
            StageId::FunnelOptimizer => (
                format!(
                    "Analyze quiz funnel performance for {}. Identify weak points in each \
                     funnel stage. Generate 2 A/B test plans per brand with expected impact \
                     estimates.",
                    BrandScope::All.audience()
                ),
                Vec::new(),
            ),
        };

        tracing::debug!(%stage, items = items.len(), "composed stage input");
        ComposedInput {
            stage,
            prompt,
            items,
        }
    }

    /// Approved hooks in concatenation order, or the first
    /// `script_fallback_limit` hooks when nothing is approved
    fn script_hooks(&self, hook_output: Option<&Value>, ledger: &ApprovalLedger) -> Vec<Value> {
        let hooks = hook_concatenation(hook_output);
        let approved: Vec<Value> = hooks
            .iter()
            .enumerate()
            .filter(|(position, _)| ledger.is_approved(&item_key(*position)))
            .map(|(_, hook)| hook.clone())
            .collect();

        if approved.is_empty() {
            hooks.into_iter().take(self.script_fallback_limit).collect()
        } else {
            approved
        }
    }
}

/// Hooks of every brand in fixed brand order
///
/// Position `n` in this list is the item keyed `hook-n`. Independent of the
/// active scope.
#[must_use]
pub fn hook_concatenation(hook_output: Option<&Value>) -> Vec<Value> {
    let Some(output) = hook_output else {
        return Vec::new();
    };
    Brand::ORDER
        .into_iter()
        .flat_map(|brand| lenient::array(output, &["hooks_by_brand", brand.as_str()]))
        .cloned()
        .collect()
}

fn list_at(output: Option<&Value>, path: &[&str]) -> Vec<Value> {
    output
        .map(|value| lenient::array(value, path).to_vec())
        .unwrap_or_default()
}

fn to_json(items: &[Value]) -> String {
    // Serializing a slice of `Value` cannot fail.
    serde_json::to_string(items).unwrap_or_else(|_| String::from("[]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn hooks(newborns: usize, toddlers: usize, teenagers: usize) -> Value {
        let list = |brand: &str, n: usize| -> Vec<Value> {
            (0..n)
                .map(|i| json!({"hook_text": format!("{brand}-{i}")}))
                .collect()
        };
        json!({
            "hooks_by_brand": {
                "newborns": list("n", newborns),
                "toddlers": list("t", toddlers),
                "teenagers": list("g", teenagers),
            }
        })
    }

    fn texts(items: &[Value]) -> Vec<&str> {
        items.iter().map(|h| h["hook_text"].as_str().unwrap()).collect()
    }

    #[test]
    fn trend_scout_audience_follows_scope() {
        let composer = InputComposer::default();
        let ledger = ApprovalLedger::new();

        let all = composer.compose(StageId::TrendScout, None, &ledger, BrandScope::All);
        assert!(all
            .prompt
            .contains("for all brands (Newborns, Toddlers, Teenagers) niche"));
        assert!(all.items.is_empty());

        let toddlers = composer.compose(StageId::TrendScout, None, &ledger, BrandScope::Toddlers);
        assert!(toddlers.prompt.contains("for toddlers niche"));
    }

    #[test]
    fn hook_lab_forwards_every_brief() {
        let briefs = json!({"inspiration_briefs": [
            {"trend_title": "a", "target_niche": "newborns"},
            {"trend_title": "b", "target_niche": "toddlers"},
        ]});
        let input = InputComposer::default().compose(
            StageId::HookLab,
            Some(&briefs),
            &ApprovalLedger::new(),
            BrandScope::Teenagers,
        );
        assert_eq!(input.items.len(), 2);
        assert_eq!(
            input.prompt,
            "Based on these inspiration briefs: \
             [{\"trend_title\":\"a\",\"target_niche\":\"newborns\"},\
             {\"trend_title\":\"b\",\"target_niche\":\"toddlers\"}]. \
             Generate 50 hooks per brand. Apply weighted scoring. Flag compliance risks."
        );
    }

    #[test]
    fn missing_upstream_serializes_empty_list() {
        let input = InputComposer::default().compose(
            StageId::Production,
            None,
            &ApprovalLedger::new(),
            BrandScope::All,
        );
        assert!(input.items.is_empty());
        assert!(input
            .prompt
            .starts_with("Generate render job specifications for these scripts: []."));
    }

    #[test]
    fn concatenation_is_brand_ordered() {
        let output = hooks(2, 1, 2);
        assert_eq!(
            texts(&hook_concatenation(Some(&output))),
            vec!["n-0", "n-1", "t-0", "g-0", "g-1"]
        );
        assert!(hook_concatenation(None).is_empty());
    }

    #[test]
    fn no_approvals_takes_first_ten() {
        let output = hooks(6, 6, 6);
        let input = InputComposer::default().compose(
            StageId::ScriptEngine,
            Some(&output),
            &ApprovalLedger::new(),
            BrandScope::All,
        );
        assert_eq!(
            texts(&input.items),
            vec!["n-0", "n-1", "n-2", "n-3", "n-4", "n-5", "t-0", "t-1", "t-2", "t-3"]
        );
    }

    #[test]
    fn fewer_than_limit_takes_all() {
        let output = hooks(1, 1, 1);
        let input = InputComposer::default().compose(
            StageId::ScriptEngine,
            Some(&output),
            &ApprovalLedger::new(),
            BrandScope::All,
        );
        assert_eq!(input.items.len(), 3);
    }

    #[test]
    fn approvals_select_exactly_those_hooks_in_any_scope() {
        let output = hooks(2, 2, 2);
        let mut ledger = ApprovalLedger::new();
        ledger.approve("hook-4");
        ledger.approve("hook-1");
        ledger.reject("hook-0");

        for scope in BrandScope::ALL {
            let input = InputComposer::default().compose(
                StageId::ScriptEngine,
                Some(&output),
                &ledger,
                scope,
            );
            assert_eq!(texts(&input.items), vec!["n-1", "g-0"]);
        }
    }

    #[test]
    fn rejections_alone_fall_back_to_first_items() {
        let output = hooks(3, 0, 0);
        let mut ledger = ApprovalLedger::new();
        ledger.reject("hook-0");
        let input = InputComposer::new(2).compose(
            StageId::ScriptEngine,
            Some(&output),
            &ledger,
            BrandScope::All,
        );
        assert_eq!(texts(&input.items), vec!["n-0", "n-1"]);
    }

    #[test]
    fn analytics_and_funnel_ignore_scope() {
        let composer = InputComposer::default();
        let ledger = ApprovalLedger::new();
        for stage in [StageId::Analytics, StageId::FunnelOptimizer] {
            let input = composer.compose(stage, None, &ledger, BrandScope::Newborns);
            assert!(input
                .prompt
                .contains("for all brands (Newborns, Toddlers, Teenagers)."));
            assert!(input.items.is_empty());
        }
    }
}
