//! Pipeline progress
//!
//! Headline counts per stage, computed from effective outputs on every read.
//! Reported totals are preferred over list lengths because agents return a
//! sample of what they generated; when a total is missing the visible items
//! are counted instead. Missing or malformed data counts as zero.

use crate::types::StudioState;
use reel_stages::lenient;
use reel_stages::{Brand, StageId};
use serde::Serialize;
use serde_json::Value;

/// Count per stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineProgress {
    /// Trend briefs
    pub trends: u64,
    /// Hooks generated
    pub hooks: u64,
    /// Scripts written
    pub scripts: u64,
    /// Render jobs
    pub renders: u64,
    /// Scheduled posts
    pub posts: u64,
    /// 1 once analytics output exists
    pub analytics: u64,
    /// 1 once funnel output exists
    pub funnels: u64,
}

fn len(items: &[Value]) -> u64 {
    u64::try_from(items.len()).unwrap_or(u64::MAX)
}

fn total_or_len(output: &Value, total: &[&str], items: &[&str]) -> u64 {
    lenient::count(output, total).unwrap_or_else(|| len(lenient::array(output, items)))
}

impl PipelineProgress {
    /// Counts from a per-stage output lookup
    pub fn from_outputs<'a, F>(output: F) -> Self
    where
        F: Fn(StageId) -> Option<&'a Value>,
    {
        let trends = output(StageId::TrendScout)
            .map_or(0, |v| len(lenient::array(v, &["inspiration_briefs"])));

        let hooks = output(StageId::HookLab).map_or(0, |v| {
            lenient::count(v, &["generation_stats", "total_hooks"]).unwrap_or_else(|| {
                Brand::ORDER
                    .into_iter()
                    .map(|brand| len(lenient::array(v, &["hooks_by_brand", brand.as_str()])))
                    .sum()
            })
        });

        let scripts = output(StageId::ScriptEngine)
            .map_or(0, |v| total_or_len(v, &["total_scripts"], &["scripts"]));
        let renders = output(StageId::Production).map_or(0, |v| {
            total_or_len(v, &["batch_summary", "total_jobs"], &["render_jobs"])
        });
        let posts = output(StageId::Distribution).map_or(0, |v| {
            total_or_len(v, &["distribution_summary", "total_posts"], &["schedule"])
        });

        Self {
            trends,
            hooks,
            scripts,
            renders,
            posts,
            analytics: u64::from(output(StageId::Analytics).is_some()),
            funnels: u64::from(output(StageId::FunnelOptimizer).is_some()),
        }
    }

    /// Counts over a studio state's effective outputs
    #[must_use]
    pub fn from_state(state: &StudioState) -> Self {
        Self::from_outputs(|stage| state.effective_output(stage))
    }

    /// Count for one stage
    #[must_use]
    pub fn count(&self, stage: StageId) -> u64 {
        match stage {
            StageId::TrendScout => self.trends,
            StageId::HookLab => self.hooks,
            StageId::ScriptEngine => self.scripts,
            StageId::Production => self.renders,
            StageId::Distribution => self.posts,
            StageId::Analytics => self.analytics,
            StageId::FunnelOptimizer => self.funnels,
        }
    }

    /// `(stage, label, count)` in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (StageId, &'static str, u64)> + '_ {
        StageId::ALL
            .into_iter()
            .map(move |stage| (stage, label(stage), self.count(stage)))
    }
}

fn label(stage: StageId) -> &'static str {
    match stage {
        StageId::TrendScout => "Trends",
        StageId::HookLab => "Hooks",
        StageId::ScriptEngine => "Scripts",
        StageId::Production => "Renders",
        StageId::Distribution => "Posts",
        StageId::Analytics => "Analytics",
        StageId::FunnelOptimizer => "Funnels",
    }
}

/// Output tallies for one brand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrandTally {
    /// Brand
    pub brand: Brand,
    /// Hooks in the brand's list
    pub hooks: u64,
    /// Scripts tagged with the brand
    pub scripts: u64,
    /// Posts reported for the brand
    pub posts: u64,
}

/// Per-brand tallies in brand order
#[must_use]
pub fn brand_breakdown(state: &StudioState) -> Vec<BrandTally> {
    let hooks = state.effective_output(StageId::HookLab);
    let scripts = state.effective_output(StageId::ScriptEngine);
    let distribution = state.effective_output(StageId::Distribution);

    Brand::ORDER
        .into_iter()
        .map(|brand| BrandTally {
            brand,
            hooks: hooks.map_or(0, |v| {
                len(lenient::array(v, &["hooks_by_brand", brand.as_str()]))
            }),
            scripts: scripts.map_or(0, |v| {
                let matching = lenient::array(v, &["scripts"])
                    .iter()
                    .filter(|s| {
                        lenient::text(s, &["brand"]).eq_ignore_ascii_case(brand.as_str())
                    })
                    .count();
                u64::try_from(matching).unwrap_or(u64::MAX)
            }),
            posts: distribution.map_or(0, |v| {
                lenient::count(v, &["distribution_summary", "by_brand", brand.as_str()])
                    .unwrap_or(0)
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StageRun;
    use serde_json::json;

    fn with_data(pairs: &[(StageId, Value)]) -> StudioState {
        let mut state = StudioState::default();
        for (stage, data) in pairs {
            *state.snapshot.run_mut(*stage) = StageRun {
                data: Some(data.clone()),
                ..StageRun::default()
            };
        }
        state
    }

    #[test]
    fn empty_pipeline_is_all_zero() {
        assert_eq!(
            PipelineProgress::from_state(&StudioState::default()),
            PipelineProgress::default()
        );
    }

    #[test]
    fn seed_counts() {
        let state = StudioState {
            fallback_enabled: true,
            ..StudioState::default()
        };
        let progress = PipelineProgress::from_state(&state);
        assert_eq!(
            progress,
            PipelineProgress {
                trends: 5,
                hooks: 150,
                scripts: 14,
                renders: 14,
                posts: 42,
                analytics: 1,
                funnels: 1,
            }
        );
    }

    #[test]
    fn missing_totals_fall_back_to_item_counts() {
        let state = with_data(&[
            (
                StageId::HookLab,
                json!({"hooks_by_brand": {"newborns": [{}, {}], "teenagers": [{}]}}),
            ),
            (StageId::ScriptEngine, json!({"scripts": [{}, {}, {}]})),
            (StageId::Production, json!({"render_jobs": [{}], "batch_summary": {}})),
            (StageId::Distribution, json!({"schedule": "oops"})),
        ]);
        let progress = PipelineProgress::from_state(&state);
        assert_eq!(progress.hooks, 3);
        assert_eq!(progress.scripts, 3);
        assert_eq!(progress.renders, 1);
        assert_eq!(progress.posts, 0);
        assert_eq!(progress.analytics, 0);
    }

    #[test]
    fn malformed_outputs_count_zero() {
        let state = with_data(&[
            (StageId::TrendScout, json!("not an object")),
            (StageId::HookLab, json!({"generation_stats": {"total_hooks": "many"}})),
            (StageId::Analytics, json!(null)),
        ]);
        let progress = PipelineProgress::from_state(&state);
        assert_eq!(progress.trends, 0);
        assert_eq!(progress.hooks, 0);
        // A live null result still exists.
        assert_eq!(progress.analytics, 1);
    }

    #[test]
    fn labels_in_order() {
        let labels: Vec<_> = PipelineProgress::default().iter().map(|(_, l, _)| l).collect();
        assert_eq!(
            labels,
            vec!["Trends", "Hooks", "Scripts", "Renders", "Posts", "Analytics", "Funnels"]
        );
    }

    #[test]
    fn breakdown_from_seeds() {
        let state = StudioState {
            fallback_enabled: true,
            ..StudioState::default()
        };
        let breakdown = brand_breakdown(&state);
        assert_eq!(
            breakdown
                .iter()
                .map(|t| (t.brand, t.hooks, t.posts))
                .collect::<Vec<_>>(),
            vec![
                (Brand::Newborns, 3, 16),
                (Brand::Toddlers, 2, 14),
                (Brand::Teenagers, 2, 12),
            ]
        );
    }
}
