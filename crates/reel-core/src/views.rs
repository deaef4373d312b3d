//! Section views
//!
//! Read-side projections for each dashboard section. Every view decodes the
//! effective output of its stage and applies the active brand scope; `None`
//! means the stage has no effective output yet.

use crate::ledger::{item_key, ApprovalStatus};
use crate::progress::{brand_breakdown, BrandTally, PipelineProgress};
use crate::types::StudioState;
use reel_stages::output::decode;
use reel_stages::{
    filter_by_brand, AbTest, AnalyticsReport, BatchSummary, Brand, DistributionPlan,
    DistributionSummary, FunnelMetrics, FunnelReport, GenerationStats, Hook, HookBatch, Kpis,
    Loser, Recommendations, RenderBatch, RenderJob, ScheduledPost, Script, ScriptBatch, StageId,
    TrendBrief, TrendReport, Winner,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Trend research overview with pipeline progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandCenterView {
    /// Briefs in scope
    pub briefs: Vec<TrendBrief>,
    /// Research summary
    pub summary: String,
    /// Research date
    pub research_date: String,
    /// Progress counts
    pub progress: PipelineProgress,
    /// Per-brand tallies
    pub brands: Vec<BrandTally>,
}

/// Command center; `None` until trendScout has output
#[must_use]
pub fn command_center(state: &StudioState) -> Option<CommandCenterView> {
    let report: TrendReport = decode(Some(state.effective_output(StageId::TrendScout)?));
    Some(CommandCenterView {
        briefs: filter_by_brand(&report.inspiration_briefs, state.scope).into_owned(),
        summary: report.summary,
        research_date: report.research_date,
        progress: PipelineProgress::from_state(state),
        brands: brand_breakdown(state),
    })
}

/// One hook with its approval key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookRow {
    /// Approval key
    pub key: String,
    /// List the hook came from
    pub brand: Brand,
    /// Approval status
    pub status: ApprovalStatus,
    /// Hook record
    pub hook: Hook,
}

/// Hook bank filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookFilter {
    /// Compliance risk, matched case-insensitively
    pub risk: Option<String>,
    /// Approval status
    pub status: Option<ApprovalStatus>,
}

impl HookFilter {
    fn admits(&self, row: &HookRow) -> bool {
        let risk_ok = self
            .risk
            .as_deref()
            .map_or(true, |risk| row.hook.compliance_risk.eq_ignore_ascii_case(risk));
        let status_ok = self.status.map_or(true, |status| row.status == status);
        risk_ok && status_ok
    }
}

/// Hook review list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookBankView {
    /// Hooks passing scope and filters
    pub rows: Vec<HookRow>,
    /// Hooks across all brands, before any filtering
    pub total: usize,
    /// Generation statistics
    pub stats: GenerationStats,
}

/// Hook bank; `None` until hookLab has output
///
/// Keys are assigned over the full brand-ordered concatenation before the
/// scope and filters apply, so a key names the same hook in every view.
#[must_use]
pub fn hook_bank(state: &StudioState, filter: &HookFilter) -> Option<HookBankView> {
    let batch: HookBatch = decode(Some(state.effective_output(StageId::HookLab)?));
    let rows: Vec<HookRow> = batch
        .hooks_by_brand
        .concatenated()
        .enumerate()
        .map(|(position, (brand, hook))| {
            let key = item_key(position);
            HookRow {
                status: state.ledger.status_of(&key),
                key,
                brand,
                hook: hook.clone(),
            }
        })
        .collect();
    let total = rows.len();
    let rows = rows
        .into_iter()
        .filter(|row| state.scope.includes(row.brand) && filter.admits(row))
        .collect();

    Some(HookBankView {
        rows,
        total,
        stats: batch.generation_stats,
    })
}

/// Script review list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptQueueView {
    /// Scripts in scope
    pub scripts: Vec<Script>,
    /// Reported total
    pub total_scripts: u64,
    /// Reported per-brand counts
    pub brand_breakdown: BTreeMap<String, u64>,
}

/// Script queue; `None` until scriptEngine has output
#[must_use]
pub fn script_queue(state: &StudioState) -> Option<ScriptQueueView> {
    let batch: ScriptBatch = decode(Some(state.effective_output(StageId::ScriptEngine)?));
    Some(ScriptQueueView {
        scripts: filter_by_brand(&batch.scripts, state.scope).into_owned(),
        total_scripts: batch.total_scripts,
        brand_breakdown: batch.brand_breakdown,
    })
}

/// Render job list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPipelineView {
    /// Jobs in scope
    pub jobs: Vec<RenderJob>,
    /// Reported totals
    pub summary: BatchSummary,
}

/// Render pipeline; `None` until production has output
#[must_use]
pub fn render_pipeline(state: &StudioState) -> Option<RenderPipelineView> {
    let batch: RenderBatch = decode(Some(state.effective_output(StageId::Production)?));
    Some(RenderPipelineView {
        jobs: filter_by_brand(&batch.render_jobs, state.scope).into_owned(),
        summary: batch.batch_summary,
    })
}

/// Posting schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionCalendarView {
    /// Posts in scope
    pub posts: Vec<ScheduledPost>,
    /// Reported totals
    pub summary: DistributionSummary,
}

/// Distribution calendar; `None` until distribution has output
#[must_use]
pub fn distribution_calendar(state: &StudioState) -> Option<DistributionCalendarView> {
    let plan: DistributionPlan = decode(Some(state.effective_output(StageId::Distribution)?));
    Some(DistributionCalendarView {
        posts: filter_by_brand(&plan.schedule, state.scope).into_owned(),
        summary: plan.distribution_summary,
    })
}

/// Performance report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsView {
    /// Headline KPIs (all brands)
    pub kpis: Kpis,
    /// Winners in scope
    pub winners: Vec<Winner>,
    /// Losers in scope
    pub losers: Vec<Loser>,
    /// Recommendations
    pub recommendations: Recommendations,
    /// Markdown summary
    pub weekly_summary: String,
    /// Briefs for next week
    pub next_week_briefs: Vec<String>,
}

/// Analytics dashboard; `None` until analytics has output
#[must_use]
pub fn analytics_dashboard(state: &StudioState) -> Option<AnalyticsView> {
    let report: AnalyticsReport = decode(Some(state.effective_output(StageId::Analytics)?));
    Some(AnalyticsView {
        kpis: report.kpis,
        winners: filter_by_brand(&report.winners, state.scope).into_owned(),
        losers: filter_by_brand(&report.losers, state.scope).into_owned(),
        recommendations: report.recommendations,
        weekly_summary: report.weekly_summary,
        next_week_briefs: report.next_week_briefs,
    })
}

/// Funnel report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelLabView {
    /// Metrics for the brands in scope, in brand order
    pub funnels: Vec<(Brand, FunnelMetrics)>,
    /// A/B tests in scope
    pub ab_tests: Vec<AbTest>,
    /// Markdown summary
    pub optimization_summary: String,
}

/// Funnel lab; `None` until funnelOptimizer has output
#[must_use]
pub fn funnel_lab(state: &StudioState) -> Option<FunnelLabView> {
    let report: FunnelReport = decode(Some(state.effective_output(StageId::FunnelOptimizer)?));
    Some(FunnelLabView {
        funnels: Brand::ORDER
            .into_iter()
            .filter(|brand| state.scope.includes(*brand))
            .map(|brand| (brand, report.funnel_analysis.for_brand(brand).clone()))
            .collect(),
        ab_tests: filter_by_brand(&report.ab_tests, state.scope).into_owned(),
        optimization_summary: report.optimization_summary,
    })
}

/// Any section view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum SectionView {
    /// trendScout
    CommandCenter(CommandCenterView),
    /// hookLab
    HookBank(HookBankView),
    /// scriptEngine
    ScriptQueue(ScriptQueueView),
    /// production
    RenderPipeline(RenderPipelineView),
    /// distribution
    DistributionCalendar(DistributionCalendarView),
    /// analytics
    Analytics(AnalyticsView),
    /// funnelOptimizer
    FunnelLab(FunnelLabView),
}

/// Section view for a stage, hook bank unfiltered
#[must_use]
pub fn section(state: &StudioState, stage: StageId) -> Option<SectionView> {
    match stage {
        StageId::TrendScout => command_center(state).map(SectionView::CommandCenter),
        StageId::HookLab => hook_bank(state, &HookFilter::default()).map(SectionView::HookBank),
        StageId::ScriptEngine => script_queue(state).map(SectionView::ScriptQueue),
        StageId::Production => render_pipeline(state).map(SectionView::RenderPipeline),
        StageId::Distribution => {
            distribution_calendar(state).map(SectionView::DistributionCalendar)
        }
        StageId::Analytics => analytics_dashboard(state).map(SectionView::Analytics),
        StageId::FunnelOptimizer => funnel_lab(state).map(SectionView::FunnelLab),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_stages::BrandScope;

    fn sample(scope: BrandScope) -> StudioState {
        StudioState {
            scope,
            fallback_enabled: true,
            ..StudioState::default()
        }
    }

    #[test]
    fn no_output_no_view() {
        let state = StudioState::default();
        for stage in StageId::ALL {
            assert!(section(&state, stage).is_none(), "{stage}");
        }
    }

    #[test]
    fn command_center_filters_by_target_niche() {
        let view = command_center(&sample(BrandScope::Toddlers)).unwrap();
        assert_eq!(view.briefs.len(), 2);
        assert!(view.briefs.iter().all(|b| b.target_niche == "toddlers"));
        assert_eq!(view.research_date, "2026-02-24");
        assert_eq!(view.progress.trends, 5);
    }

    #[test]
    fn hook_keys_survive_scope_filter() {
        let mut state = sample(BrandScope::Teenagers);
        state.ledger.approve("hook-6");
        let view = hook_bank(&state, &HookFilter::default()).unwrap();
        let keys: Vec<_> = view.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["hook-5", "hook-6"]);
        assert_eq!(view.rows[1].status, ApprovalStatus::Approved);
        assert_eq!(view.total, 7);
        assert_eq!(view.stats.total_hooks, 150);
    }

    #[test]
    fn hook_filters() {
        let mut state = sample(BrandScope::All);
        state.ledger.approve("hook-0");
        state.ledger.approve("hook-3");

        let low = hook_bank(
            &state,
            &HookFilter {
                risk: Some("low".into()),
                status: None,
            },
        )
        .unwrap();
        let keys: Vec<_> = low.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["hook-0", "hook-3", "hook-4", "hook-5"]);

        let approved = hook_bank(
            &state,
            &HookFilter {
                risk: None,
                status: Some(ApprovalStatus::Approved),
            },
        )
        .unwrap();
        assert_eq!(approved.rows.len(), 2);
    }

    #[test]
    fn scoped_lists() {
        let state = sample(BrandScope::Newborns);
        assert_eq!(script_queue(&state).unwrap().scripts.len(), 1);
        let renders = render_pipeline(&state).unwrap();
        assert_eq!(renders.jobs.len(), 2);
        assert_eq!(renders.summary.total_jobs, 14);
        assert_eq!(distribution_calendar(&state).unwrap().posts.len(), 2);

        let analytics = analytics_dashboard(&state).unwrap();
        assert_eq!(analytics.winners.len(), 1);
        assert_eq!(analytics.losers.len(), 1);
        assert_eq!(analytics.next_week_briefs.len(), 4);
    }

    #[test]
    fn funnel_lab_restricts_metrics_to_scope() {
        let all = funnel_lab(&sample(BrandScope::All)).unwrap();
        assert_eq!(all.funnels.len(), 3);
        assert_eq!(all.ab_tests.len(), 4);

        let teens = funnel_lab(&sample(BrandScope::Teenagers)).unwrap();
        assert_eq!(teens.funnels.len(), 1);
        assert_eq!(teens.funnels[0].0, Brand::Teenagers);
        assert_eq!(teens.ab_tests.len(), 1);
    }
}
