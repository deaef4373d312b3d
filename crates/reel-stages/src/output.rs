//! Typed stage results
//!
//! One record family per stage, mirroring the result shapes the agents are
//! prompted to return. All fields are optional on the wire; see
//! [`crate::lenient`] for the decoding rules.

use crate::brand::{Brand, Branded};
use crate::lenient::{lenient_record, Lenient};
use crate::stage::StageId;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

lenient_record! {
    /// Trend research brief
    pub struct TrendBrief {
        pub trend_title: String,
        pub source_platform: String,
        pub hook_pattern: String,
        pub emotional_trigger: String,
        pub content_angle: String,
        pub brand_fit_score: f64,
        /// Brand key; trend briefs carry it here instead of `brand`
        pub target_niche: String,
        pub compliance_notes: String,
        pub suggested_adaptation: String,
    }
}

lenient_record! {
    /// trendScout result
    pub struct TrendReport {
        pub inspiration_briefs: Vec<TrendBrief>,
        pub summary: String,
        pub research_date: String,
    }
}

lenient_record! {
    /// Generated hook. Hooks carry no brand field; the brand is the list they sit in.
    pub struct Hook {
        pub hook_text: String,
        pub pillar: String,
        pub format: String,
        pub cta_type: String,
        pub predicted_intent: String,
        /// `LOW`, `MEDIUM` or `HIGH`, in any case
        pub compliance_risk: String,
        pub source_trend: String,
    }
}

lenient_record! {
    /// Per-brand hook lists
    pub struct HooksByBrand {
        pub newborns: Vec<Hook>,
        pub toddlers: Vec<Hook>,
        pub teenagers: Vec<Hook>,
    }
}

impl HooksByBrand {
    /// Hooks generated for one brand
    #[must_use]
    pub fn for_brand(&self, brand: Brand) -> &[Hook] {
        match brand {
            Brand::Newborns => &self.newborns,
            Brand::Toddlers => &self.toddlers,
            Brand::Teenagers => &self.teenagers,
        }
    }

    /// All hooks in fixed brand order, tagged with their brand
    pub fn concatenated(&self) -> impl Iterator<Item = (Brand, &Hook)> {
        Brand::ORDER
            .into_iter()
            .flat_map(move |brand| self.for_brand(brand).iter().map(move |h| (brand, h)))
    }

    /// Total hooks across brands
    #[must_use]
    pub fn len(&self) -> usize {
        self.newborns.len() + self.toddlers.len() + self.teenagers.len()
    }

    /// No hooks for any brand
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

lenient_record! {
    /// Hook generation statistics reported by the agent
    pub struct GenerationStats {
        pub total_hooks: u64,
        pub high_risk_count: u64,
        pub medium_risk_count: u64,
        pub low_risk_count: u64,
    }
}

lenient_record! {
    /// hookLab result
    pub struct HookBatch {
        pub hooks_by_brand: HooksByBrand,
        pub generation_stats: GenerationStats,
    }
}

lenient_record! {
    /// Platform captions for a script
    pub struct Captions {
        pub instagram: String,
        pub tiktok: String,
        pub youtube_shorts: String,
        pub facebook: String,
    }
}

lenient_record! {
    /// Video script
    pub struct Script {
        pub script_id: String,
        pub hook_text: String,
        pub brand: String,
        pub full_script: String,
        pub hook_section: String,
        pub core_insight: String,
        pub say_this_instead: String,
        pub cta_text: String,
        pub cta_type: String,
        pub duration_estimate: String,
        pub compliance_status: String,
        pub captions: Captions,
    }
}

lenient_record! {
    /// scriptEngine result
    pub struct ScriptBatch {
        pub scripts: Vec<Script>,
        pub total_scripts: u64,
        pub brand_breakdown: BTreeMap<String, u64>,
    }
}

lenient_record! {
    /// Voiceover settings
    pub struct VoiceConfig {
        pub voice_id: String,
        pub tone: String,
        pub speed: String,
    }
}

lenient_record! {
    /// Output format settings
    pub struct RenderSpecs {
        pub resolution: String,
        pub duration: String,
        pub subtitle_style: String,
        pub has_outro: bool,
    }
}

lenient_record! {
    /// Render job
    pub struct RenderJob {
        pub job_id: String,
        pub script_id: String,
        pub brand: String,
        /// `completed`, `rendering`, `queued` or `failed`
        pub status: String,
        pub voice_config: VoiceConfig,
        pub render_specs: RenderSpecs,
        pub asset_url: String,
        pub fallback_pack: String,
        pub error_message: String,
    }
}

lenient_record! {
    /// Render batch totals
    pub struct BatchSummary {
        pub total_jobs: u64,
        pub completed: u64,
        pub failed: u64,
        pub queued: u64,
    }
}

lenient_record! {
    /// production result
    pub struct RenderBatch {
        pub render_jobs: Vec<RenderJob>,
        pub batch_summary: BatchSummary,
    }
}

lenient_record! {
    /// Scheduled social post
    pub struct ScheduledPost {
        pub post_id: String,
        pub brand: String,
        pub platform: String,
        /// RFC 3339 timestamp as produced by the agent
        pub scheduled_time: String,
        pub caption: String,
        pub hashtags: String,
        pub video_reference: String,
        pub status: String,
    }
}

lenient_record! {
    /// Distribution totals
    pub struct DistributionSummary {
        pub total_posts: u64,
        pub by_brand: BTreeMap<String, u64>,
        pub by_platform: BTreeMap<String, u64>,
    }
}

lenient_record! {
    /// distribution result
    pub struct DistributionPlan {
        pub schedule: Vec<ScheduledPost>,
        pub distribution_summary: DistributionSummary,
    }
}

lenient_record! {
    /// Headline performance indicators
    pub struct Kpis {
        pub saves_per_1k: f64,
        pub shares_per_1k: f64,
        pub follows_per_1k: f64,
        pub completion_rate: f64,
        pub quiz_ctr: f64,
        pub rpm: f64,
    }
}

lenient_record! {
    /// Top performing post
    pub struct Winner {
        pub post_id: String,
        pub hook: String,
        pub brand: String,
        pub weighted_score: f64,
        pub top_metric: String,
    }
}

lenient_record! {
    /// Under-performing post
    pub struct Loser {
        pub post_id: String,
        pub hook: String,
        pub brand: String,
        pub weighted_score: f64,
        pub issue: String,
    }
}

lenient_record! {
    /// Weekly recommendations
    pub struct Recommendations {
        pub double_down: Vec<String>,
        pub adjust: Vec<String>,
        pub emerging: Vec<String>,
    }
}

lenient_record! {
    /// analytics result
    pub struct AnalyticsReport {
        pub kpis: Kpis,
        pub winners: Vec<Winner>,
        pub losers: Vec<Loser>,
        pub recommendations: Recommendations,
        /// Markdown
        pub weekly_summary: String,
        pub next_week_briefs: Vec<String>,
    }
}

lenient_record! {
    /// Quiz funnel metrics for one brand
    pub struct FunnelMetrics {
        pub quiz_ctr: f64,
        pub completion_rate: f64,
        pub optin_rate: f64,
        pub conversion_rate: f64,
        pub weakest_point: String,
    }
}

lenient_record! {
    /// Funnel metrics keyed by brand
    pub struct FunnelAnalysis {
        pub newborns: FunnelMetrics,
        pub toddlers: FunnelMetrics,
        pub teenagers: FunnelMetrics,
    }
}

impl FunnelAnalysis {
    /// Metrics for one brand
    #[must_use]
    pub fn for_brand(&self, brand: Brand) -> &FunnelMetrics {
        match brand {
            Brand::Newborns => &self.newborns,
            Brand::Toddlers => &self.toddlers,
            Brand::Teenagers => &self.teenagers,
        }
    }
}

lenient_record! {
    /// Proposed A/B test
    pub struct AbTest {
        pub test_id: String,
        pub brand: String,
        pub funnel_stage: String,
        pub control_description: String,
        pub variant_description: String,
        pub expected_impact: String,
        pub sample_size: u64,
        pub duration_days: u64,
    }
}

lenient_record! {
    /// funnelOptimizer result
    pub struct FunnelReport {
        pub funnel_analysis: FunnelAnalysis,
        pub ab_tests: Vec<AbTest>,
        /// Markdown
        pub optimization_summary: String,
    }
}

macro_rules! branded_by {
    ($field:ident => $($ty:ty),+) => {
        $(
            impl Branded for $ty {
                fn brand_key(&self) -> Option<&str> {
                    Some(self.$field.as_str())
                }
            }
        )+
    };
}

branded_by!(brand => Script, RenderJob, ScheduledPost, Winner, Loser, AbTest);
branded_by!(target_niche => TrendBrief);

/// A stage result, decoded into the record family of its stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", content = "result", rename_all = "camelCase")]
pub enum StageOutput {
    /// trendScout
    TrendScout(TrendReport),
    /// hookLab
    HookLab(HookBatch),
    /// scriptEngine
    ScriptEngine(ScriptBatch),
    /// production
    Production(RenderBatch),
    /// distribution
    Distribution(DistributionPlan),
    /// analytics
    Analytics(AnalyticsReport),
    /// funnelOptimizer
    FunnelOptimizer(FunnelReport),
}

impl StageOutput {
    /// Decode a raw result for `stage`. Never fails.
    #[must_use]
    pub fn decode(stage: StageId, value: &Value) -> Self {
        let value = value.clone();
        match stage {
            StageId::TrendScout => Self::TrendScout(Lenient::from_json(value)),
            StageId::HookLab => Self::HookLab(Lenient::from_json(value)),
            StageId::ScriptEngine => Self::ScriptEngine(Lenient::from_json(value)),
            StageId::Production => Self::Production(Lenient::from_json(value)),
            StageId::Distribution => Self::Distribution(Lenient::from_json(value)),
            StageId::Analytics => Self::Analytics(Lenient::from_json(value)),
            StageId::FunnelOptimizer => Self::FunnelOptimizer(Lenient::from_json(value)),
        }
    }

    /// Stage this output belongs to
    #[must_use]
    pub fn stage(&self) -> StageId {
        match self {
            Self::TrendScout(_) => StageId::TrendScout,
            Self::HookLab(_) => StageId::HookLab,
            Self::ScriptEngine(_) => StageId::ScriptEngine,
            Self::Production(_) => StageId::Production,
            Self::Distribution(_) => StageId::Distribution,
            Self::Analytics(_) => StageId::Analytics,
            Self::FunnelOptimizer(_) => StageId::FunnelOptimizer,
        }
    }
}

/// Decode a raw result into a specific record family
#[must_use]
pub fn decode<T: Lenient>(value: Option<&Value>) -> T {
    value.cloned().map(T::from_json).unwrap_or_default()
}
