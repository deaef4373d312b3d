//! Seed datasets
//!
//! Fixed sample results, one per stage, served by the fallback resolver when
//! sample mode is on and a stage has no live result. The datasets are embedded
//! JSON under `seeds/`.

use crate::stage::StageId;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::Object(Map::new()))
}

static TREND_SCOUT: Lazy<Value> = Lazy::new(|| parse(include_str!("../seeds/trend_scout.json")));
static HOOK_LAB: Lazy<Value> = Lazy::new(|| parse(include_str!("../seeds/hook_lab.json")));
static SCRIPT_ENGINE: Lazy<Value> =
    Lazy::new(|| parse(include_str!("../seeds/script_engine.json")));
static PRODUCTION: Lazy<Value> = Lazy::new(|| parse(include_str!("../seeds/production.json")));
static DISTRIBUTION: Lazy<Value> =
    Lazy::new(|| parse(include_str!("../seeds/distribution.json")));
static ANALYTICS: Lazy<Value> = Lazy::new(|| parse(include_str!("../seeds/analytics.json")));
static FUNNEL_OPTIMIZER: Lazy<Value> =
    Lazy::new(|| parse(include_str!("../seeds/funnel_optimizer.json")));

/// Seed dataset for a stage
#[must_use]
pub fn seed_output(stage: StageId) -> &'static Value {
    match stage {
        StageId::TrendScout => &*TREND_SCOUT,
        StageId::HookLab => &*HOOK_LAB,
        StageId::ScriptEngine => &*SCRIPT_ENGINE,
        StageId::Production => &*PRODUCTION,
        StageId::Distribution => &*DISTRIBUTION,
        StageId::Analytics => &*ANALYTICS,
        StageId::FunnelOptimizer => &*FUNNEL_OPTIMIZER,
    }
}
