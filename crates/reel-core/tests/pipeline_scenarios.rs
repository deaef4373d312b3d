//! End-to-end orchestrator scenarios

use pretty_assertions::assert_eq;
use reel_core::{
    views, ApprovalStatus, PipelineEvent, Severity, StageStatus, StudioConfig, ViewBoundary,
};
use reel_core::{HookFilter, RenderFault};
use reel_stages::{BrandScope, StageId};
use reel_test_utils::{
    hook_output, hook_texts, orchestrator, orchestrator_with, script_output, trend_output,
    ScriptedInvoker,
};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn trend_briefs_reach_hook_lab_unfiltered() {
    let invoker = Arc::new(ScriptedInvoker::default().succeed(StageId::TrendScout, trend_output(5)));
    let orch = reel_core::StageOrchestrator::new(invoker.clone());

    orch.invoke(StageId::TrendScout).await;
    orch.set_scope(BrandScope::Toddlers);
    let input = orch.compose(StageId::HookLab);
    assert_eq!(input.items.len(), 5);

    orch.invoke(StageId::HookLab).await;
    let prompts = invoker.prompts_for(StageId::HookLab);
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0], input.prompt);
    for i in 0..5 {
        assert!(prompts[0].contains(&format!("trend-{i}")));
    }
}

#[tokio::test]
async fn hook_lab_failure_leaves_no_data() {
    let orch = orchestrator(ScriptedInvoker::default().fail(StageId::HookLab, "rate limited"));

    let run = orch.invoke(StageId::HookLab).await;
    assert_eq!(run.status, StageStatus::Failed);
    assert_eq!(run.data, None);
    assert_eq!(run.error.as_deref(), Some("rate limited"));
    assert_eq!(orch.run(StageId::TrendScout).status, StageStatus::Idle);
}

#[tokio::test]
async fn failure_keeps_earlier_result() {
    let orch = orchestrator(
        ScriptedInvoker::default()
            .succeed(StageId::ScriptEngine, script_output(&["newborns"]))
            .fail(StageId::ScriptEngine, ""),
    );

    orch.invoke(StageId::ScriptEngine).await;
    let run = orch.invoke(StageId::ScriptEngine).await;
    assert_eq!(run.status, StageStatus::Failed);
    assert_eq!(run.error.as_deref(), Some("Agent call failed"));
    assert_eq!(run.data, Some(script_output(&["newborns"])));
}

#[tokio::test]
async fn approved_hooks_feed_script_engine() {
    let invoker = Arc::new(ScriptedInvoker::default().succeed(StageId::HookLab, hook_output(2, 1, 1)));
    let orch = reel_core::StageOrchestrator::new(invoker.clone());
    orch.invoke(StageId::HookLab).await;

    assert_eq!(orch.approve("hook-0"), ApprovalStatus::Approved);
    assert_eq!(orch.approve("hook-2"), ApprovalStatus::Approved);
    orch.set_scope(BrandScope::Teenagers);

    let input = orch.compose(StageId::ScriptEngine);
    assert_eq!(hook_texts(&input.items), vec!["newborns-0", "toddlers-0"]);

    orch.invoke(StageId::ScriptEngine).await;
    assert_eq!(invoker.prompts_for(StageId::ScriptEngine), vec![input.prompt]);
}

#[tokio::test]
async fn no_approvals_forwards_first_ten() {
    let orch = orchestrator(ScriptedInvoker::default().succeed(StageId::HookLab, hook_output(4, 4, 4)));
    orch.invoke(StageId::HookLab).await;

    let input = orch.compose(StageId::ScriptEngine);
    assert_eq!(input.items.len(), 10);
    assert_eq!(hook_texts(&input.items)[4], "toddlers-0");
}

#[tokio::test]
async fn sample_mode_feeds_composition() {
    let orch = orchestrator(ScriptedInvoker::default());
    assert!(orch.compose(StageId::HookLab).items.is_empty());

    orch.set_fallback_mode(true);
    assert_eq!(orch.compose(StageId::HookLab).items.len(), 5);
    assert_eq!(orch.compose(StageId::ScriptEngine).items.len(), 7);

    // A live result, even an empty one, replaces the seed.
    orch.invoke(StageId::TrendScout).await;
    assert_eq!(orch.effective_output(StageId::TrendScout), Some(json!({})));
    assert!(orch.compose(StageId::HookLab).items.is_empty());
}

#[tokio::test]
async fn chain_stops_at_first_failure() {
    let invoker = Arc::new(
        ScriptedInvoker::default()
            .succeed(StageId::HookLab, hook_output(1, 1, 1))
            .fail(StageId::ScriptEngine, "quota exceeded"),
    );
    let orch = reel_core::StageOrchestrator::new(invoker.clone());

    let runs = orch.invoke_chain(StageId::HookLab).await;
    let statuses: Vec<_> = runs.iter().map(|(id, run)| (*id, run.status)).collect();
    assert_eq!(
        statuses,
        vec![
            (StageId::HookLab, StageStatus::Succeeded),
            (StageId::ScriptEngine, StageStatus::Failed),
        ]
    );
    assert!(invoker.prompts_for(StageId::Production).is_empty());
    assert_eq!(orch.run(StageId::Production).status, StageStatus::Idle);
}

#[tokio::test]
async fn full_chain_from_trend_scout() {
    let orch = orchestrator(ScriptedInvoker::default());
    let runs = orch.invoke_chain(StageId::TrendScout).await;
    let stages: Vec<_> = runs.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        stages,
        vec![
            StageId::TrendScout,
            StageId::HookLab,
            StageId::ScriptEngine,
            StageId::Production,
            StageId::Distribution,
        ]
    );
    assert!(runs.iter().all(|(_, r)| r.status == StageStatus::Succeeded));
}

#[tokio::test]
async fn independent_stages_run_together() {
    let orch = orchestrator(ScriptedInvoker::default().fail(StageId::FunnelOptimizer, "down"));
    let runs = orch
        .invoke_all(&[StageId::Analytics, StageId::FunnelOptimizer])
        .await;
    assert_eq!(runs[0].1.status, StageStatus::Succeeded);
    assert_eq!(runs[1].1.status, StageStatus::Failed);
}

#[tokio::test]
async fn events_carry_banner_text() {
    let orch = orchestrator(ScriptedInvoker::default().fail(StageId::Analytics, "timeout"));
    let mut rx = orch.subscribe();

    orch.invoke(StageId::TrendScout).await;
    orch.invoke(StageId::Analytics).await;
    orch.set_scope(BrandScope::Newborns);

    let mut banners = Vec::new();
    while let Ok(event) = rx.try_recv() {
        banners.push((event.severity(), event.message()));
    }
    assert_eq!(
        banners,
        vec![
            (Severity::Info, "Running trendScout...".to_string()),
            (Severity::Success, "trendScout completed successfully".to_string()),
            (Severity::Info, "Running analytics...".to_string()),
            (Severity::Error, "timeout".to_string()),
            (Severity::Info, "Brand scope set to newborns".to_string()),
        ]
    );
}

#[tokio::test]
async fn configured_agents_are_called() {
    let config = StudioConfig::new().with_agent(StageId::Production, "render-farm");
    let invoker = Arc::new(ScriptedInvoker::new(config.registry().unwrap()));
    let orch = reel_core::StageOrchestrator::from_config(&config, invoker.clone()).unwrap();

    orch.invoke(StageId::Production).await;
    let calls = invoker.calls();
    assert_eq!(calls[0].agent.as_str(), "render-farm");
    assert_eq!(calls[0].stage, Some(StageId::Production));
}

#[tokio::test]
async fn initial_state_comes_from_config() {
    let config = StudioConfig::new()
        .with_fallback(true)
        .with_scope(BrandScope::Teenagers)
        .with_script_fallback_limit(3);
    let orch = orchestrator_with(&config, ScriptedInvoker::default());

    assert_eq!(orch.scope(), BrandScope::Teenagers);
    assert!(orch.fallback_enabled());
    assert_eq!(orch.compose(StageId::ScriptEngine).items.len(), 3);
    assert_eq!(orch.progress().posts, 42);
}

#[tokio::test]
async fn boundary_reset_leaves_pipeline_untouched() {
    let orch = orchestrator(ScriptedInvoker::default().succeed(StageId::HookLab, hook_output(1, 0, 0)));
    orch.invoke(StageId::HookLab).await;
    orch.approve("hook-0");
    let before = orch.state();

    let mut boundary = ViewBoundary::new();
    let faulted = boundary.render(|| -> Result<(), RenderFault> { Err(RenderFault::new("boom")) });
    assert!(faulted.is_err());
    boundary.reset();

    assert_eq!(orch.state(), before);
    let view = boundary
        .render(|| {
            views::hook_bank(&orch.state(), &HookFilter::default())
                .ok_or_else(|| RenderFault::new("no hooks"))
        })
        .unwrap();
    assert_eq!(view.rows[0].status, ApprovalStatus::Approved);
}

#[tokio::test]
async fn scope_change_is_published() {
    let orch = orchestrator(ScriptedInvoker::default());
    let mut rx = orch.subscribe();
    orch.set_fallback_mode(true);
    assert_eq!(
        rx.recv().await.unwrap(),
        PipelineEvent::FallbackModeChanged { enabled: true }
    );
}
