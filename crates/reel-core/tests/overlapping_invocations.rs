//! Overlapping invocations and completion ordering

use reel_core::{AgentReply, PipelineEvent, StageOrchestrator, StageStatus, StudioConfig};
use reel_stages::{StageId, StageRegistry};
use reel_test_utils::{orchestrator, orchestrator_with, GatedInvoker};
use serde_json::json;
use tokio_test::assert_ok;

async fn wait_until(cond: impl Fn() -> bool) {
    while !cond() {
        tokio::task::yield_now().await;
    }
}

/// Start two invocations of hookLab, resolve the newer one first, then the older.
async fn resolve_out_of_order(
    orch: &StageOrchestrator,
    ctl: &mut reel_test_utils::GateController,
) {
    let older = ctl.next_call().await;
    let newer = ctl.next_call().await;

    newer.resolve(AgentReply::success(json!({"from": "newer"})));
    wait_until(|| orch.run(StageId::HookLab).status != StageStatus::Running).await;
    older.resolve(AgentReply::success(json!({"from": "older"})));
}

#[tokio::test]
async fn last_to_resolve_wins_by_default() {
    let (gate, mut ctl) = GatedInvoker::new();
    let orch = orchestrator(gate);

    let (first, second, ()) = tokio::join!(
        orch.invoke(StageId::HookLab),
        orch.invoke(StageId::HookLab),
        resolve_out_of_order(&orch, &mut ctl),
    );

    assert_eq!(second.data, Some(json!({"from": "newer"})));
    assert_eq!(first.data, Some(json!({"from": "older"})));
    let run = orch.run(StageId::HookLab);
    assert_eq!(run.status, StageStatus::Succeeded);
    assert_eq!(run.data, Some(json!({"from": "older"})));
}

#[tokio::test]
async fn stale_completion_is_discarded_when_fenced() {
    let (gate, mut ctl) = GatedInvoker::new();
    let orch = orchestrator_with(&StudioConfig::new().with_stale_rejection(true), gate);
    let mut rx = orch.subscribe();

    let (first, _, ()) = tokio::join!(
        orch.invoke(StageId::HookLab),
        orch.invoke(StageId::HookLab),
        resolve_out_of_order(&orch, &mut ctl),
    );

    assert_eq!(first.data, Some(json!({"from": "newer"})));
    assert_eq!(orch.run(StageId::HookLab).data, Some(json!({"from": "newer"})));

    let mut discarded = 0;
    while let Ok(event) = rx.try_recv() {
        if let PipelineEvent::Discarded { stage, .. } = event {
            assert_eq!(stage, StageId::HookLab);
            discarded += 1;
        }
    }
    assert_eq!(discarded, 1);
}

#[tokio::test]
async fn running_keeps_previous_data() {
    let (gate, mut ctl) = GatedInvoker::new();
    let orch = orchestrator(gate);

    let driver = async {
        ctl.next_call()
            .await
            .resolve(AgentReply::success(json!({"round": 1})));
        wait_until(|| orch.run(StageId::Production).status == StageStatus::Succeeded).await;
    };
    tokio::join!(orch.invoke(StageId::Production), driver);

    let driver = async {
        let call = ctl.next_call().await;
        let run = orch.run(StageId::Production);
        assert_eq!(run.status, StageStatus::Running);
        assert_eq!(run.data, Some(json!({"round": 1})));
        assert!(run.error.is_none());
        call.resolve(AgentReply::failure("render farm offline"));
    };
    let (run, ()) = tokio::join!(orch.invoke(StageId::Production), driver);

    assert_eq!(run.status, StageStatus::Failed);
    assert_eq!(run.data, Some(json!({"round": 1})));
}

#[tokio::test]
async fn active_agent_tracks_latest_outstanding() {
    let (gate, mut ctl) = GatedInvoker::new();
    let orch = orchestrator(gate);
    let registry = StageRegistry::with_defaults();

    let driver = async {
        let trends = ctl.next_call().await;
        let analytics = ctl.next_call().await;
        assert_eq!(
            orch.active_agent().as_ref(),
            Some(registry.agent(StageId::Analytics))
        );
        assert_eq!(orch.snapshot().running().count(), 2);

        analytics.resolve(AgentReply::success(json!({})));
        wait_until(|| orch.run(StageId::Analytics).status == StageStatus::Succeeded).await;
        assert_eq!(
            orch.active_agent().as_ref(),
            Some(registry.agent(StageId::TrendScout))
        );
        trends.resolve(AgentReply::success(json!({})));
    };

    tokio::join!(
        orch.invoke(StageId::TrendScout),
        async {
            // Start analytics only once trendScout is outstanding.
            wait_until(|| orch.run(StageId::TrendScout).is_running()).await;
            orch.invoke(StageId::Analytics).await
        },
        driver,
    );
    assert!(orch.active_agent().is_none());
}

#[tokio::test]
async fn invocations_run_on_spawned_tasks() {
    let (gate, mut ctl) = GatedInvoker::new();
    let orch = std::sync::Arc::new(orchestrator(gate));

    let handle = tokio::spawn({
        let orch = orch.clone();
        async move { orch.invoke(StageId::Distribution).await }
    });
    ctl.next_call()
        .await
        .resolve(AgentReply::success(json!({"schedule": []})));

    let run = assert_ok!(handle.await);
    assert_eq!(run.status, StageStatus::Succeeded);
}

#[tokio::test]
async fn dropped_invocation_is_no_longer_active() {
    let (gate, mut ctl) = GatedInvoker::new();
    let orch = orchestrator(gate);
    let registry = StageRegistry::with_defaults();

    let held = tokio::select! {
        _ = orch.invoke(StageId::Distribution) => panic!("unresolved call completed"),
        call = ctl.next_call() => call,
    };
    assert_eq!(&held.agent, registry.agent(StageId::Distribution));

    assert!(orch.active_agent().is_none());
    assert_eq!(orch.run(StageId::Distribution).status, StageStatus::Running);

    // A later invocation still settles the stage.
    drop(held);
    let driver = async {
        ctl.next_call()
            .await
            .resolve(AgentReply::success(json!({"schedule": []})));
    };
    let (run, ()) = tokio::join!(orch.invoke(StageId::Distribution), driver);
    assert_eq!(run.status, StageStatus::Succeeded);
    assert!(orch.active_agent().is_none());
}
