//! `reel` - offline driver for the Reel Studio pipeline

mod render;
mod replay;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use reel_core::views::{self, HookFilter, SectionView};
use reel_core::{
    ApprovalStatus, PipelineEvent, RenderFault, StageOrchestrator, StudioConfig, ViewBoundary,
};
use reel_stages::{BrandScope, StageId};
use replay::SeedReplayInvoker;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn stage_arg() -> Arg {
    Arg::new("stage")
        .required(true)
        .value_parser(|s: &str| s.parse::<StageId>())
        .help("Stage id (trendScout, hookLab, scriptEngine, production, distribution, analytics, funnelOptimizer)")
}

fn scope_arg() -> Arg {
    Arg::new("scope")
        .long("scope")
        .value_parser(|s: &str| s.parse::<BrandScope>())
        .help("Brand scope: all, newborns, toddlers or teenagers")
}

fn approve_arg() -> Arg {
    Arg::new("approve")
        .long("approve")
        .action(ArgAction::Append)
        .value_name("KEY")
        .help("Approve a hook by key (hook-0, hook-1, ...); repeatable")
}

fn fallback_arg() -> Arg {
    Arg::new("fallback")
        .long("fallback")
        .action(ArgAction::SetTrue)
        .help("Serve sample data for stages without a result")
}

fn cli() -> Command {
    Command::new("reel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reel Studio pipeline driver")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML studio config"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand(Command::new("stages").about("List pipeline stages and their agents"))
        .subcommand(
            Command::new("compose")
                .about("Print the request a stage would send")
                .arg(stage_arg())
                .arg(scope_arg())
                .arg(approve_arg())
                .arg(fallback_arg()),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run every stage against replayed sample results")
                .arg(scope_arg())
                .arg(approve_arg())
                .arg(
                    Arg::new("fail")
                        .long("fail")
                        .action(ArgAction::Append)
                        .value_parser(|s: &str| s.parse::<StageId>())
                        .help("Make a stage's agent call fail; repeatable"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("progress")
                .about("Print pipeline progress counts")
                .arg(scope_arg())
                .arg(fallback_arg()),
        )
        .subcommand(
            Command::new("view")
                .about("Print a dashboard section as JSON")
                .arg(stage_arg())
                .arg(scope_arg())
                .arg(fallback_arg())
                .arg(
                    Arg::new("risk")
                        .long("risk")
                        .help("Hook bank: compliance risk filter"),
                )
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_parser(["pending", "approved", "rejected"])
                        .help("Hook bank: approval status filter"),
                )
                .arg(approve_arg()),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<StudioConfig> {
    let path = matches.get_one::<PathBuf>("config");
    StudioConfig::resolve(path.map(PathBuf::as_path)).with_context(|| match path {
        Some(path) => format!("loading config from {}", path.display()),
        None => "loading default config".to_string(),
    })
}

/// Orchestrator over the replay invoker with scope, sample mode and
/// approvals taken from the command line
fn orchestrator(
    config: &StudioConfig,
    args: &ArgMatches,
    failing: Vec<StageId>,
) -> anyhow::Result<StageOrchestrator> {
    let invoker = SeedReplayInvoker::new(config.registry()?).failing(failing);
    let orch = StageOrchestrator::from_config(config, Arc::new(invoker))?;

    if let Some(scope) = args.try_get_one::<BrandScope>("scope").ok().flatten() {
        orch.set_scope(*scope);
    }
    if args.try_get_one::<bool>("fallback").ok().flatten() == Some(&true) {
        orch.set_fallback_mode(true);
    }
    if let Some(keys) = args.try_get_many::<String>("approve").ok().flatten() {
        for key in keys {
            orch.approve(key);
        }
    }
    Ok(orch)
}

fn drain(events: &mut broadcast::Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event buffer overflowed");
            }
            Err(_) => break,
        }
    }
    drained
}

fn compose(config: &StudioConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let stage = *args.get_one::<StageId>("stage").context("stage is required")?;
    let orch = orchestrator(config, args, Vec::new())?;
    let input = orch.compose(stage);
    println!("{}", input.prompt);
    tracing::info!(%stage, items = input.items.len(), "composed");
    Ok(())
}

async fn simulate(config: &StudioConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let failing: Vec<StageId> = args
        .get_many::<StageId>("fail")
        .map(|stages| stages.copied().collect())
        .unwrap_or_default();
    let orch = orchestrator(config, args, failing)?;
    let mut events = orch.subscribe();

    orch.invoke_chain(StageId::TrendScout).await;
    orch.invoke_all(&[StageId::Analytics, StageId::FunnelOptimizer])
        .await;

    let events = drain(&mut events);
    let state = orch.state();
    let progress = orch.progress();

    if args.get_flag("json") {
        let report = serde_json::json!({
            "events": events,
            "runs": state.snapshot,
            "approvals": state.ledger,
            "progress": progress,
            "brands": reel_core::brand_breakdown(&state),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::banners(&events);
        render::runs(&state.snapshot);
        render::progress(&progress, &reel_core::brand_breakdown(&state));
    }
    Ok(())
}

fn progress(config: &StudioConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let orch = orchestrator(config, args, Vec::new())?;
    let state = orch.state();
    render::progress(&orch.progress(), &reel_core::brand_breakdown(&state));
    Ok(())
}

fn view(config: &StudioConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let stage = *args.get_one::<StageId>("stage").context("stage is required")?;
    let orch = orchestrator(config, args, Vec::new())?;
    let state = orch.state();

    let section = if stage == StageId::HookLab {
        let filter = HookFilter {
            risk: args.get_one::<String>("risk").cloned(),
            status: args.get_one::<String>("status").map(|s| match s.as_str() {
                "approved" => ApprovalStatus::Approved,
                "rejected" => ApprovalStatus::Rejected,
                _ => ApprovalStatus::Pending,
            }),
        };
        views::hook_bank(&state, &filter).map(SectionView::HookBank)
    } else {
        views::section(&state, stage)
    };

    let Some(section) = section else {
        println!("{} has no output yet; run it or pass --fallback", stage.section_title());
        return Ok(());
    };

    let mut boundary = ViewBoundary::new();
    let text = boundary.render(|| {
        serde_json::to_string_pretty(&section).map_err(|err| RenderFault::new(err.to_string()))
    })?;
    println!("{text}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("stages", _)) => render::stages(&config.registry()?),
        Some(("compose", args)) => compose(&config, args)?,
        Some(("simulate", args)) => simulate(&config, args).await?,
        Some(("progress", args)) => progress(&config, args)?,
        Some(("view", args)) => view(&config, args)?,
        _ => cli().print_help()?,
    }
    Ok(())
}
