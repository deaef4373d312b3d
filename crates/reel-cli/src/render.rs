//! Plain-text output

use reel_core::{BrandTally, PipelineEvent, PipelineProgress, PipelineSnapshot, Severity};
use reel_stages::{Stage, StageRegistry};

pub(crate) fn stages(registry: &StageRegistry) {
    println!(
        "{:<16} {:<18} {:<20} {:<22} {:<14} agent",
        "stage", "name", "action", "section", "input from"
    );
    for stage in registry.iter() {
        println!("{}", stage_row(stage));
    }
}

fn stage_row(stage: &Stage) -> String {
    let upstream = stage.depends_on.map_or("-", |id| id.as_str());
    format!(
        "{:<16} {:<18} {:<20} {:<22} {:<14} {}",
        stage.id.as_str(),
        stage.id.display_name(),
        stage.id.action_label(),
        stage.id.section_title(),
        upstream,
        stage.agent
    )
}

pub(crate) fn banners(events: &[PipelineEvent]) {
    for event in events {
        let marker = match event.severity() {
            Severity::Info => "..",
            Severity::Success => "ok",
            Severity::Error => "!!",
        };
        println!("[{marker}] {}", event.message());
    }
}

pub(crate) fn runs(snapshot: &PipelineSnapshot) {
    println!();
    println!("Stage runs:");
    for (id, run) in snapshot.iter() {
        let finished = run
            .finished_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        match &run.error {
            Some(error) => println!("  {:<16} {:<10} {finished}  {error}", id.as_str(), run.status),
            None => println!("  {:<16} {:<10} {finished}", id.as_str(), run.status),
        }
    }
}

pub(crate) fn progress(progress: &PipelineProgress, brands: &[BrandTally]) {
    println!();
    println!("Pipeline progress:");
    for (_, label, count) in progress.iter() {
        println!("  {label:<10} {count}");
    }
    println!();
    println!("By brand:");
    println!("  {:<10} {:>6} {:>8} {:>6}", "brand", "hooks", "scripts", "posts");
    for tally in brands {
        println!(
            "  {:<10} {:>6} {:>8} {:>6}",
            tally.brand.label(),
            tally.hooks,
            tally.scripts,
            tally.posts
        );
    }
}
