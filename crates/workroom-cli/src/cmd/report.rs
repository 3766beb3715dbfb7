use crate::output;
use anyhow::Context;
use serde_json::json;
use std::path::Path;
use workroom_core::automation::AutomationReport;
use workroom_core::error::WorkroomError;
use workroom_core::event::{DataEvent, SolutionTier};
use workroom_core::rca::{RcaReport, Solution};
use workroom_core::requirements::{EpicNode, RequirementsTree, StoryNode};
use workroom_core::session_log::{self, SessionManifest};
use workroom_core::test_report::TestReport;

pub fn run(root: &Path, session_id: &str, view: &str, json: bool) -> anyhow::Result<()> {
    let manifest = session_log::load_manifest(root, session_id)?;
    let events =
        session_log::load_events(root, session_id).context("failed to load session events")?;

    match view {
        "tests" => tests(&events, json),
        "requirements" => requirements(&events, json),
        "rca" => rca(&events, json),
        "automation" => automation(&events, json),
        "summary" => summary(&manifest, &events, json),
        other => Err(WorkroomError::UnknownReport(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// tests
// ---------------------------------------------------------------------------

fn tests(events: &[DataEvent], json: bool) -> anyhow::Result<()> {
    let report = TestReport::from_events(events);

    if json {
        let sources: Vec<_> = report
            .sources
            .iter()
            .map(|group| {
                json!({
                    "artifact_id": group.artifact_id,
                    "source": group.source,
                    "buckets": group
                        .buckets()
                        .map(|(kind, cases)| json!({
                            "kind": kind.as_str(),
                            "cases": cases,
                        }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        return output::print_json(&json!({
            "total_cases": report.total_cases(),
            "sources": sources,
            "unassigned": report.unassigned(),
        }));
    }

    println!(
        "TEST REPORT  {} case(s) across {} source(s)",
        report.total_cases(),
        report.sources.len()
    );
    for group in &report.sources {
        match &group.source.provider {
            Some(provider) => println!("\nSOURCE {} [{provider}]", group.source.name),
            None => println!("\nSOURCE {}", group.source.name),
        }
        for (kind, cases) in group.buckets() {
            println!("  {} ({})", kind, cases.len());
            for case in cases {
                println!("    {:<10} {}", case.id, case.title);
            }
        }
    }
    if !report.unassigned().is_empty() {
        println!("\nUNASSIGNED ({})", report.unassigned().len());
        for case in report.unassigned() {
            println!("    {:<10} {}", case.id, case.title);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// requirements
// ---------------------------------------------------------------------------

fn requirements(events: &[DataEvent], json: bool) -> anyhow::Result<()> {
    let tree = RequirementsTree::from_events(events);

    if json {
        let epics: Vec<_> = tree.epics.iter().map(epic_json).collect();
        let orphan_stories: Vec<_> = tree.orphan_stories.iter().map(story_json).collect();
        return output::print_json(&json!({
            "counts": tree.counts(),
            "epics": epics,
            "orphan_stories": orphan_stories,
            "orphan_tasks": tree.orphan_tasks,
        }));
    }

    let counts = tree.counts();
    println!(
        "REQUIREMENTS  {} epic(s), {} story(ies), {} task(s), {} orphan(s)",
        counts.epics, counts.stories, counts.tasks, counts.orphans
    );
    if tree.is_empty() {
        println!("\nNo requirements in this session.");
        return Ok(());
    }

    for node in &tree.epics {
        println!("\nEPIC {}  {}", node.epic.id, node.epic.title);
        for story in &node.stories {
            print_story(story);
        }
    }
    if !tree.orphan_stories.is_empty() {
        println!("\nSTORIES WITHOUT AN EPIC");
        for story in &tree.orphan_stories {
            print_story(story);
        }
    }
    if !tree.orphan_tasks.is_empty() {
        println!("\nTASKS WITHOUT A STORY");
        for task in &tree.orphan_tasks {
            println!("  {}  {}", task.id, task.title);
        }
    }
    Ok(())
}

fn print_story(node: &StoryNode) {
    println!("  STORY {}  {}", node.story.id, node.story.title);
    for task in &node.tasks {
        println!("    TASK {}  {}", task.id, task.title);
    }
}

fn epic_json(node: &EpicNode) -> serde_json::Value {
    json!({
        "epic": node.epic,
        "stories": node.stories.iter().map(story_json).collect::<Vec<_>>(),
    })
}

fn story_json(node: &StoryNode) -> serde_json::Value {
    json!({
        "story": node.story,
        "tasks": node.tasks,
    })
}

// ---------------------------------------------------------------------------
// rca
// ---------------------------------------------------------------------------

fn rca(events: &[DataEvent], json: bool) -> anyhow::Result<()> {
    let report = RcaReport::from_events(events);

    if json {
        let tiers: Vec<_> = report
            .tiers()
            .iter()
            .map(|(tier, solutions)| {
                json!({
                    "tier": tier.as_str(),
                    "solutions": solutions.iter().map(solution_json).collect::<Vec<_>>(),
                })
            })
            .collect();
        let dropped: Vec<_> = report.dropped_solutions().iter().map(solution_json).collect();
        return output::print_json(&json!({
            "index": report.index,
            "incident": report.incident,
            "tiers": tiers,
            "dropped": dropped,
        }));
    }

    if report.is_empty() {
        println!("No root-cause analysis in this session.");
        return Ok(());
    }

    if let Some(index) = &report.index {
        match &index.severity {
            Some(severity) => println!("INCIDENT {} [{severity}]", index.title),
            None => println!("INCIDENT {}", index.title),
        }
        if !index.summary.is_empty() {
            println!("  {}", index.summary);
        }
        if !index.services.is_empty() {
            println!("  services: {}", index.services.join(", "));
        }
    }

    if let Some(incident) = &report.incident {
        println!("\nIMPACT      {}", incident.impact);
        println!("ROOT CAUSE  {}", incident.root_cause);
        if let Some(at) = &incident.detected_at {
            println!("DETECTED    {at}");
        }
    }

    for (tier, solutions) in report.tiers() {
        println!("\n{} ({})", tier_heading(tier), solutions.len());
        for solution in solutions {
            println!("  {}  {}", solution.stub.id, solution.stub.title);
            if let Some(detail) = &solution.detail {
                if !detail.steps.is_empty() {
                    println!("      steps: {}", detail.steps.len());
                }
                if let Some(effort) = &detail.effort {
                    println!("      effort: {effort}");
                }
            }
        }
    }

    let dropped = report.dropped_solutions();
    if !dropped.is_empty() {
        println!("\nUNTIERED ({})", dropped.len());
        for solution in dropped {
            println!("  {}  {}", solution.stub.id, solution.stub.title);
        }
    }
    Ok(())
}

fn tier_heading(tier: SolutionTier) -> &'static str {
    match tier {
        SolutionTier::Immediate => "IMMEDIATE",
        SolutionTier::ShortTerm => "SHORT TERM",
        SolutionTier::LongTerm => "LONG TERM",
        SolutionTier::Unknown => "UNTIERED",
    }
}

fn solution_json(solution: &Solution) -> serde_json::Value {
    json!({
        "stub": solution.stub,
        "detail": solution.detail,
    })
}

// ---------------------------------------------------------------------------
// automation
// ---------------------------------------------------------------------------

fn automation(events: &[DataEvent], json: bool) -> anyhow::Result<()> {
    let report = AutomationReport::from_events(events);
    let counts = report.counts();

    if json {
        return output::print_json(&json!({
            "counts": counts,
            "files": report.files,
        }));
    }

    if report.is_empty() {
        println!("No files written in this session.");
        return Ok(());
    }

    println!(
        "AUTOMATION  {} created, {} updated, {} failed",
        counts.created, counts.updated, counts.failed
    );
    for file in &report.files {
        match file.bytes {
            Some(bytes) => println!(
                "  {:<8} {} ({bytes} bytes)",
                file.status.as_str(),
                file.path
            ),
            None => println!("  {:<8} {}", file.status.as_str(), file.path),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

fn summary(manifest: &SessionManifest, events: &[DataEvent], json: bool) -> anyhow::Result<()> {
    let tests = TestReport::from_events(events);
    let tree = RequirementsTree::from_events(events);
    let rca = RcaReport::from_events(events);
    let automation = AutomationReport::from_events(events);

    if json {
        return output::print_json(&json!({
            "session": {
                "id": manifest.id,
                "agent": manifest.agent.as_str(),
                "title": manifest.title,
                "status": manifest.status,
                "created_at": manifest.created_at,
                "updated_at": manifest.updated_at,
            },
            "events": events.len(),
            "test_cases": tests.total_cases(),
            "requirements": tree.counts(),
            "solutions": rca.total_solutions(),
            "files_written": automation.files.len(),
        }));
    }

    println!("SESSION {}", manifest.id);
    println!("  agent:   {}", manifest.agent);
    println!("  title:   {}", manifest.title);
    println!("  status:  {}", manifest.status);
    println!("  updated: {}", manifest.updated_at);

    println!("\nARTIFACTS  {} event(s)", events.len());
    if tests.total_cases() > 0 {
        println!("  test cases:   {}", tests.total_cases());
    }
    let counts = tree.counts();
    if counts.epics + counts.stories + counts.tasks + counts.orphans > 0 {
        println!(
            "  requirements: {} epic(s), {} story(ies), {} task(s)",
            counts.epics, counts.stories, counts.tasks
        );
    }
    if !rca.is_empty() {
        println!("  solutions:    {}", rca.total_solutions());
    }
    if !automation.is_empty() {
        println!("  files:        {}", automation.files.len());
    }
    Ok(())
}
