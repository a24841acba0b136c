//! CLI entry point for story rule files.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `story_graph_core` linkage.
//! - Load a rule file, report its graph shape, or round-trip it through the
//!   in-memory graph with an empty authoring delta.
//!
//! # Invariants
//! - Exit code is 0 on success and 1 on failure; failures go to stderr.
//! - Logging is enabled only when `STORY_GRAPH_LOG_DIR` is set.

use log::info;
use std::path::Path;
use std::process::ExitCode;
use story_graph_core::{
    AuthoringState, CancelSignal, InMemoryGraph, LoggingConfig, StorySession,
};

const USAGE: &str = "usage: story_graph_cli <ping | check <file> | roundtrip <file>>";

fn main() -> ExitCode {
    if let Some(config) = LoggingConfig::from_env() {
        if let Err(err) = config.init() {
            eprintln!("logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<String, String> {
    match args {
        [command] if command == "ping" => Ok(format!(
            "story_graph_core ping={} version={}",
            story_graph_core::ping(),
            story_graph_core::core_version()
        )),
        [command, file] if command == "check" => check(Path::new(file)),
        [command, file] if command == "roundtrip" => roundtrip(Path::new(file)),
        _ => Err(USAGE.to_string()),
    }
}

fn check(path: &Path) -> Result<String, String> {
    let mut session = StorySession::new();
    let mut graph = InMemoryGraph::new();
    let projection = session
        .load_file(path, &mut graph, &CancelSignal::new())
        .map_err(|err| err.to_string())?;

    info!(
        "event=cli_check module=cli status=ok rules={}",
        session.rules().len()
    );
    Ok(format!(
        "rules={} scenes={} transitions={}",
        session.rules().len(),
        // The scene class declaration is not a scene.
        projection.entities.len().saturating_sub(1),
        projection.relations.len()
    ))
}

fn roundtrip(path: &Path) -> Result<String, String> {
    let mut session = StorySession::new();
    let mut graph = InMemoryGraph::new();
    session
        .load_file(path, &mut graph, &CancelSignal::new())
        .map_err(|err| err.to_string())?;

    let mut state = AuthoringState::empty();
    let outcome = session
        .save(&mut state, &mut graph)
        .map_err(|err| err.to_string())?;
    info!(
        "event=cli_roundtrip module=cli status=ok rules={}",
        outcome.export.rules.len()
    );
    Ok(outcome.export.json)
}
