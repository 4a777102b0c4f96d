//! The real process launcher driving a shell stand-in for the engine.

#![cfg(unix)]

mod common;

use common::settle;
use std::sync::Arc;
use strictly_analysis::{
    Analyzer, EngineConfig, EngineLauncher, MatchController, ProcessLauncher, SessionState,
};
use tokio::io::AsyncReadExt;

fn shell(script: &str) -> EngineConfig {
    // The appended `analyze <position> ...` arguments become unused
    // positional parameters of the script.
    EngineConfig::default().with_command(vec![
        "sh".to_string(),
        "-c".to_string(),
        script.to_string(),
        "sh".to_string(),
    ])
}

#[tokio::test]
async fn test_position_and_budget_are_passed_to_engine() {
    let config = shell("echo \"$1 $2 $3 $4 $5 $6\" >&2")
        .with_time_limit("5s".to_string())
        .with_table_mem("1M".to_string());
    let launcher = ProcessLauncher::new(config);

    let handle = launcher.launch("X;pos").unwrap();
    let (_control, mut diagnostics) = handle.into_parts();
    let mut output = String::new();
    diagnostics.read_to_string(&mut output).await.unwrap();

    assert_eq!(output.trim(), "analyze X;pos --limit 5s --table-mem 1M");
}

#[tokio::test]
async fn test_missing_engine_fails_launch() {
    let config =
        EngineConfig::default().with_command(vec!["/nonexistent/ultimattt".to_string()]);
    let launcher = ProcessLauncher::new(config);
    assert!(launcher.launch("X;pos").is_err());
}

#[tokio::test]
async fn test_controller_reads_engine_reports() {
    let config = shell("echo 'it depth:9 move:ae v:12' >&2; echo 'it depth:30 move:ai v:20' >&2");
    let launcher = Arc::new(ProcessLauncher::new(config.clone()));
    let analyzer = Analyzer::new(launcher, config.limits(), tokio::runtime::Handle::current());
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = MatchController::new(analyzer, tx);

    settle(|| controller.depth() == 30).await;
    assert_eq!(controller.evaluation(), 16.0);
    assert_eq!(controller.best_move().as_deref(), Some("ai"));

    controller.shutdown();
    assert_eq!(
        controller
            .tree()
            .get(controller.root())
            .unwrap()
            .session_state(),
        SessionState::Terminated
    );
}

#[tokio::test]
async fn test_pause_and_resume_a_running_engine() {
    let config = shell("sleep 5");
    let launcher = Arc::new(ProcessLauncher::new(config.clone()));
    let analyzer = Analyzer::new(launcher, config.limits(), tokio::runtime::Handle::current());
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = MatchController::new(analyzer, tx);
    let root = controller.root();

    controller.load_hero("C/C").unwrap();
    assert_eq!(
        controller.tree().get(root).unwrap().session_state(),
        SessionState::Streaming
    );
    assert!(controller.forward());
    assert_eq!(
        controller.tree().get(root).unwrap().session_state(),
        SessionState::Paused
    );

    controller.shutdown();
}

#[tokio::test]
async fn test_engine_keeps_writing_after_max_depth() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("finished");
    let script = format!(
        "echo 'it depth:30 move:ae v:5' >&2; sleep 0.2; \
         echo 'it depth:31 move:ai v:9' >&2 && touch '{}'",
        marker.display()
    );
    let config = shell(&script);
    let launcher = Arc::new(ProcessLauncher::new(config.clone()));
    let analyzer = Analyzer::new(launcher, config.limits(), tokio::runtime::Handle::current());
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = MatchController::new(analyzer, tx);

    settle(|| controller.depth() == 30).await;
    settle(|| marker.exists()).await;

    // Lines past the maximum depth are read but not applied.
    assert_eq!(controller.depth(), 30);
    assert_eq!(controller.best_move().as_deref(), Some("ae"));
    controller.shutdown();
}
