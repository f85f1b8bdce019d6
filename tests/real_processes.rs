// tests/real_processes.rs
//
// Exercises `TokioProcessBackend` against real `sh` / `sleep` processes.

#![cfg(unix)]

mod common;
use crate::common::{LaunchConfigBuilder, init_tracing, with_timeout};

use std::time::Duration;

use stackrun::engine::interrupt::channel;
use stackrun::engine::{Interrupt, LaunchContext, LaunchOutcome, Session};
use stackrun::errors::StackrunError;
use stackrun::exec::{
    CommandSpec, CompanionExit, ProcessBackend, StdioMode, Termination, TokioProcessBackend,
};
use stackrun::fs::RealFileSystem;
use stackrun::types::ProcessRole;

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh").args(["-c", script])
}

#[tokio::test]
async fn foreground_exit_code_is_returned() {
    init_tracing();
    let backend = TokioProcessBackend::new();

    let code = with_timeout(backend.run_to_completion(&sh("exit 3"), ProcessRole::Build))
        .await
        .unwrap();
    assert_eq!(code, 3);

    let code = with_timeout(backend.run_to_completion(&sh("true"), ProcessRole::Build))
        .await
        .unwrap();
    assert_eq!(code, 0);
}

#[tokio::test]
async fn missing_program_is_tool_not_found() {
    init_tracing();
    let backend = TokioProcessBackend::new();
    let spec = CommandSpec::new("definitely-not-a-real-build-tool-xyz");

    let err = backend
        .run_to_completion(&spec, ProcessRole::Build)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StackrunError::ToolNotFound(p) if p == "definitely-not-a-real-build-tool-xyz"
    ));

    let err = backend.spawn_service(&spec, StdioMode::Discard).unwrap_err();
    assert!(matches!(err, StackrunError::ToolNotFound(_)));
}

#[tokio::test]
async fn running_service_is_stopped_and_second_terminate_is_a_no_op() {
    init_tracing();
    let backend = TokioProcessBackend::new();

    let mut handle = backend
        .spawn_service(&CommandSpec::new("sleep").arg("30"), StdioMode::Discard)
        .unwrap();
    assert!(handle.pid().is_some());
    assert!(handle.is_running().unwrap());

    let first = with_timeout(handle.terminate(Duration::from_secs(2))).await.unwrap();
    assert_eq!(first, Termination::Stopped);
    assert!(!handle.is_running().unwrap());

    let second = with_timeout(handle.terminate(Duration::from_secs(2))).await.unwrap();
    assert_eq!(second, Termination::AlreadyExited);
}

#[tokio::test]
async fn service_ignoring_sigterm_is_killed_after_grace() {
    init_tracing();
    let backend = TokioProcessBackend::new();

    let mut handle = backend
        .spawn_service(&sh("trap '' TERM; sleep 30"), StdioMode::Discard)
        .unwrap();
    // Let the shell install its trap.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let termination = with_timeout(handle.terminate(Duration::from_millis(300)))
        .await
        .unwrap();
    assert_eq!(termination, Termination::Killed);
    assert!(!handle.is_running().unwrap());
}

#[tokio::test]
async fn crashed_service_is_seen_as_dead() {
    init_tracing();
    let backend = TokioProcessBackend::new();

    let mut handle = backend.spawn_service(&sh("exit 1"), StdioMode::Discard).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(!handle.is_running().unwrap());
    assert_eq!(with_timeout(handle.wait()).await.unwrap(), 1);
    let termination = with_timeout(handle.terminate(Duration::from_secs(1))).await.unwrap();
    assert_eq!(termination, Termination::AlreadyExited);
}

#[tokio::test]
async fn interrupted_companion_is_reaped() {
    init_tracing();
    let backend = TokioProcessBackend::new();
    let spec = CommandSpec::new("sleep").arg("30");

    let (trigger, interrupt) = channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.trigger();
    });

    let exit = with_timeout(backend.run_companion(&spec, interrupt, Duration::from_millis(200)))
        .await
        .unwrap();
    assert_eq!(exit, CompanionExit::Interrupted);
}

#[tokio::test]
async fn companion_exit_code_is_returned() {
    init_tracing();
    let backend = TokioProcessBackend::new();

    let exit = with_timeout(backend.run_companion(
        &sh("exit 4"),
        Interrupt::never(),
        Duration::from_secs(1),
    ))
    .await
    .unwrap();
    assert_eq!(exit, CompanionExit::Exited(4));
}

#[tokio::test]
async fn full_session_against_real_processes() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("app.jar");
    std::fs::write(&artifact, "jar").unwrap();
    let frontend = dir.path().join("frontend");
    std::fs::create_dir_all(frontend.join("node_modules")).unwrap();

    // The artifact path and mode argument land in `$0` and `$1`.
    let config = LaunchConfigBuilder::new()
        .artifact(artifact.to_str().unwrap())
        .service("sh", &["-c", "sleep 30"])
        .settle_delay("200ms")
        .companion_dir(frontend.to_str().unwrap())
        .companion_run(&["sh", "-c", "test -d node_modules"])
        .build();

    let backend = TokioProcessBackend::new();
    let fs = RealFileSystem;
    let ctx = LaunchContext::new(&config, &backend, &fs);

    let report = with_timeout(Session::new(ctx, Interrupt::never()).run()).await;

    assert_eq!(report.cleanups(), 1);
    assert_eq!(report.result.unwrap(), LaunchOutcome::Exited(0));
}

#[tokio::test]
async fn full_session_reports_crashed_service() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("app.jar");
    std::fs::write(&artifact, "jar").unwrap();
    let frontend = dir.path().join("frontend");
    std::fs::create_dir_all(frontend.join("node_modules")).unwrap();

    let config = LaunchConfigBuilder::new()
        .artifact(artifact.to_str().unwrap())
        .service("sh", &["-c", "exit 1"])
        .settle_delay("300ms")
        .companion_dir(frontend.to_str().unwrap())
        .companion_run(&["sh", "-c", "exit 0"])
        .build();

    let backend = TokioProcessBackend::new();
    let fs = RealFileSystem;
    let ctx = LaunchContext::new(&config, &backend, &fs);

    let report = with_timeout(Session::new(ctx, Interrupt::never()).run()).await;

    assert_eq!(report.cleanups(), 1);
    assert!(matches!(report.result, Err(StackrunError::ServiceDeadAfterSettle)));
}

#[tokio::test]
async fn full_session_interrupted_during_install() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("app.jar");
    std::fs::write(&artifact, "jar").unwrap();
    let frontend = dir.path().join("frontend");
    std::fs::create_dir_all(&frontend).unwrap();

    let config = LaunchConfigBuilder::new()
        .artifact(artifact.to_str().unwrap())
        .service("sh", &["-c", "sleep 30"])
        .settle_delay("100ms")
        .companion_dir(frontend.to_str().unwrap())
        .companion_install(&["sh", "-c", "sleep 5; exit 130"])
        .companion_run(&["sh", "-c", "exit 0"])
        .build();

    let backend = TokioProcessBackend::new();
    let fs = RealFileSystem;
    let ctx = LaunchContext::new(&config, &backend, &fs);

    let (trigger, interrupt) = channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        trigger.trigger();
    });

    let started = tokio::time::Instant::now();
    let report = with_timeout(Session::new(ctx, interrupt).run()).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(report.cleanups(), 1);
    assert_eq!(report.result.unwrap(), LaunchOutcome::Interrupted);
}
