// tests/launch_modes.rs

mod common;
use crate::common::{
    FakeProcessBackend, LaunchConfigBuilder, ServiceBehaviour, init_tracing, ready_fs,
    with_timeout,
};

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use stackrun::build::ArtifactState;
use stackrun::engine::interrupt::channel;
use stackrun::engine::{Interrupt, LaunchContext, LaunchOutcome, rebuild};
use stackrun::errors::StackrunError;
use stackrun::fs::FileSystem;
use stackrun::fs::mock::MockFileSystem;
use stackrun::{launch, report_outcome};

#[tokio::test]
async fn web_mode_stops_service_on_interrupt() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = ready_fs();
    let backend = FakeProcessBackend::new(fs.clone());
    let state = backend.service_state();

    let (trigger, interrupt) = channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });

    let ctx = LaunchContext::new(&config, &backend, &fs);
    let outcome = with_timeout(launch(ctx, "1", interrupt)).await.unwrap();

    assert_eq!(outcome, LaunchOutcome::Interrupted);
    assert_eq!(state.terminations(), 1);
    assert!(!state.is_alive());
    assert_eq!(backend.count("companion:"), 0);
}

#[tokio::test]
async fn web_mode_reports_service_exit_code() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = ready_fs();
    let backend = FakeProcessBackend::new(fs.clone()).service(ServiceBehaviour::DiesImmediately(2));

    let ctx = LaunchContext::new(&config, &backend, &fs);
    let outcome = with_timeout(launch(ctx, "web", Interrupt::never())).await.unwrap();

    assert_eq!(outcome, LaunchOutcome::Exited(2));
}

#[tokio::test]
async fn unrecognised_token_falls_back_to_web() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = ready_fs();
    let backend = FakeProcessBackend::new(fs.clone()).service(ServiceBehaviour::DiesImmediately(0));

    let ctx = LaunchContext::new(&config, &backend, &fs);
    let outcome = with_timeout(launch(ctx, "banana", Interrupt::never())).await.unwrap();

    assert_eq!(outcome, LaunchOutcome::Exited(0));
    assert_eq!(backend.count("service:"), 1);
    assert_eq!(backend.count("companion:"), 0);
}

#[tokio::test]
async fn console_mode_runs_in_foreground() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = ready_fs();
    let backend = FakeProcessBackend::new(fs.clone()).console_exits(1);

    let ctx = LaunchContext::new(&config, &backend, &fs);
    let outcome = with_timeout(launch(ctx, "consola", Interrupt::never())).await.unwrap();

    assert_eq!(outcome, LaunchOutcome::Exited(1));
    assert_eq!(backend.calls(), vec!["service:java"]);
    assert_eq!(backend.service_state().spawned(), 0);
}

#[tokio::test]
async fn console_mode_builds_missing_artifact_first() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = MockFileSystem::new();
    let backend = FakeProcessBackend::new(fs.clone()).build_creates("target/app.jar");

    let ctx = LaunchContext::new(&config, &backend, &fs);
    with_timeout(launch(ctx, "2", Interrupt::never())).await.unwrap();

    assert_eq!(backend.count("build:"), 1);
    assert_eq!(backend.count("service:"), 1);
}

#[tokio::test]
async fn rebuild_runs_even_when_artifact_exists() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = ready_fs();
    let backend = FakeProcessBackend::new(fs.clone());

    let ctx = LaunchContext::new(&config, &backend, &fs);
    rebuild(ctx).await.unwrap();

    assert_eq!(backend.count("build:"), 1);
}

#[tokio::test]
async fn build_state_checker_builds_only_when_missing() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = MockFileSystem::new();
    let backend = FakeProcessBackend::new(fs.clone()).build_creates("target/app.jar");
    let ctx = LaunchContext::new(&config, &backend, &fs);

    let checker = ctx.build_checker();
    assert_eq!(checker.ensure_artifact().await.unwrap(), ArtifactState::Built);
    assert_eq!(checker.ensure_artifact().await.unwrap(), ArtifactState::Present);
    assert_eq!(backend.count("build:"), 1);
}

#[tokio::test]
async fn build_state_checker_maps_failure() {
    init_tracing();

    let config = LaunchConfigBuilder::new().build();
    let fs = MockFileSystem::new();
    let backend = FakeProcessBackend::new(fs.clone()).build_exits(1);
    let ctx = LaunchContext::new(&config, &backend, &fs);

    let err = ctx.build_checker().ensure_artifact().await.unwrap_err();
    assert!(matches!(err, StackrunError::BuildFailed(1)));
    assert!(!fs.is_file(Path::new("target/app.jar")));
}

#[test]
fn outcomes_map_to_exit_codes() {
    assert_eq!(report_outcome(Ok(LaunchOutcome::Interrupted)).unwrap(), ExitCode::SUCCESS);
    assert_eq!(report_outcome(Ok(LaunchOutcome::Exited(0))).unwrap(), ExitCode::SUCCESS);
    assert_eq!(report_outcome(Ok(LaunchOutcome::Exited(3))).unwrap(), ExitCode::FAILURE);
    assert_eq!(
        report_outcome(Err(StackrunError::BuildFailed(1))).unwrap(),
        ExitCode::FAILURE
    );
    assert_eq!(
        report_outcome(Err(StackrunError::Interrupted)).unwrap(),
        ExitCode::SUCCESS
    );
    assert!(report_outcome(Err(StackrunError::ConfigError("bad".into()))).is_err());
}
