// src/engine/session.rs

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::errors::{Result, StackrunError};
use crate::exec::{CompanionExit, StdioMode};
use crate::service::{ServiceGuard, SettleOutcome};

use super::core::{SessionCommand, SessionCore, SessionEvent, SessionState};
use super::{Interrupt, LaunchContext, LaunchOutcome};

/// Result of one full-mode session plus the states it went through.
#[derive(Debug)]
pub struct SessionReport {
    pub result: Result<LaunchOutcome>,
    pub history: Vec<SessionState>,
}

impl SessionReport {
    pub fn into_result(self) -> Result<LaunchOutcome> {
        self.result
    }

    /// How many times the session entered `Cleanup`.
    pub fn cleanups(&self) -> usize {
        self.history
            .iter()
            .filter(|s| **s == SessionState::Cleanup)
            .count()
    }
}

/// One full-mode run: build if needed, start the service in the
/// background, wait out the settle delay, then run the companion in the
/// foreground.
///
/// The session owns the service through a [`ServiceGuard`] for its whole
/// duration. The core state machine routes every exit after a spawn attempt
/// through a single `Cleanup` step, which releases the guard and waits for
/// the service to exit before `run` returns.
pub struct Session<'a> {
    ctx: LaunchContext<'a>,
    interrupt: Interrupt,
    core: SessionCore,
    guard: Option<ServiceGuard>,
    failure: Option<StackrunError>,
    outcome: Option<LaunchOutcome>,
}

impl<'a> Session<'a> {
    pub fn new(ctx: LaunchContext<'a>, interrupt: Interrupt) -> Self {
        Self {
            ctx,
            interrupt,
            core: SessionCore::new(),
            guard: None,
            failure: None,
            outcome: None,
        }
    }

    pub async fn run(mut self) -> SessionReport {
        println!("Starting full application (backend + frontend)...");
        println!();

        let mut command = self.core.step(SessionEvent::Begin);
        loop {
            let event = match command {
                SessionCommand::EnsureArtifact => self.ensure_artifact().await,
                SessionCommand::SpawnService => self.spawn_service(),
                SessionCommand::SettleAndCheck => self.settle().await,
                SessionCommand::EnsureDependencies => self.ensure_dependencies().await,
                SessionCommand::RunCompanion => self.run_companion().await,
                SessionCommand::Cleanup => self.cleanup().await,
                SessionCommand::Finish => break,
            };
            command = self.core.step(event);
        }

        let result = match (self.failure.take(), self.outcome.take()) {
            (Some(err), _) => Err(err),
            (None, Some(outcome)) => Ok(outcome),
            (None, None) => Err(StackrunError::Other(anyhow!(
                "session finished without an outcome"
            ))),
        };

        info!(state = ?self.core.state(), ok = result.is_ok(), "session finished");

        SessionReport {
            result,
            history: self.core.into_history(),
        }
    }

    /// Record the error that ended the session. The first failure wins;
    /// later ones (e.g. from cleanup) are only logged.
    fn fail(&mut self, err: StackrunError) {
        if self.failure.is_some() {
            warn!(error = %err, "additional failure during session");
        } else {
            self.failure = Some(err);
        }
    }

    async fn ensure_artifact(&mut self) -> SessionEvent {
        let ensured = self.ctx.build_checker().ensure_artifact().await;
        match ensured {
            Ok(_) => SessionEvent::ArtifactReady,
            Err(e) => {
                self.fail(e);
                SessionEvent::ArtifactFailed
            }
        }
    }

    fn spawn_service(&mut self) -> SessionEvent {
        println!("Starting backend server...");
        let spawned = self
            .ctx
            .supervisor()
            .spawn(&self.ctx.config.service_web, StdioMode::Discard);

        match spawned {
            Ok(handle) => {
                self.guard = Some(ServiceGuard::new(handle));
                SessionEvent::ServiceSpawned
            }
            Err(e) => {
                self.fail(e);
                SessionEvent::ServiceSpawnFailed
            }
        }
    }

    async fn settle(&mut self) -> SessionEvent {
        let Some(guard) = self.guard.as_mut() else {
            return SessionEvent::SettleSampled { alive: false };
        };

        println!("Waiting for the backend to start...");
        let supervisor = self.ctx.supervisor();
        let sampled = supervisor
            .settle_and_check(
                guard.handle_mut(),
                self.ctx.config.settle_delay,
                &mut self.interrupt,
            )
            .await;

        match sampled {
            Ok(SettleOutcome::Alive) => {
                println!("Backend started");
                SessionEvent::SettleSampled { alive: true }
            }
            Ok(SettleOutcome::Dead) => {
                self.fail(StackrunError::ServiceDeadAfterSettle);
                SessionEvent::SettleSampled { alive: false }
            }
            Ok(SettleOutcome::Interrupted) => self.mark_interrupted(),
            Err(e) => {
                self.fail(e);
                SessionEvent::SettleSampled { alive: false }
            }
        }
    }

    /// Install the companion's dependencies if needed.
    ///
    /// An interrupt abandons the install: dropping the install future kills
    /// the installer, and the session moves straight to cleanup.
    async fn ensure_dependencies(&mut self) -> SessionEvent {
        println!("Starting frontend...");
        let launcher = self.ctx.dependent_launcher();
        let installed = tokio::select! {
            installed = launcher.ensure_dependencies_installed() => Some(installed),
            () = self.interrupt.interrupted() => None,
        };

        match installed {
            Some(Ok(_)) => SessionEvent::DependenciesReady,
            None => self.mark_interrupted(),
            // The installer died of the same Ctrl-C before the listener fired.
            Some(Err(e)) if self.interrupt.is_triggered() => {
                info!(error = %e, "install ended by operator interrupt");
                self.mark_interrupted()
            }
            Some(Err(e)) => {
                self.fail(e);
                SessionEvent::DependenciesFailed
            }
        }
    }

    async fn run_companion(&mut self) -> SessionEvent {
        let config = self.ctx.config;
        println!();
        println!("Application available at:");
        println!("   Frontend: {}", config.frontend_url);
        println!("   Backend:  {}", config.backend_url);
        println!();
        println!("   Press Ctrl+C to stop both servers");
        println!("{}", "-".repeat(50));

        let finished = self
            .ctx
            .dependent_launcher()
            .run_foreground(self.interrupt.clone(), config.stop_grace)
            .await;

        match finished {
            Ok(CompanionExit::Exited(code)) => {
                info!(exit_code = code, "companion finished");
                self.outcome = Some(LaunchOutcome::Exited(code));
            }
            Ok(CompanionExit::Interrupted) => {
                self.mark_interrupted();
            }
            Err(e) => self.fail(e),
        }
        SessionEvent::CompanionFinished
    }

    fn mark_interrupted(&mut self) -> SessionEvent {
        println!();
        println!("Stopping servers...");
        self.outcome = Some(LaunchOutcome::Interrupted);
        SessionEvent::Interrupted
    }

    /// Release the service, if one was spawned, and wait for it to exit.
    ///
    /// Does not observe the interrupt channel: a further Ctrl-C cannot cut
    /// the wait short.
    async fn cleanup(&mut self) -> SessionEvent {
        if let Some(mut guard) = self.guard.take() {
            if guard.handle_mut().is_running().unwrap_or(true) {
                println!("Stopping backend server...");
            }
            let pid = guard.pid();
            if let Err(e) = self.ctx.supervisor().terminate(guard).await {
                error!(?pid, error = %e, "failed to stop service");
                self.fail(e);
            }
        }
        SessionEvent::CleanupFinished
    }
}
