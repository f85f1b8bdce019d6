// src/engine/core.rs

//! Pure core state machine for a full-mode session.
//!
//! The core consumes [`SessionEvent`]s reported by the async shell
//! (`engine::session`) and answers with the next [`SessionCommand`] to
//! perform. It owns no processes, channels or timers, which keeps every
//! transition unit-testable.
//!
//! The machine guarantees that once a service spawn has been attempted the
//! session passes through `Cleanup` exactly once before `Done`, whatever
//! event ended it.

use tracing::{debug, warn};

/// States of one full-mode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    EnsuringArtifact,
    StartingService,
    WaitingSettle,
    ServiceAlive,
    ServiceDead,
    EnsuringDependencies,
    RunningCompanion,
    Cleanup,
    Done,
}

/// Outcomes the shell reports back to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Begin,
    ArtifactReady,
    ArtifactFailed,
    ServiceSpawned,
    ServiceSpawnFailed,
    SettleSampled { alive: bool },
    DependenciesReady,
    DependenciesFailed,
    CompanionFinished,
    /// The operator interrupted a phase that observes the interrupt.
    Interrupted,
    CleanupFinished,
}

/// What the shell should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    EnsureArtifact,
    SpawnService,
    SettleAndCheck,
    EnsureDependencies,
    RunCompanion,
    Cleanup,
    Finish,
}

#[derive(Debug)]
pub struct SessionCore {
    state: SessionState,
    history: Vec<SessionState>,
    service_attempted: bool,
    cleanups: u32,
}

impl Default for SessionCore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCore {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            history: vec![SessionState::Idle],
            service_attempted: false,
            cleanups: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state entered so far, in order, starting with `Idle`.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn into_history(self) -> Vec<SessionState> {
        self.history
    }

    /// Number of times `Cleanup` has been entered.
    pub fn cleanups(&self) -> u32 {
        self.cleanups
    }

    /// Feed one event and get the next command.
    pub fn step(&mut self, event: SessionEvent) -> SessionCommand {
        use SessionEvent as E;
        use SessionState as S;

        let command = match (self.state, event) {
            (S::Idle, E::Begin) => {
                self.enter(S::EnsuringArtifact);
                SessionCommand::EnsureArtifact
            }
            (S::EnsuringArtifact, E::ArtifactReady) => {
                self.enter(S::StartingService);
                self.service_attempted = true;
                SessionCommand::SpawnService
            }
            (S::EnsuringArtifact, E::ArtifactFailed) => {
                self.enter(S::Done);
                SessionCommand::Finish
            }
            (S::StartingService, E::ServiceSpawned) => {
                self.enter(S::WaitingSettle);
                SessionCommand::SettleAndCheck
            }
            (S::WaitingSettle, E::SettleSampled { alive: true }) => {
                self.enter(S::ServiceAlive);
                self.enter(S::EnsuringDependencies);
                SessionCommand::EnsureDependencies
            }
            (S::WaitingSettle, E::SettleSampled { alive: false }) => {
                self.enter(S::ServiceDead);
                self.enter_cleanup()
            }
            (S::EnsuringDependencies, E::DependenciesReady) => {
                self.enter(S::RunningCompanion);
                SessionCommand::RunCompanion
            }
            (
                S::StartingService
                | S::WaitingSettle
                | S::EnsuringDependencies
                | S::RunningCompanion,
                E::ServiceSpawnFailed
                | E::DependenciesFailed
                | E::CompanionFinished
                | E::Interrupted,
            ) => self.enter_cleanup(),
            (S::Cleanup, E::CleanupFinished) => {
                self.enter(S::Done);
                SessionCommand::Finish
            }
            (state, event) => {
                warn!(?state, ?event, "unexpected session event");
                self.recover()
            }
        };

        debug!(state = ?self.state, ?command, "session step");
        command
    }

    fn enter(&mut self, next: SessionState) {
        self.state = next;
        self.history.push(next);
    }

    fn enter_cleanup(&mut self) -> SessionCommand {
        self.cleanups += 1;
        self.enter(SessionState::Cleanup);
        SessionCommand::Cleanup
    }

    /// Route an out-of-order event to the nearest safe exit: cleanup if a
    /// service may exist and has not been cleaned up yet, otherwise finish.
    fn recover(&mut self) -> SessionCommand {
        match self.state {
            SessionState::Done => SessionCommand::Finish,
            SessionState::Cleanup => SessionCommand::Cleanup,
            _ if self.service_attempted && self.cleanups == 0 => self.enter_cleanup(),
            _ => {
                self.enter(SessionState::Done);
                SessionCommand::Finish
            }
        }
    }
}
