// src/engine/mod.rs

//! Orchestration engine for stackrun.
//!
//! - [`core`] is the pure full-mode state machine.
//! - [`session`] is the async shell that drives processes for one full-mode
//!   session and owns the service for its whole duration.
//! - [`standalone`] runs the single-process modes (web, console, rebuild).
//! - [`interrupt`] turns Ctrl-C into a channel the control flow observes.

use std::fmt;

use crate::build::{BuildRunner, BuildStateChecker};
use crate::companion::DependentLauncher;
use crate::config::LaunchConfig;
use crate::exec::ProcessBackend;
use crate::fs::FileSystem;
use crate::service::ServiceSupervisor;

pub mod core;
pub mod interrupt;
pub mod session;
pub mod standalone;

pub use core::{SessionCommand, SessionCore, SessionEvent, SessionState};
pub use interrupt::{Interrupt, InterruptTrigger, listen_for_ctrl_c};
pub use session::{Session, SessionReport};
pub use standalone::{rebuild, run_console, run_web};

/// How a launch mode ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The foreground process (service or companion) exited with this code.
    Exited(i32),
    /// The operator interrupted; everything that was started has exited.
    Interrupted,
}

/// Everything a launch mode needs: the immutable config plus the process
/// and filesystem seams.
#[derive(Clone, Copy)]
pub struct LaunchContext<'a> {
    pub config: &'a LaunchConfig,
    pub backend: &'a dyn ProcessBackend,
    pub fs: &'a dyn FileSystem,
}

impl fmt::Debug for LaunchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchContext")
            .field("config", &self.config)
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

impl<'a> LaunchContext<'a> {
    pub fn new(
        config: &'a LaunchConfig,
        backend: &'a dyn ProcessBackend,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self {
            config,
            backend,
            fs,
        }
    }

    pub fn build_runner(&self) -> BuildRunner<'a> {
        BuildRunner::new(&self.config.build, self.backend)
    }

    pub fn build_checker(&self) -> BuildStateChecker<'a> {
        BuildStateChecker::new(&self.config.artifact, self.fs, self.build_runner())
    }

    pub fn supervisor(&self) -> ServiceSupervisor<'a> {
        ServiceSupervisor::new(self.backend, self.config.stop_grace)
    }

    pub fn dependent_launcher(&self) -> DependentLauncher<'a> {
        DependentLauncher::new(&self.config.companion, self.backend, self.fs)
    }
}
