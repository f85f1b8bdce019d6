// src/companion/launcher.rs

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::Interrupt;
use crate::errors::{Result, StackrunError};
use crate::exec::{CommandSpec, CompanionExit, ProcessBackend};
use crate::fs::FileSystem;
use crate::types::ProcessRole;

/// Whether the install step had to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyState {
    AlreadyInstalled,
    Installed,
}

/// Commands and paths for the dependent (companion) project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionPlan {
    pub project_dir: PathBuf,
    /// Directory whose presence means dependencies are installed.
    pub marker: PathBuf,
    pub install: CommandSpec,
    pub run: CommandSpec,
}

/// Installs the companion's dependencies once and runs it in the
/// foreground.
pub struct DependentLauncher<'a> {
    plan: &'a CompanionPlan,
    backend: &'a dyn ProcessBackend,
    fs: &'a dyn FileSystem,
}

impl<'a> DependentLauncher<'a> {
    pub fn new(
        plan: &'a CompanionPlan,
        backend: &'a dyn ProcessBackend,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self { plan, backend, fs }
    }

    fn ensure_project_dir(&self) -> Result<()> {
        if self.fs.is_dir(&self.plan.project_dir) {
            Ok(())
        } else {
            warn!(dir = %self.plan.project_dir.display(), "companion project directory missing");
            Err(StackrunError::ProjectDirMissing(self.plan.project_dir.clone()))
        }
    }

    /// Run the install command if the marker directory is absent.
    ///
    /// Fails with `ProjectDirMissing` before anything is spawned when the
    /// project directory does not exist.
    pub async fn ensure_dependencies_installed(&self) -> Result<DependencyState> {
        self.ensure_project_dir()?;

        if self.fs.is_dir(&self.plan.marker) {
            return Ok(DependencyState::AlreadyInstalled);
        }

        info!(marker = %self.plan.marker.display(), "dependency marker missing; installing");
        println!("Installing frontend dependencies...");

        let code = self
            .backend
            .run_to_completion(&self.plan.install, ProcessRole::Install)
            .await?;

        if code == 0 {
            Ok(DependencyState::Installed)
        } else {
            Err(StackrunError::InstallFailed(code))
        }
    }

    /// Run the companion attached to the terminal until it exits or the
    /// operator interrupts.
    pub async fn run_foreground(
        &self,
        interrupt: Interrupt,
        grace: Duration,
    ) -> Result<CompanionExit> {
        self.ensure_project_dir()?;
        self.backend.run_companion(&self.plan.run, interrupt, grace).await
    }
}
