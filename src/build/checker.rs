// src/build/checker.rs

use std::path::Path;

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::FileSystem;

use super::runner::BuildRunner;

/// Whether the artifact had to be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    /// Already on disk; nothing was run.
    Present,
    /// Missing, and the build runner produced it.
    Built,
}

/// Gates launches on the build artifact being present.
pub struct BuildStateChecker<'a> {
    artifact: &'a Path,
    fs: &'a dyn FileSystem,
    runner: BuildRunner<'a>,
}

impl<'a> BuildStateChecker<'a> {
    pub fn new(artifact: &'a Path, fs: &'a dyn FileSystem, runner: BuildRunner<'a>) -> Self {
        Self {
            artifact,
            fs,
            runner,
        }
    }

    /// Ensure the artifact exists, building it when missing.
    ///
    /// Calling this again after a successful build finds the artifact and
    /// does not rebuild.
    pub async fn ensure_artifact(&self) -> Result<ArtifactState> {
        if self.fs.is_file(self.artifact) {
            debug!(artifact = %self.artifact.display(), "artifact present");
            return Ok(ArtifactState::Present);
        }

        info!(artifact = %self.artifact.display(), "artifact missing; building");
        println!("Artifact {} not found. Building...", self.artifact.display());
        self.runner.run().await?;
        Ok(ArtifactState::Built)
    }
}
