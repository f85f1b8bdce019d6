// src/build/runner.rs

use tracing::{info, warn};

use crate::errors::{Result, StackrunError};
use crate::exec::{CommandSpec, ProcessBackend};
use crate::types::ProcessRole;

/// Runs the external build tool once, in the foreground.
pub struct BuildRunner<'a> {
    command: &'a CommandSpec,
    backend: &'a dyn ProcessBackend,
}

impl<'a> BuildRunner<'a> {
    pub fn new(command: &'a CommandSpec, backend: &'a dyn ProcessBackend) -> Self {
        Self { command, backend }
    }

    /// Invoke the build tool and map its exit status.
    ///
    /// - exit 0 → `Ok(())`
    /// - non-zero → `BuildFailed(code)`
    /// - executable missing → `ToolNotFound`
    ///
    /// No retries; the caller decides whether to try again.
    pub async fn run(&self) -> Result<()> {
        println!("Building the application...");
        println!("Running: {}", self.command);

        let code = self
            .backend
            .run_to_completion(self.command, ProcessRole::Build)
            .await?;

        if code == 0 {
            info!(cmd = %self.command, "build succeeded");
            println!("Build completed successfully");
            println!();
            Ok(())
        } else {
            warn!(cmd = %self.command, exit_code = code, "build failed");
            Err(StackrunError::BuildFailed(code))
        }
    }
}
