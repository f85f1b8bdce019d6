// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackrunError {
    #[error("Tool not found: '{0}' could not be executed (is it installed and on PATH?)")]
    ToolNotFound(String),

    #[error("Build failed with exit code {0}")]
    BuildFailed(i32),

    #[error("Companion project directory not found: {}", .0.display())]
    ProjectDirMissing(PathBuf),

    #[error("Dependency install failed with exit code {0}")]
    InstallFailed(i32),

    #[error("Service process exited before the settle delay elapsed")]
    ServiceDeadAfterSettle,

    #[error("Interrupted by operator")]
    Interrupted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StackrunError {
    /// Errors that end a launch session in an expected way.
    ///
    /// These are reported to the operator as a status line; anything else is
    /// an unexpected fault and surfaces through `main`.
    pub fn is_session_terminal(&self) -> bool {
        matches!(
            self,
            StackrunError::ToolNotFound(_)
                | StackrunError::BuildFailed(_)
                | StackrunError::ProjectDirMissing(_)
                | StackrunError::InstallFailed(_)
                | StackrunError::ServiceDeadAfterSettle
                | StackrunError::Interrupted
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, StackrunError>;
