// src/exec/command.rs

//! Command descriptions and the mapping onto `tokio::process::Command`.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::errors::StackrunError;

/// A fully resolved external command: program, arguments and working
/// directory. Built once from config and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Program and arguments joined by spaces, without the working directory.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Build a `tokio` command with stdio inherited from the launcher.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())?;
        if let Some(dir) = &self.cwd {
            write!(f, " (in {})", dir.display())?;
        }
        Ok(())
    }
}

/// Where a background child's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Share the launcher's terminal.
    Inherit,
    /// Discard output.
    Discard,
}

impl StdioMode {
    pub(crate) fn apply(self, cmd: &mut Command) {
        match self {
            StdioMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
            StdioMode::Discard => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }
    }
}

/// Map a spawn failure to the launcher's error taxonomy.
///
/// A missing executable is reported as `ToolNotFound`; anything else is an
/// IO fault.
pub fn spawn_error(program: &str, err: io::Error) -> StackrunError {
    if err.kind() == io::ErrorKind::NotFound {
        StackrunError::ToolNotFound(program.to_string())
    } else {
        StackrunError::IoError(err)
    }
}

/// Exit code of a finished child; `-1` when it was ended by a signal.
pub fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
