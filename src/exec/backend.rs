// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! Every component that starts a child goes through [`ProcessBackend`]
//! instead of touching `tokio::process` directly. Production code uses
//! [`TokioProcessBackend`](super::TokioProcessBackend); tests provide a
//! scripted fake that records what was spawned and decides how each child
//! behaves.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::engine::Interrupt;
use crate::errors::Result;
use crate::types::ProcessRole;

use super::command::{CommandSpec, StdioMode};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// How a terminate request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process had already exited; nothing was signalled.
    AlreadyExited,
    /// The process exited after the graceful stop request.
    Stopped,
    /// The process ignored the stop request and was force-killed.
    Killed,
}

/// How a foreground companion run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionExit {
    /// The companion exited on its own with this code.
    Exited(i32),
    /// The operator interrupted the run; the companion has been reaped.
    Interrupted,
}

/// A running background process, exclusively owned by whoever spawned it.
pub trait ServiceHandle: Send + fmt::Debug {
    fn pid(&self) -> Option<u32>;

    /// Sample liveness now. Never cached.
    fn is_running(&mut self) -> Result<bool>;

    /// Wait for the process to exit on its own and return its exit code.
    fn wait(&mut self) -> BoxFuture<'_, Result<i32>>;

    /// Ask the process to stop, force-kill it after `grace`, and return only
    /// once it has exited. A process that already exited is left alone.
    fn terminate(&mut self, grace: Duration) -> BoxFuture<'_, Result<Termination>>;

    /// Fire-and-forget kill for contexts that cannot await (e.g. `Drop`).
    fn kill_now(&mut self);
}

/// Trait abstracting how child processes are started.
pub trait ProcessBackend: Send + Sync {
    /// Run a command in the foreground with inherited stdio and return its
    /// exit code.
    fn run_to_completion<'a>(
        &'a self,
        spec: &'a CommandSpec,
        role: ProcessRole,
    ) -> BoxFuture<'a, Result<i32>>;

    /// Start a long-running service in the background.
    fn spawn_service(&self, spec: &CommandSpec, stdio: StdioMode)
    -> Result<Box<dyn ServiceHandle>>;

    /// Run the companion attached to the terminal until it exits or the
    /// interrupt fires. On interrupt the companion gets `grace` to exit by
    /// itself before it is killed.
    fn run_companion<'a>(
        &'a self,
        spec: &'a CommandSpec,
        interrupt: Interrupt,
        grace: Duration,
    ) -> BoxFuture<'a, Result<CompanionExit>>;
}
