// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] describes external commands and maps spawn errors.
//! - [`backend`] provides the `ProcessBackend` / `ServiceHandle` traits that
//!   the rest of the crate talks to, so tests can swap in a fake.
//! - [`process`] is the real `tokio::process` implementation.

pub mod backend;
pub mod command;
pub mod process;

pub use backend::{BoxFuture, CompanionExit, ProcessBackend, ServiceHandle, Termination};
pub use command::{CommandSpec, StdioMode};
pub use process::{TokioProcessBackend, TokioServiceHandle};
