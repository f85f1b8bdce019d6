// src/build/mod.rs

//! Build artifact handling.
//!
//! - [`runner`] invokes the external build tool ("clean, package, skip
//!   tests") and maps its exit code.
//! - [`checker`] decides whether the artifact is already there and only
//!   delegates to the runner when it is not.

pub mod checker;
pub mod runner;

pub use checker::{ArtifactState, BuildStateChecker};
pub use runner::BuildRunner;
