// src/companion/mod.rs

//! The dependent foreground process (frontend dev server).

pub mod launcher;

pub use launcher::{CompanionPlan, DependencyState, DependentLauncher};
