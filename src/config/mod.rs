// src/config/mod.rs

//! Configuration loading and validation for stackrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate it into an immutable `LaunchConfig` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{BuildSection, CompanionSection, LaunchConfig, RawLaunchConfig, ServiceSection};
