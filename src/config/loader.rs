// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::{Result, StackrunError};
use crate::fs::FileSystem;

/// Load a configuration file from a given path and return the raw
/// `RawLaunchConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a usable [`LaunchConfig`].
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawLaunchConfig> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;

    let config: RawLaunchConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<LaunchConfig> {
    let raw_config = load_from_path(fs, &path)?;
    let config = LaunchConfig::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the launch configuration for this invocation.
///
/// - An explicitly given path must exist.
/// - Otherwise [`default_config_path`] is used if present, and the built-in
///   defaults if not.
pub fn resolve_config(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<LaunchConfig> {
    if let Some(path) = explicit {
        if !fs.is_file(path) {
            return Err(StackrunError::ConfigError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return load_and_validate(fs, path);
    }

    let default_path = default_config_path();
    if fs.is_file(&default_path) {
        debug!(path = %default_path.display(), "using config file");
        load_and_validate(fs, default_path)
    } else {
        debug!("no config file found; using built-in defaults");
        LaunchConfig::try_from(RawLaunchConfig::default())
    }
}

/// `Stackrun.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Stackrun.toml")
}
