// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::companion::CompanionPlan;
use crate::exec::CommandSpec;

/// Launch configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// artifact = "target/gastos-personales-1.0.0.jar"
/// tool = "./mvnw"
/// tool_windows = "mvnw.cmd"
/// args = ["clean", "package", "-DskipTests"]
///
/// [service]
/// program = "java"
/// args = ["-jar"]
/// web_arg = "web"
/// console_arg = "consola"
/// settle_delay = "8s"
/// stop_grace = "10s"
///
/// [companion]
/// dir = "frontend"
/// marker = "node_modules"
/// install = ["npm", "install"]
/// run = ["npm", "run", "dev"]
/// ```
///
/// All sections are optional; an empty file means "built-in defaults".
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLaunchConfig {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub companion: CompanionSection,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Path of the packaged artifact whose presence skips the build.
    #[serde(default = "default_artifact")]
    pub artifact: String,

    /// Build tool on non-Windows platforms.
    #[serde(default = "default_tool")]
    pub tool: String,

    /// Build tool on Windows.
    #[serde(default = "default_tool_windows")]
    pub tool_windows: String,

    /// Arguments meaning "clean, package, skip tests".
    #[serde(default = "default_build_args")]
    pub args: Vec<String>,
}

/// `[service]` section.
///
/// The service is launched as `program args... <artifact> <mode arg>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_service_program")]
    pub program: String,

    #[serde(default = "default_service_args")]
    pub args: Vec<String>,

    /// Mode argument for the HTTP-serving mode.
    #[serde(default = "default_web_arg")]
    pub web_arg: String,

    /// Mode argument for the interactive console mode.
    #[serde(default = "default_console_arg")]
    pub console_arg: String,

    /// How long to wait after spawning before sampling liveness
    /// (e.g. `"8s"`).
    #[serde(default = "default_settle_delay")]
    pub settle_delay: String,

    /// How long a stopped process gets to exit before it is killed.
    #[serde(default = "default_stop_grace")]
    pub stop_grace: String,

    /// Shown in banners only.
    #[serde(default = "default_backend_url")]
    pub url: String,
}

/// `[companion]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanionSection {
    /// Project directory the companion runs in.
    #[serde(default = "default_companion_dir")]
    pub dir: String,

    /// Directory, relative to `dir`, whose presence means dependencies are
    /// installed.
    #[serde(default = "default_marker")]
    pub marker: String,

    #[serde(default = "default_install")]
    pub install: Vec<String>,

    #[serde(default = "default_run")]
    pub run: Vec<String>,

    /// Shown in banners only.
    #[serde(default = "default_frontend_url")]
    pub url: String,
}

fn default_artifact() -> String {
    "target/gastos-personales-1.0.0.jar".to_string()
}

fn default_tool() -> String {
    "./mvnw".to_string()
}

fn default_tool_windows() -> String {
    "mvnw.cmd".to_string()
}

fn default_build_args() -> Vec<String> {
    vec!["clean".into(), "package".into(), "-DskipTests".into()]
}

fn default_service_program() -> String {
    "java".to_string()
}

fn default_service_args() -> Vec<String> {
    vec!["-jar".into()]
}

fn default_web_arg() -> String {
    "web".to_string()
}

fn default_console_arg() -> String {
    "consola".to_string()
}

fn default_settle_delay() -> String {
    "8s".to_string()
}

fn default_stop_grace() -> String {
    "10s".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_companion_dir() -> String {
    "frontend".to_string()
}

fn default_marker() -> String {
    "node_modules".to_string()
}

fn npm() -> String {
    if cfg!(windows) { "npm.cmd" } else { "npm" }.to_string()
}

fn default_install() -> Vec<String> {
    vec![npm(), "install".into()]
}

fn default_run() -> Vec<String> {
    vec![npm(), "run".into(), "dev".into()]
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            artifact: default_artifact(),
            tool: default_tool(),
            tool_windows: default_tool_windows(),
            args: default_build_args(),
        }
    }
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            program: default_service_program(),
            args: default_service_args(),
            web_arg: default_web_arg(),
            console_arg: default_console_arg(),
            settle_delay: default_settle_delay(),
            stop_grace: default_stop_grace(),
            url: default_backend_url(),
        }
    }
}

impl Default for CompanionSection {
    fn default() -> Self {
        Self {
            dir: default_companion_dir(),
            marker: default_marker(),
            install: default_install(),
            run: default_run(),
            url: default_frontend_url(),
        }
    }
}

/// Validated, immutable launch configuration.
///
/// Produced from [`RawLaunchConfig`] via `TryFrom` and passed explicitly to
/// every launch mode. Platform-specific choices (which build tool) have
/// already been made.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub artifact: PathBuf,
    pub build: CommandSpec,
    pub service_web: CommandSpec,
    pub service_console: CommandSpec,
    pub settle_delay: Duration,
    pub stop_grace: Duration,
    pub companion: CompanionPlan,
    pub backend_url: String,
    pub frontend_url: String,
}

impl LaunchConfig {
    /// Replace the settle delay (CLI override).
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}
