// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::companion::CompanionPlan;
use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::{Result, StackrunError};
use crate::exec::CommandSpec;
use crate::types::parse_duration;

impl TryFrom<RawLaunchConfig> for LaunchConfig {
    type Error = crate::errors::StackrunError;

    fn try_from(raw: RawLaunchConfig) -> std::result::Result<Self, Self::Error> {
        let build = &raw.build;
        let service = &raw.service;
        let companion = &raw.companion;

        let artifact = non_empty("[build].artifact", &build.artifact)?;
        let tool = if cfg!(windows) {
            non_empty("[build].tool_windows", &build.tool_windows)?
        } else {
            non_empty("[build].tool", &build.tool)?
        };
        let program = non_empty("[service].program", &service.program)?;

        let settle_delay = duration("[service].settle_delay", &service.settle_delay)?;
        if settle_delay.is_zero() {
            return Err(StackrunError::ConfigError(
                "[service].settle_delay must be greater than zero".to_string(),
            ));
        }
        let stop_grace = duration("[service].stop_grace", &service.stop_grace)?;

        let project_dir = PathBuf::from(non_empty("[companion].dir", &companion.dir)?);
        let marker = non_empty("[companion].marker", &companion.marker)?;
        if Path::new(marker).is_absolute() {
            return Err(StackrunError::ConfigError(format!(
                "[companion].marker must be relative to [companion].dir (got '{marker}')"
            )));
        }

        let service_base = CommandSpec::new(program)
            .args(service.args.iter().cloned())
            .arg(artifact);

        Ok(LaunchConfig {
            artifact: PathBuf::from(artifact),
            build: CommandSpec::new(tool).args(build.args.iter().cloned()),
            service_web: service_base.clone().arg(service.web_arg.clone()),
            service_console: service_base.arg(service.console_arg.clone()),
            settle_delay,
            stop_grace,
            companion: CompanionPlan {
                marker: project_dir.join(marker),
                install: argv("[companion].install", &companion.install)?.current_dir(&project_dir),
                run: argv("[companion].run", &companion.run)?.current_dir(&project_dir),
                project_dir,
            },
            backend_url: service.url.clone(),
            frontend_url: companion.url.clone(),
        })
    }
}

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StackrunError::ConfigError(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

fn duration(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|e| StackrunError::ConfigError(format!("{field}: {e}")))
}

/// Turn a `["program", "arg", ...]` list into a command.
fn argv(field: &str, parts: &[String]) -> Result<CommandSpec> {
    let Some((program, args)) = parts.split_first() else {
        return Err(StackrunError::ConfigError(format!("{field} must name a program")));
    };
    let program = non_empty(field, program)?;
    Ok(CommandSpec::new(program).args(args.iter().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(toml_src: &str) -> Result<LaunchConfig> {
        let raw: RawLaunchConfig = toml::from_str(toml_src)?;
        LaunchConfig::try_from(raw)
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = validate("").unwrap();

        assert_eq!(cfg.artifact, PathBuf::from("target/gastos-personales-1.0.0.jar"));
        assert_eq!(cfg.build.args, vec!["clean", "package", "-DskipTests"]);
        assert_eq!(cfg.settle_delay, Duration::from_secs(8));
        assert_eq!(
            cfg.service_web.args,
            vec!["-jar", "target/gastos-personales-1.0.0.jar", "web"]
        );
        assert_eq!(cfg.service_console.args.last().map(String::as_str), Some("consola"));
        assert_eq!(cfg.companion.marker, PathBuf::from("frontend/node_modules"));
        assert_eq!(cfg.companion.run.cwd, Some(PathBuf::from("frontend")));
        assert_eq!(cfg.companion.run.args, vec!["run", "dev"]);
    }

    #[cfg(not(windows))]
    #[test]
    fn picks_unix_build_tool() {
        let cfg = validate("[build]\ntool = \"mvn\"\ntool_windows = \"mvn.cmd\"\n").unwrap();
        assert_eq!(cfg.build.program, "mvn");
    }

    #[test]
    fn rejects_zero_settle_delay() {
        let err = validate("[service]\nsettle_delay = \"0s\"\n").unwrap_err();
        assert!(matches!(err, StackrunError::ConfigError(msg) if msg.contains("settle_delay")));
    }

    #[test]
    fn rejects_bad_duration() {
        let err = validate("[service]\nstop_grace = \"soon\"\n").unwrap_err();
        assert!(matches!(err, StackrunError::ConfigError(msg) if msg.contains("stop_grace")));
    }

    #[test]
    fn rejects_empty_companion_command() {
        let err = validate("[companion]\nrun = []\n").unwrap_err();
        assert!(matches!(err, StackrunError::ConfigError(msg) if msg.contains("[companion].run")));
    }

    #[test]
    fn rejects_absolute_marker() {
        let err = validate("[companion]\nmarker = \"/abs/node_modules\"\n").unwrap_err();
        assert!(matches!(err, StackrunError::ConfigError(_)));
    }
}
