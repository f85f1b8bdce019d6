// src/lib.rs

pub mod build;
pub mod cli;
pub mod companion;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod menu;
pub mod service;
pub mod types;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{LaunchConfig, resolve_config};
use crate::engine::{
    Interrupt, LaunchContext, LaunchOutcome, Session, listen_for_ctrl_c, rebuild, run_console,
    run_web,
};
use crate::errors::StackrunError;
use crate::exec::TokioProcessBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{Mode, parse_duration};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file or built-in defaults, plus CLI overrides)
/// - Ctrl-C handling
/// - mode selection (CLI argument or interactive menu)
/// - the selected launch mode
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let fs = RealFileSystem;
    let config = load_launch_config(&fs, &args)?;

    if args.dry_run {
        print_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    menu::print_header();
    let mut interrupt = listen_for_ctrl_c();

    let token = match args.mode {
        Some(token) => token,
        None => {
            menu::print_menu(&config);
            match menu::prompt_mode(&mut interrupt).await? {
                Some(token) => token,
                None => {
                    menu::print_goodbye();
                    return Ok(ExitCode::SUCCESS);
                }
            }
        }
    };

    let backend = TokioProcessBackend::new();
    let ctx = LaunchContext::new(&config, &backend, &fs);
    let finished = launch(ctx, &token, interrupt).await;
    Ok(report_outcome(finished)?)
}

/// Resolve the config for this invocation and apply CLI overrides.
pub fn load_launch_config(fs: &dyn FileSystem, args: &CliArgs) -> errors::Result<LaunchConfig> {
    let mut config = resolve_config(fs, args.config.as_deref().map(Path::new))?;

    if let Some(raw) = &args.settle_delay {
        let delay = parse_duration(raw)
            .map_err(|e| StackrunError::ConfigError(format!("--settle-delay: {e}")))?;
        if delay.is_zero() {
            return Err(StackrunError::ConfigError(
                "--settle-delay must be greater than zero".to_string(),
            ));
        }
        config = config.with_settle_delay(delay);
    }

    Ok(config)
}

/// Resolve a mode token, warning when it falls back to web mode.
pub fn select_mode(token: &str) -> Mode {
    let selection = Mode::resolve(token);
    if !selection.recognized {
        warn!(token, "unrecognised mode; falling back to web");
        println!("Invalid option '{}'. Running web mode by default...", token.trim());
    }
    selection.mode
}

/// Run the mode named by `token`.
///
/// Recompile rebuilds and then asks again which mode to run; the other modes
/// run once.
pub async fn launch(
    ctx: LaunchContext<'_>,
    token: &str,
    mut interrupt: Interrupt,
) -> errors::Result<LaunchOutcome> {
    let mut mode = select_mode(token);

    loop {
        info!(%mode, "launching");
        match mode {
            Mode::Web => return run_web(ctx, interrupt).await,
            Mode::Console => return run_console(ctx).await,
            Mode::Full => return Session::new(ctx, interrupt).run().await.into_result(),
            Mode::Recompile => {
                rebuild(ctx).await?;
                println!("Build finished. Which mode do you want to run now?");
                menu::print_menu(ctx.config);
                match menu::prompt_mode(&mut interrupt).await? {
                    Some(token) => mode = select_mode(&token),
                    None => return Ok(LaunchOutcome::Interrupted),
                }
            }
        }
    }
}

/// Turn a mode's result into the process exit code.
///
/// Operator interrupts exit successfully. Session-ending failures (missing
/// tool, failed build or install, missing project directory, dead service)
/// are reported as a status line and exit with failure. Anything else is
/// returned to `main`.
pub fn report_outcome(finished: errors::Result<LaunchOutcome>) -> errors::Result<ExitCode> {
    match finished {
        Ok(LaunchOutcome::Interrupted) | Err(StackrunError::Interrupted) => {
            menu::print_goodbye();
            Ok(ExitCode::SUCCESS)
        }
        Ok(LaunchOutcome::Exited(0)) => Ok(ExitCode::SUCCESS),
        Ok(LaunchOutcome::Exited(code)) => {
            debug!(exit_code = code, "foreground process failed");
            Ok(ExitCode::FAILURE)
        }
        Err(e) if e.is_session_terminal() => {
            println!("Error: {e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e),
    }
}

/// Print the resolved launch plan without spawning anything.
fn print_dry_run(config: &LaunchConfig) {
    println!("stackrun dry-run");
    println!("  artifact:      {}", config.artifact.display());
    println!("  build:         {}", config.build);
    println!("  service (web): {}", config.service_web);
    println!("  service (console): {}", config.service_console);
    println!("  settle_delay:  {:?}", config.settle_delay);
    println!("  stop_grace:    {:?}", config.stop_grace);
    println!();

    let companion = &config.companion;
    println!("companion:");
    println!("  dir:     {}", companion.project_dir.display());
    println!("  marker:  {}", companion.marker.display());
    println!("  install: {}", companion.install);
    println!("  run:     {}", companion.run);
    println!();

    println!("urls:");
    println!("  backend:  {}", config.backend_url);
    println!("  frontend: {}", config.frontend_url);

    debug!("dry-run complete (no execution)");
}
