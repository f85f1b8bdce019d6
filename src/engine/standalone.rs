// src/engine/standalone.rs

//! Single-process launch modes.

use tracing::info;

use crate::errors::Result;
use crate::exec::StdioMode;
use crate::service::ServiceGuard;
use crate::types::ProcessRole;

use super::{Interrupt, LaunchContext, LaunchOutcome};

/// Run the service alone in web mode, attached to the terminal.
///
/// Ctrl-C terminates the service and waits for it to exit before
/// returning.
pub async fn run_web(ctx: LaunchContext<'_>, mut interrupt: Interrupt) -> Result<LaunchOutcome> {
    ctx.build_checker().ensure_artifact().await?;

    let config = ctx.config;
    println!("Starting web server...");
    println!("Backend available at: {}", config.backend_url);
    println!("To start the frontend, run in another terminal:");
    println!(
        "   cd {} && {}",
        config.companion.project_dir.display(),
        config.companion.run.command_line()
    );
    println!("Then open: {}", config.frontend_url);
    println!();

    let supervisor = ctx.supervisor();
    let handle = supervisor.spawn(&config.service_web, StdioMode::Inherit)?;
    let mut guard = ServiceGuard::new(handle);
    info!(pid = ?guard.pid(), "web service started");

    let waited = tokio::select! {
        code = guard.handle_mut().wait() => Some(code),
        () = interrupt.interrupted() => None,
    };

    let outcome = match waited {
        Some(Ok(code)) => {
            if code != 0 {
                println!("Server exited with code {code}");
            }
            Ok(LaunchOutcome::Exited(code))
        }
        Some(Err(e)) => Err(e),
        None => {
            println!();
            println!("Stopping web server...");
            Ok(LaunchOutcome::Interrupted)
        }
    };

    let released = supervisor.terminate(guard).await;
    let outcome = outcome?;
    released?;
    Ok(outcome)
}

/// Run the service's interactive console in the foreground until it exits.
pub async fn run_console(ctx: LaunchContext<'_>) -> Result<LaunchOutcome> {
    ctx.build_checker().ensure_artifact().await?;

    println!("Starting console mode...");
    let code = ctx
        .backend
        .run_to_completion(&ctx.config.service_console, ProcessRole::Service)
        .await?;

    if code != 0 {
        println!("Console exited with code {code}");
    }
    Ok(LaunchOutcome::Exited(code))
}

/// Run the build unconditionally, whether or not the artifact exists.
pub async fn rebuild(ctx: LaunchContext<'_>) -> Result<()> {
    println!("Recompiling project...");
    ctx.build_runner().run().await
}
