// src/exec/process.rs

//! Real process backend built on `tokio::process`.

use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::engine::Interrupt;
use crate::errors::Result;
use crate::types::ProcessRole;

use super::backend::{BoxFuture, CompanionExit, ProcessBackend, ServiceHandle, Termination};
use super::command::{CommandSpec, StdioMode, exit_code, spawn_error};

/// Backend that spawns real OS processes.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessBackend;

impl TokioProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for TokioProcessBackend {
    fn run_to_completion<'a>(
        &'a self,
        spec: &'a CommandSpec,
        role: ProcessRole,
    ) -> BoxFuture<'a, Result<i32>> {
        Box::pin(async move {
            info!(%role, cmd = %spec, "starting foreground process");

            let mut child = spec
                .to_command()
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| spawn_error(&spec.program, e))?;

            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for {role} process '{}'", spec.program))?;

            let code = exit_code(status);
            info!(%role, exit_code = code, success = status.success(), "foreground process exited");
            Ok(code)
        })
    }

    fn spawn_service(
        &self,
        spec: &CommandSpec,
        stdio: StdioMode,
    ) -> Result<Box<dyn ServiceHandle>> {
        let mut cmd = spec.to_command();
        stdio.apply(&mut cmd);
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        // Own process group: a Ctrl-C at the terminal reaches the launcher,
        // which then stops the service itself.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|e| spawn_error(&spec.program, e))?;

        info!(
            role = %ProcessRole::Service,
            pid = ?child.id(),
            cmd = %spec,
            ?stdio,
            "spawned service process"
        );

        Ok(Box::new(TokioServiceHandle {
            child,
            program: spec.program.clone(),
        }))
    }

    fn run_companion<'a>(
        &'a self,
        spec: &'a CommandSpec,
        mut interrupt: Interrupt,
        grace: Duration,
    ) -> BoxFuture<'a, Result<CompanionExit>> {
        Box::pin(async move {
            info!(role = %ProcessRole::Companion, cmd = %spec, "starting companion process");

            let mut child = spec
                .to_command()
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| spawn_error(&spec.program, e))?;

            // Either the companion exits on its own, or the operator
            // interrupts. The terminal's SIGINT reaches the companion too, so
            // it usually exits by itself within the grace period.
            tokio::select! {
                status_res = child.wait() => {
                    let status = status_res.context("waiting for companion process")?;
                    let code = exit_code(status);

                    // Ctrl-C raced the interrupt listener: the companion died
                    // of the same SIGINT first.
                    if interrupt.is_triggered() {
                        info!(exit_code = code, "companion exited after operator interrupt");
                        return Ok(CompanionExit::Interrupted);
                    }

                    info!(exit_code = code, success = status.success(), "companion process exited");
                    Ok(CompanionExit::Exited(code))
                }

                () = interrupt.interrupted() => {
                    info!(
                        grace_ms = grace.as_millis() as u64,
                        "interrupt received; waiting for companion to exit"
                    );
                    match tokio::time::timeout(grace, child.wait()).await {
                        Ok(status) => {
                            let status = status.context("waiting for interrupted companion")?;
                            debug!(
                                exit_code = exit_code(status),
                                "companion exited after interrupt"
                            );
                        }
                        Err(_) => {
                            warn!("companion still running after grace period; killing");
                            child.kill().await.context("killing companion process")?;
                        }
                    }
                    Ok(CompanionExit::Interrupted)
                }
            }
        })
    }
}

/// Handle to a service spawned by [`TokioProcessBackend`].
#[derive(Debug)]
pub struct TokioServiceHandle {
    child: Child,
    program: String,
}

impl ServiceHandle for TokioServiceHandle {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn is_running(&mut self) -> Result<bool> {
        let exited = self
            .child
            .try_wait()
            .with_context(|| format!("polling service process '{}'", self.program))?;
        Ok(exited.is_none())
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<i32>> {
        Box::pin(async move {
            let status = self
                .child
                .wait()
                .await
                .with_context(|| format!("waiting for service process '{}'", self.program))?;
            Ok(exit_code(status))
        })
    }

    fn terminate(&mut self, grace: Duration) -> BoxFuture<'_, Result<Termination>> {
        Box::pin(async move {
            if let Some(status) = self
                .child
                .try_wait()
                .context("polling service before terminate")?
            {
                debug!(
                    exit_code = exit_code(status),
                    "service already exited; nothing to terminate"
                );
                return Ok(Termination::AlreadyExited);
            }

            let pid = self.child.id();
            request_stop(&mut self.child).context("requesting service shutdown")?;
            info!(?pid, "stop requested; waiting for service to exit");

            match tokio::time::timeout(grace, self.child.wait()).await {
                Ok(status) => {
                    let status = status.context("waiting for service to stop")?;
                    info!(?pid, exit_code = exit_code(status), "service stopped");
                    Ok(Termination::Stopped)
                }
                Err(_) => {
                    warn!(
                        ?pid,
                        grace_ms = grace.as_millis() as u64,
                        "service ignored stop request; killing"
                    );
                    force_kill(&mut self.child).await?;
                    Ok(Termination::Killed)
                }
            }
        })
    }

    fn kill_now(&mut self) {
        #[cfg(unix)]
        {
            if let Err(e) = signal_group(&self.child, nix::sys::signal::Signal::SIGKILL) {
                debug!(error = %e, "SIGKILL to service process group failed");
            }
        }
        if let Err(e) = self.child.start_kill() {
            debug!(error = %e, "kill_now on service failed (likely already exited)");
        }
    }
}

/// Send `sig` to the process group led by `child`. A group that is already
/// gone is not an error.
#[cfg(unix)]
fn signal_group(child: &Child, sig: nix::sys::signal::Signal) -> std::io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal;
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return Ok(());
    };

    match signal::killpg(Pid::from_raw(pid as i32), sig) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(std::io::Error::from(e)),
    }
}

/// Graceful stop: SIGTERM to the service's process group.
#[cfg(unix)]
fn request_stop(child: &mut Child) -> std::io::Result<()> {
    signal_group(child, nix::sys::signal::Signal::SIGTERM)
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()
}

/// Kill the whole process group, then reap the direct child.
async fn force_kill(child: &mut Child) -> Result<()> {
    #[cfg(unix)]
    {
        if let Err(e) = signal_group(child, nix::sys::signal::Signal::SIGKILL) {
            debug!(error = %e, "SIGKILL to service process group failed");
        }
    }

    child.kill().await.context("killing service process")?;
    Ok(())
}
