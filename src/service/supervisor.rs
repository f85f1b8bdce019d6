// src/service/supervisor.rs

use std::time::Duration;

use tracing::{info, warn};

use crate::engine::Interrupt;
use crate::errors::Result;
use crate::exec::{CommandSpec, ProcessBackend, ServiceHandle, StdioMode, Termination};

use super::guard::ServiceGuard;

/// Result of waiting out the settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Alive,
    Dead,
    /// The operator interrupted before the delay elapsed.
    Interrupted,
}

/// Spawns the backend service and judges whether it survived startup.
///
/// Liveness after the settle delay is a single process sample, not a
/// readiness check: a service that is up but has not bound its port yet is
/// reported `Alive`. Only an immediate crash is detected.
pub struct ServiceSupervisor<'a> {
    backend: &'a dyn ProcessBackend,
    stop_grace: Duration,
}

impl<'a> ServiceSupervisor<'a> {
    pub fn new(backend: &'a dyn ProcessBackend, stop_grace: Duration) -> Self {
        Self {
            backend,
            stop_grace,
        }
    }

    pub fn spawn(&self, command: &CommandSpec, stdio: StdioMode) -> Result<Box<dyn ServiceHandle>> {
        self.backend.spawn_service(command, stdio)
    }

    /// Sleep for exactly `delay`, then sample liveness once.
    pub async fn settle_and_check(
        &self,
        handle: &mut dyn ServiceHandle,
        delay: Duration,
        interrupt: &mut Interrupt,
    ) -> Result<SettleOutcome> {
        info!(
            pid = ?handle.pid(),
            delay_ms = delay.as_millis() as u64,
            "waiting for service to settle"
        );

        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = interrupt.interrupted() => {
                info!("interrupted during settle delay");
                return Ok(SettleOutcome::Interrupted);
            }
        }

        if handle.is_running()? {
            info!(pid = ?handle.pid(), "service alive after settle delay");
            Ok(SettleOutcome::Alive)
        } else {
            warn!(pid = ?handle.pid(), "service exited during settle delay");
            Ok(SettleOutcome::Dead)
        }
    }

    /// Stop a guarded service and wait until it is gone.
    ///
    /// A service that already exited yields `Termination::AlreadyExited`;
    /// one that ignores the stop request is killed after the stop grace.
    pub async fn terminate(&self, guard: ServiceGuard) -> Result<Termination> {
        guard.release(self.stop_grace).await
    }
}
