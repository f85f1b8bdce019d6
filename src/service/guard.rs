// src/service/guard.rs

//! Scoped ownership of the service process.
//!
//! A [`ServiceGuard`] is created right after the service is spawned and is
//! consumed by [`ServiceGuard::release`] (normally through
//! `ServiceSupervisor::terminate`), which terminates the service and waits
//! for it to exit. Because `release` takes the guard by value it can
//! run at most once. If a guard is dropped without being released (the
//! owning future was cancelled or panicked) the service is killed
//! synchronously from `Drop`.

use std::time::Duration;

use tracing::{info, warn};

use crate::errors::Result;
use crate::exec::{ServiceHandle, Termination};

#[derive(Debug)]
pub struct ServiceGuard {
    handle: Option<Box<dyn ServiceHandle>>,
}

impl ServiceGuard {
    pub fn new(handle: Box<dyn ServiceHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().and_then(|h| h.pid())
    }

    /// Borrow the guarded handle for sampling or waiting.
    pub fn handle_mut(&mut self) -> &mut dyn ServiceHandle {
        match self.handle.as_mut() {
            Some(handle) => handle.as_mut(),
            // Only `release` and `Drop` take the handle, and both consume
            // the guard.
            None => unreachable!("service guard used after release"),
        }
    }

    /// Terminate the service, force-killing it after `grace`, and wait for
    /// it to exit.
    pub async fn release(mut self, grace: Duration) -> Result<Termination> {
        let Some(mut handle) = self.handle.take() else {
            return Ok(Termination::AlreadyExited);
        };

        let pid = handle.pid();
        let termination = handle.terminate(grace).await?;
        match termination {
            Termination::AlreadyExited => info!(?pid, "service had already exited"),
            Termination::Stopped => info!(?pid, "service stopped"),
            Termination::Killed => warn!(?pid, "service had to be force-killed"),
        }
        Ok(termination)
    }
}

impl Drop for ServiceGuard {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            warn!(pid = ?handle.pid(), "service guard dropped without release; killing service");
            handle.kill_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::BoxFuture;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Tracked {
        alive: AtomicBool,
        terminates: AtomicUsize,
        kills: AtomicUsize,
    }

    #[derive(Debug)]
    struct TrackedHandle(Arc<Tracked>);

    impl ServiceHandle for TrackedHandle {
        fn pid(&self) -> Option<u32> {
            Some(42)
        }

        fn is_running(&mut self) -> Result<bool> {
            Ok(self.0.alive.load(Ordering::SeqCst))
        }

        fn wait(&mut self) -> BoxFuture<'_, Result<i32>> {
            Box::pin(async { Ok(0) })
        }

        fn terminate(&mut self, _grace: Duration) -> BoxFuture<'_, Result<Termination>> {
            Box::pin(async move {
                self.0.terminates.fetch_add(1, Ordering::SeqCst);
                if self.0.alive.swap(false, Ordering::SeqCst) {
                    Ok(Termination::Stopped)
                } else {
                    Ok(Termination::AlreadyExited)
                }
            })
        }

        fn kill_now(&mut self) {
            self.0.kills.fetch_add(1, Ordering::SeqCst);
            self.0.alive.store(false, Ordering::SeqCst);
        }
    }

    fn tracked(alive: bool) -> Arc<Tracked> {
        let p = Arc::new(Tracked::default());
        p.alive.store(alive, Ordering::SeqCst);
        p
    }

    #[tokio::test]
    async fn release_terminates_live_service() {
        let p = tracked(true);
        let guard = ServiceGuard::new(Box::new(TrackedHandle(p.clone())));

        assert_eq!(guard.release(Duration::from_secs(1)).await.unwrap(), Termination::Stopped);
        assert_eq!(p.terminates.load(Ordering::SeqCst), 1);
        assert_eq!(p.kills.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn release_of_dead_service_is_a_no_op() {
        let p = tracked(false);
        let guard = ServiceGuard::new(Box::new(TrackedHandle(p.clone())));

        assert_eq!(
            guard.release(Duration::from_secs(1)).await.unwrap(),
            Termination::AlreadyExited
        );
    }

    #[test]
    fn drop_without_release_kills() {
        let p = tracked(true);
        {
            let _guard = ServiceGuard::new(Box::new(TrackedHandle(p.clone())));
        }
        assert_eq!(p.kills.load(Ordering::SeqCst), 1);
        assert!(!p.alive.load(Ordering::SeqCst));
    }
}
