// src/engine/interrupt.rs

//! Operator interrupt channel.
//!
//! Ctrl-C is turned into a value the control flow can `select!` on instead
//! of killing the launcher. Once the listener is installed the default
//! SIGINT behaviour is gone for the life of the process, so a second Ctrl-C
//! during cleanup only logs; it cannot abandon a termination in progress.

use tokio::sync::watch;
use tracing::{info, warn};

/// Receiving side: observed by whatever is currently blocking.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

/// Sending side: fed by the Ctrl-C listener, or by tests.
#[derive(Debug, Clone)]
pub struct InterruptTrigger {
    tx: watch::Sender<bool>,
}

/// Create a connected trigger/interrupt pair.
pub fn channel() -> (InterruptTrigger, Interrupt) {
    let (tx, rx) = watch::channel(false);
    (InterruptTrigger { tx }, Interrupt { rx })
}

impl InterruptTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Interrupt {
    /// An interrupt that never fires.
    pub fn never() -> Self {
        let (_trigger, interrupt) = channel();
        interrupt
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once an interrupt has been requested. If every trigger is
    /// dropped without firing, this never resolves.
    pub async fn interrupted(&mut self) {
        // `wait_for` skips the check once the sender is gone and this
        // receiver has already seen the value.
        if self.is_triggered() {
            return;
        }
        let closed = self.rx.wait_for(|hit| *hit).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Install the Ctrl-C listener and return the interrupt it feeds.
///
/// Must be called from within a Tokio runtime.
pub fn listen_for_ctrl_c() -> Interrupt {
    let (trigger, interrupt) = channel();

    tokio::spawn(async move {
        let mut count: u32 = 0;
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            count += 1;
            if count == 1 {
                info!("interrupt received");
            } else {
                warn!(count, "interrupt received again; shutdown already in progress");
            }
            trigger.trigger();
        }
    });

    interrupt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_waiter() {
        let (trigger, mut interrupt) = channel();
        assert!(!interrupt.is_triggered());

        let waiter = tokio::spawn(async move {
            interrupt.interrupted().await;
            interrupt.is_triggered()
        });

        trigger.trigger();
        let seen = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(seen);
    }

    #[tokio::test]
    async fn already_triggered_resolves_immediately() {
        let (trigger, mut interrupt) = channel();
        trigger.trigger();
        tokio::time::timeout(Duration::from_millis(100), interrupt.interrupted())
            .await
            .expect("should resolve at once");
    }

    #[tokio::test]
    async fn never_does_not_fire() {
        let mut interrupt = Interrupt::never();
        let res = tokio::time::timeout(Duration::from_millis(50), interrupt.interrupted()).await;
        assert!(res.is_err());
        assert!(!interrupt.is_triggered());
    }
}
