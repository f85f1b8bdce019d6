// src/service/mod.rs

//! Backend service supervision: spawn, settle-and-sample, terminate, and
//! the scoped guard that ties the service's lifetime to a session.

pub mod guard;
pub mod supervisor;

pub use guard::ServiceGuard;
pub use supervisor::{ServiceSupervisor, SettleOutcome};
