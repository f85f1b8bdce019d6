use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stackrun::engine::Interrupt;
use stackrun::errors::{Result, StackrunError};
use stackrun::exec::{
    BoxFuture, CommandSpec, CompanionExit, ProcessBackend, ServiceHandle, StdioMode, Termination,
};
use stackrun::fs::mock::MockFileSystem;
use stackrun::types::ProcessRole;

/// How the fake service behaves once spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceBehaviour {
    /// Runs until terminated; exits on the graceful stop request.
    StaysUp,
    /// Runs until terminated; ignores the stop request and has to be killed.
    IgnoresStop,
    /// Exits with this code right after spawning.
    DiesImmediately(i32),
}

/// How the fake companion behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionBehaviour {
    Exits(i32),
    WaitsForInterrupt,
}

/// Shared view of the (single) fake service process.
#[derive(Debug, Default)]
pub struct FakeServiceState {
    alive: AtomicBool,
    spawned: AtomicUsize,
    terminations: AtomicUsize,
    kills: AtomicUsize,
}

impl FakeServiceState {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }
}

/// A scripted process backend that:
/// - records every call as `"<role>:<program>"` (plus `"terminate:<program>"`)
/// - answers foreground runs with scripted exit codes
/// - creates the build artifact / dependency marker in a `MockFileSystem`
///   when the build / install succeeds
pub struct FakeProcessBackend {
    fs: MockFileSystem,
    artifact: Option<PathBuf>,
    marker: Option<PathBuf>,
    build_exit: i32,
    install_exit: i32,
    console_exit: i32,
    install_delay: Duration,
    stop_delay: Duration,
    missing: HashSet<String>,
    service: ServiceBehaviour,
    companion: CompanionBehaviour,
    calls: Arc<Mutex<Vec<String>>>,
    service_state: Arc<FakeServiceState>,
}

impl FakeProcessBackend {
    pub fn new(fs: MockFileSystem) -> Self {
        Self {
            fs,
            artifact: None,
            marker: None,
            build_exit: 0,
            install_exit: 0,
            console_exit: 0,
            install_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
            missing: HashSet::new(),
            service: ServiceBehaviour::StaysUp,
            companion: CompanionBehaviour::Exits(0),
            calls: Arc::new(Mutex::new(Vec::new())),
            service_state: Arc::new(FakeServiceState::default()),
        }
    }

    /// File the build creates when it exits 0.
    pub fn build_creates(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    /// Directory the install creates when it exits 0.
    pub fn install_creates(mut self, marker: impl Into<PathBuf>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn build_exits(mut self, code: i32) -> Self {
        self.build_exit = code;
        self
    }

    pub fn install_exits(mut self, code: i32) -> Self {
        self.install_exit = code;
        self
    }

    pub fn console_exits(mut self, code: i32) -> Self {
        self.console_exit = code;
        self
    }

    /// The install runs this long before exiting.
    pub fn install_takes(mut self, delay: Duration) -> Self {
        self.install_delay = delay;
        self
    }

    /// The service takes this long to exit once asked to stop.
    pub fn stop_takes(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    /// Spawning this program fails with `ToolNotFound`.
    pub fn missing_program(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn service(mut self, behaviour: ServiceBehaviour) -> Self {
        self.service = behaviour;
        self
    }

    pub fn companion(mut self, behaviour: CompanionBehaviour) -> Self {
        self.companion = behaviour;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix` (e.g. `"build:"`).
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn service_state(&self) -> Arc<FakeServiceState> {
        Arc::clone(&self.service_state)
    }

    fn record(&self, role: &str, program: &str) {
        self.calls.lock().unwrap().push(format!("{role}:{program}"));
    }

    fn check_installed(&self, program: &str) -> Result<()> {
        if self.missing.contains(program) {
            Err(StackrunError::ToolNotFound(program.to_string()))
        } else {
            Ok(())
        }
    }
}

impl ProcessBackend for FakeProcessBackend {
    fn run_to_completion<'a>(
        &'a self,
        spec: &'a CommandSpec,
        role: ProcessRole,
    ) -> BoxFuture<'a, Result<i32>> {
        Box::pin(async move {
            self.check_installed(&spec.program)?;
            self.record(&role.to_string(), &spec.program);

            if role == ProcessRole::Install && !self.install_delay.is_zero() {
                tokio::time::sleep(self.install_delay).await;
            }

            let code = match role {
                ProcessRole::Build => self.build_exit,
                ProcessRole::Install => self.install_exit,
                ProcessRole::Service => self.console_exit,
                ProcessRole::Companion => 0,
            };

            if code == 0 {
                match role {
                    ProcessRole::Build => {
                        if let Some(artifact) = &self.artifact {
                            self.fs.add_file(artifact, "jar");
                        }
                    }
                    ProcessRole::Install => {
                        if let Some(marker) = &self.marker {
                            self.fs.add_dir(marker);
                        }
                    }
                    _ => {}
                }
            }
            Ok(code)
        })
    }

    fn spawn_service(
        &self,
        spec: &CommandSpec,
        _stdio: StdioMode,
    ) -> Result<Box<dyn ServiceHandle>> {
        self.check_installed(&spec.program)?;
        self.record("service", &spec.program);

        let state = Arc::clone(&self.service_state);
        state.spawned.fetch_add(1, Ordering::SeqCst);

        let exit_code = match self.service {
            ServiceBehaviour::DiesImmediately(code) => {
                state.alive.store(false, Ordering::SeqCst);
                code
            }
            ServiceBehaviour::StaysUp | ServiceBehaviour::IgnoresStop => {
                state.alive.store(true, Ordering::SeqCst);
                0
            }
        };

        Ok(Box::new(FakeServiceHandle {
            program: spec.program.clone(),
            ignores_stop: self.service == ServiceBehaviour::IgnoresStop,
            stop_delay: self.stop_delay,
            exit_code,
            state,
            calls: Arc::clone(&self.calls),
        }))
    }

    fn run_companion<'a>(
        &'a self,
        spec: &'a CommandSpec,
        mut interrupt: Interrupt,
        _grace: Duration,
    ) -> BoxFuture<'a, Result<CompanionExit>> {
        Box::pin(async move {
            self.check_installed(&spec.program)?;
            self.record("companion", &spec.program);

            match self.companion {
                CompanionBehaviour::Exits(code) => Ok(CompanionExit::Exited(code)),
                CompanionBehaviour::WaitsForInterrupt => {
                    interrupt.interrupted().await;
                    Ok(CompanionExit::Interrupted)
                }
            }
        })
    }
}

#[derive(Debug)]
struct FakeServiceHandle {
    program: String,
    ignores_stop: bool,
    stop_delay: Duration,
    exit_code: i32,
    state: Arc<FakeServiceState>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ServiceHandle for FakeServiceHandle {
    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    fn is_running(&mut self) -> Result<bool> {
        Ok(self.state.is_alive())
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<i32>> {
        Box::pin(async move {
            while self.state.is_alive() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            Ok(self.exit_code)
        })
    }

    fn terminate(&mut self, _grace: Duration) -> BoxFuture<'_, Result<Termination>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push(format!("terminate:{}", self.program));
            self.state.terminations.fetch_add(1, Ordering::SeqCst);

            if self.state.is_alive() && !self.stop_delay.is_zero() {
                tokio::time::sleep(self.stop_delay).await;
            }
            if !self.state.alive.swap(false, Ordering::SeqCst) {
                return Ok(Termination::AlreadyExited);
            }
            if self.ignores_stop {
                self.state.kills.fetch_add(1, Ordering::SeqCst);
                Ok(Termination::Killed)
            } else {
                Ok(Termination::Stopped)
            }
        })
    }

    fn kill_now(&mut self) {
        self.state.kills.fetch_add(1, Ordering::SeqCst);
        self.state.alive.store(false, Ordering::SeqCst);
    }
}
