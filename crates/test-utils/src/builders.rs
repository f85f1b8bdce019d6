use stackrun::config::{LaunchConfig, RawLaunchConfig};

/// Builder for `LaunchConfig` with test-friendly defaults: short settle
/// delay and stop grace, and a small artifact path.
pub struct LaunchConfigBuilder {
    raw: RawLaunchConfig,
}

impl LaunchConfigBuilder {
    pub fn new() -> Self {
        let mut raw = RawLaunchConfig::default();
        raw.build.artifact = "target/app.jar".to_string();
        raw.service.settle_delay = "50ms".to_string();
        raw.service.stop_grace = "500ms".to_string();
        Self { raw }
    }

    pub fn artifact(mut self, path: &str) -> Self {
        self.raw.build.artifact = path.to_string();
        self
    }

    /// Set the build tool for every platform.
    pub fn build_tool(mut self, program: &str, args: &[&str]) -> Self {
        self.raw.build.tool = program.to_string();
        self.raw.build.tool_windows = program.to_string();
        self.raw.build.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn service(mut self, program: &str, args: &[&str]) -> Self {
        self.raw.service.program = program.to_string();
        self.raw.service.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn settle_delay(mut self, delay: &str) -> Self {
        self.raw.service.settle_delay = delay.to_string();
        self
    }

    pub fn stop_grace(mut self, grace: &str) -> Self {
        self.raw.service.stop_grace = grace.to_string();
        self
    }

    pub fn companion_dir(mut self, dir: &str) -> Self {
        self.raw.companion.dir = dir.to_string();
        self
    }

    pub fn companion_install(mut self, argv: &[&str]) -> Self {
        self.raw.companion.install = argv.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn companion_run(mut self, argv: &[&str]) -> Self {
        self.raw.companion.run = argv.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> LaunchConfig {
        LaunchConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

impl Default for LaunchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
