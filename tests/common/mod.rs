#![allow(dead_code)]

pub use stackrun_test_utils::builders::LaunchConfigBuilder;
pub use stackrun_test_utils::fake_backend::{
    CompanionBehaviour, FakeProcessBackend, FakeServiceState, ServiceBehaviour,
};
pub use stackrun_test_utils::{init_tracing, with_timeout};

use stackrun::fs::mock::MockFileSystem;

/// Mock filesystem with the artifact and the companion project (including
/// its dependency marker) already in place.
pub fn ready_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("target/app.jar", "jar");
    fs.add_dir("frontend/node_modules");
    fs
}
