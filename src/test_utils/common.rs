use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::HarnessConfig;
use crate::PollConfig;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Poll settings matching the module defaults: 1s deadline, 100ms interval
pub fn poll_config() -> PollConfig {
    PollConfig::default()
}

/// Harness config pointing at an artifact written into `dir`
pub fn harness_config_with_artifact(dir: &tempfile::TempDir) -> HarnessConfig {
    let path = dir.path().join("gears_tests.jar");
    std::fs::write(&path, b"PK\x03\x04fake-artifact").expect("write artifact");

    let mut config = HarnessConfig::default();
    config.run.artifact_path = path;
    config
}

pub fn shared<T>(value: T) -> Arc<parking_lot::Mutex<T>> {
    Arc::new(parking_lot::Mutex::new(value))
}
