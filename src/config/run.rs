use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::DeploymentMode;
use crate::Error;
use crate::Result;
use crate::DEFAULT_ARTIFACT_PATH;
use crate::DEFAULT_TEST_NAME_PREFIX;

/// Parameters shared by every orchestrated test run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunConfig {
    /// Prebuilt artifact submitted by every test
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Prefix of the remote test name, `<prefix>.<test function>`
    #[serde(default = "default_test_name_prefix")]
    pub test_name_prefix: String,

    /// Deployment the environment factory should bring up
    #[serde(default)]
    pub mode: DeploymentMode,

    /// Opaque arguments forwarded to the environment factory
    #[serde(default)]
    pub env_args: HashMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            test_name_prefix: default_test_name_prefix(),
            mode: DeploymentMode::default(),
            env_args: HashMap::new(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.artifact_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("run.artifact_path cannot be empty".into()));
        }

        if self.test_name_prefix.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "run.test_name_prefix cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Remote name of a test function, e.g. `gears_tests.testBasicJavaApi`
    pub fn test_name(
        &self,
        function_name: &str,
    ) -> String {
        format!("{}.{}", self.test_name_prefix, function_name)
    }
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT_PATH)
}
fn default_test_name_prefix() -> String {
    DEFAULT_TEST_NAME_PREFIX.to_string()
}
