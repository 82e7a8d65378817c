//! Seams to the surrounding test environment.
//!
//! The harness never talks to a server directly. A [`TestEnvironment`]
//! brings up (or attaches to) a single-node or clustered deployment and
//! hands out connections; both environments and connections issue commands
//! through [`CommandExecutor`].


use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::Command;
use crate::Error;
use crate::Reply;
use crate::Result;
use crate::RG_REFRESHCLUSTER;

/// Deployment flavour the environment runs against
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    #[default]
    Oss,
    OssCluster,
    Enterprise,
    #[serde(rename = "existing-env")]
    Existing,
}

impl DeploymentMode {
    pub fn is_cluster(&self) -> bool {
        matches!(self, DeploymentMode::OssCluster)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Sends one command and waits for its reply. Error replies from the
    /// server are returned as `Err`.
    async fn execute(
        &self,
        command: Command,
    ) -> Result<Reply>;
}

#[async_trait]
pub trait TestEnvironment: CommandExecutor {
    fn mode(&self) -> DeploymentMode;

    /// Number of shards in the deployment, 1 for a single node
    fn shard_count(&self) -> usize;

    /// Sends `command` to every shard and returns the per-shard replies
    async fn broadcast(
        &self,
        command: Command,
    ) -> Result<Vec<Reply>>;

    /// Connection to the single node deployment
    async fn connection(&self) -> Result<Arc<dyn CommandExecutor>>;

    /// Cluster-aware connection routing keys to their owning shard
    async fn cluster_connection(&self) -> Result<Arc<dyn CommandExecutor>>;
}

/// Brings up one environment per test run
#[async_trait]
pub trait EnvironmentFactory: Send + Sync {
    async fn create(
        &self,
        test_name: &str,
        mode: DeploymentMode,
        env_args: &HashMap<String, String>,
    ) -> Result<Arc<dyn TestEnvironment>>;
}

/// Picks the connection matching the deployment. Cluster deployments first
/// refresh every shard's topology view so keys route correctly.
pub async fn acquire_connection(env: &dyn TestEnvironment) -> Result<Arc<dyn CommandExecutor>> {
    if env.mode().is_cluster() {
        let acks = env.broadcast(Command::new(RG_REFRESHCLUSTER)).await?;
        let refreshed = acks.iter().filter(|ack| ack.is_ok()).count();
        if refreshed != env.shard_count() {
            return Err(Error::Environment(format!(
                "{} acknowledged by {} of {} shard(s)",
                RG_REFRESHCLUSTER,
                refreshed,
                env.shard_count()
            )));
        }
        debug!("{} refreshed on {} shard(s)", RG_REFRESHCLUSTER, refreshed);
        env.cluster_connection().await
    } else {
        env.connection().await
    }
}
