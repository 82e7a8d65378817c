//! Cluster consistency polling.
//!
//! The module never pushes a completion event when a registration reaches
//! every shard or when a drop has been applied everywhere, so the poller
//! asks each shard for its view and repeats until all views agree. Every
//! check runs under a [`DeadlineGuard`](crate::DeadlineGuard); a shard that
//! reports a stale or divergent value only delays convergence, and the
//! deadline expiring is the only way a check fails on its own.
mod snapshot;
pub use snapshot::*;


use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::utils::colors;
use crate::with_deadline;
use crate::CleanupError;
use crate::CommandExecutor;
use crate::ModuleClient;
use crate::PollConfig;
use crate::Result;
use crate::VerificationError;

/// Per-shard views observed when the drain check converged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainedState {
    pub registrations: ShardConsensusSnapshot,
    pub executions: ShardConsensusSnapshot,
}

#[derive(Debug, Clone, Default)]
pub struct ConsistencyPoller {
    config: PollConfig,
    expected_shards: Option<usize>,
}

impl ConsistencyPoller {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            expected_shards: None,
        }
    }

    /// Only count a poll as converged once `shards` shards answered
    pub fn expecting_shards(
        mut self,
        shards: usize,
    ) -> Self {
        self.expected_shards = Some(shards);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    fn observe(
        &self,
        snapshot: ShardConsensusSnapshot,
    ) -> ShardConsensusSnapshot {
        match self.expected_shards {
            Some(shards) => snapshot.expecting(shards),
            None => snapshot,
        }
    }

    /// Waits until every shard reports the same registration count.
    ///
    /// # Errors
    /// `VerificationError::RegistrationIntegrity` when the shards do not agree
    /// before `poll.integrity_timeout_ms`; transport errors of the query
    /// command are returned as is.
    pub async fn verify_registration_integrity<E>(
        &self,
        executor: &E,
    ) -> Result<ShardConsensusSnapshot>
    where
        E: CommandExecutor + ?Sized,
    {
        let client = ModuleClient::new(executor);
        let allow_empty = self.config.allow_empty_registrations;

        let outcome = with_deadline("registration integrity", self.config.integrity_timeout(), async {
            let mut attempt: u64 = 0;
            loop {
                attempt += 1;
                let snapshot = self.observe(client.shard_metric(ShardMetric::Registrations).await?);
                if snapshot.has_registration_consensus(allow_empty) {
                    debug!("registrations converged after {attempt} poll(s): {:?}", snapshot.values());
                    return Ok::<_, crate::Error>(snapshot);
                }
                if !snapshot.shard_errors().is_empty() {
                    warn!("shard errors while counting registrations: {:?}", snapshot.shard_errors());
                }
                if !snapshot.is_complete() {
                    warn!("only {} shard(s) answered the registration count", snapshot.values().len());
                }
                tokio::time::sleep(self.config.interval()).await;
            }
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(timeout) => {
                error!("{}", colors::bred(&timeout.to_string()));
                Err(VerificationError::RegistrationIntegrity(timeout).into())
            }
        }
    }

    /// Waits until every shard reports zero registrations and zero executions.
    ///
    /// # Errors
    /// `CleanupError::NotDrained` when residual state survives
    /// `poll.drain_timeout_ms`; transport errors are returned as is.
    pub async fn verify_drained<E>(
        &self,
        executor: &E,
    ) -> Result<DrainedState>
    where
        E: CommandExecutor + ?Sized,
    {
        let client = ModuleClient::new(executor);

        let outcome = with_deadline("drain", self.config.drain_timeout(), async {
            loop {
                let registrations = self.observe(client.shard_metric(ShardMetric::Registrations).await?);
                let executions = self.observe(client.shard_metric(ShardMetric::Executions).await?);
                if registrations.is_drained() && executions.is_drained() {
                    return Ok::<_, crate::Error>(DrainedState {
                        registrations,
                        executions,
                    });
                }
                debug!(
                    "waiting for drain, registrations: {:?}, executions: {:?}",
                    registrations.values(),
                    executions.values()
                );
                tokio::time::sleep(self.config.interval()).await;
            }
        })
        .await;

        match outcome {
            Ok(result) => result,
            Err(timeout) => {
                error!("{}", colors::bred(&timeout.to_string()));
                Err(CleanupError::NotDrained(timeout).into())
            }
        }
    }
}
