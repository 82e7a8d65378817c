//! Cleanup Coordinator: returns the cluster to an empty state between tests
//! and proves it with the poller's drain check.


use tracing::debug;
use tracing::info;

use crate::utils::colors;
use crate::CleanupError;
use crate::CommandExecutor;
use crate::ConsistencyPoller;
use crate::DrainedState;
use crate::Error;
use crate::ModuleClient;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub dropped_executions: usize,
    pub unregistered: usize,
}

pub struct CleanupCoordinator<'a> {
    poller: &'a ConsistencyPoller,
}

impl<'a> CleanupCoordinator<'a> {
    pub fn new(poller: &'a ConsistencyPoller) -> Self {
        Self { poller }
    }

    /// Drops every execution, unregisters every registration, then waits
    /// until every shard reports nothing left.
    ///
    /// Running it on an already empty cluster issues no drop or unregister
    /// command.
    ///
    /// # Errors
    /// Every failure is a [`CleanupError`]: a command that is not
    /// acknowledged, a failed dump, or a drain check that times out.
    pub async fn drain<E>(
        &self,
        executor: &E,
    ) -> Result<CleanupReport>
    where
        E: CommandExecutor + ?Sized,
    {
        let client = ModuleClient::new(executor);
        let mut report = CleanupReport::default();

        let executions = client.dump_executions().await.map_err(into_cleanup)?;
        for execution in &executions {
            client.drop_execution(&execution.id).await.map_err(into_cleanup)?;
            report.dropped_executions += 1;
        }

        let registrations = client.dump_registrations().await.map_err(into_cleanup)?;
        for registration in &registrations {
            client.unregister(&registration.id).await.map_err(into_cleanup)?;
            report.unregistered += 1;
        }
        debug!(
            "dropped {} execution(s), unregistered {} registration(s)",
            report.dropped_executions, report.unregistered
        );

        let DrainedState {
            registrations,
            executions,
        } = self.poller.verify_drained(executor).await.map_err(into_cleanup)?;
        info!(
            "{}",
            colors::green(&format!(
                "cluster drained on {} shard(s)",
                registrations.values().len().max(executions.values().len())
            ))
        );

        Ok(report)
    }
}

fn into_cleanup(e: Error) -> Error {
    match e {
        Error::Cleanup(_) => e,
        other => CleanupError::Command(Box::new(other)).into(),
    }
}
