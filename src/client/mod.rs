//! Typed access to the module command protocol.


use tracing::debug;

use crate::CleanupError;
use crate::Command;
use crate::CommandExecutor;
use crate::DumpEntry;
use crate::Result;
use crate::ShardConsensusSnapshot;
use crate::ShardMetric;
use crate::SubmissionOutcome;
use crate::RG_DROPEXECUTION;
use crate::RG_DUMPEXECUTIONS;
use crate::RG_DUMPREGISTRATIONS;
use crate::RG_JEXECUTE;
use crate::RG_PYEXECUTE;
use crate::RG_UNREGISTER;

pub struct ModuleClient<'a, E: CommandExecutor + ?Sized> {
    executor: &'a E,
}

impl<'a, E: CommandExecutor + ?Sized> ModuleClient<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    pub async fn dump_executions(&self) -> Result<Vec<DumpEntry>> {
        let reply = self.executor.execute(Command::new(RG_DUMPEXECUTIONS)).await?;
        Ok(DumpEntry::parse_all(reply, RG_DUMPEXECUTIONS)?)
    }

    pub async fn dump_registrations(&self) -> Result<Vec<DumpEntry>> {
        let reply = self.executor.execute(Command::new(RG_DUMPREGISTRATIONS)).await?;
        Ok(DumpEntry::parse_all(reply, RG_DUMPREGISTRATIONS)?)
    }

    /// Removes one execution; anything but `OK` is a cleanup failure
    pub async fn drop_execution(
        &self,
        id: &str,
    ) -> Result<()> {
        self.acknowledged(RG_DROPEXECUTION, id).await
    }

    /// Removes one registration; anything but `OK` is a cleanup failure
    pub async fn unregister(
        &self,
        id: &str,
    ) -> Result<()> {
        self.acknowledged(RG_UNREGISTER, id).await
    }

    /// Submits a packaged artifact under `test_name` for remote execution
    pub async fn submit_execution(
        &self,
        test_name: &str,
        artifact: &[u8],
    ) -> Result<SubmissionOutcome> {
        let reply = self
            .executor
            .execute(Command::new(RG_JEXECUTE).arg(test_name).arg(artifact))
            .await?;
        Ok(SubmissionOutcome::parse(reply)?)
    }

    /// Runs the per-shard query for `metric` and collects one value per shard.
    ///
    /// Errors raised by individual shards are returned in the snapshot rather
    /// than failing the call.
    pub async fn shard_metric(
        &self,
        metric: ShardMetric,
    ) -> Result<ShardConsensusSnapshot> {
        let reply = self
            .executor
            .execute(Command::new(RG_PYEXECUTE).arg(metric.script()))
            .await?;
        let snapshot = ShardConsensusSnapshot::from_reply(metric, reply)?;
        debug!("{:?} per shard: {:?}", metric, snapshot.values());
        Ok(snapshot)
    }

    async fn acknowledged(
        &self,
        command: &'static str,
        id: &str,
    ) -> Result<()> {
        let reply = self.executor.execute(Command::new(command).arg(id)).await?;
        if reply.is_ok() {
            Ok(())
        } else {
            Err(CleanupError::NotAcknowledged {
                command,
                id: id.to_string(),
                reply: reply.to_string(),
            }
            .into())
        }
    }
}
