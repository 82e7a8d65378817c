//! Sharded in-memory module used by the integration tests.
//!
//! Shard 0 acts as coordinator: it applies every change immediately and
//! serves the dump commands. The other shards apply registration changes
//! only after `lag` convergence queries, which is what the poller has to
//! wait out.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use gears_harness::Command;
use gears_harness::CommandExecutor;
use gears_harness::DeploymentMode;
use gears_harness::EnvironmentFactory;
use gears_harness::Error;
use gears_harness::Reply;
use gears_harness::Result;
use gears_harness::TestEnvironment;
use parking_lot::Mutex;

#[derive(Debug, Clone)]
enum Change {
    Register(String),
    Unregister(String),
}

#[derive(Default)]
struct Shard {
    registrations: BTreeSet<String>,
}

#[derive(Default)]
struct Inner {
    shards: Vec<Shard>,
    executions: BTreeSet<String>,
    pending: Vec<(usize, Change)>,
    next_id: u64,
    submissions: Vec<String>,
}

#[derive(Clone)]
pub struct ShardedModule {
    lag: usize,
    mode: DeploymentMode,
    inner: Arc<Mutex<Inner>>,
}

impl ShardedModule {
    pub fn new(
        shards: usize,
        lag: usize,
    ) -> Self {
        let inner = Inner {
            shards: (0..shards).map(|_| Shard::default()).collect(),
            ..Default::default()
        };
        Self {
            lag,
            mode: DeploymentMode::OssCluster,
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn per_shard_registrations(&self) -> Vec<usize> {
        self.inner
            .lock()
            .shards
            .iter()
            .map(|s| s.registrations.len())
            .collect()
    }

    pub fn execution_count(&self) -> usize {
        self.inner.lock().executions.len()
    }

    pub fn submissions(&self) -> Vec<String> {
        self.inner.lock().submissions.clone()
    }

    fn apply(
        inner: &mut Inner,
        change: Change,
        lag: usize,
    ) {
        apply_to(&mut inner.shards[0], &change);
        if lag == 0 {
            for shard in inner.shards.iter_mut().skip(1) {
                apply_to(shard, &change);
            }
        } else {
            inner.pending.push((lag, change));
        }
    }

    /// One convergence query elapsed: age pending changes and apply due ones
    fn tick(inner: &mut Inner) {
        let mut due = Vec::new();
        inner.pending.retain_mut(|(remaining, change)| {
            *remaining -= 1;
            if *remaining == 0 {
                due.push(change.clone());
                false
            } else {
                true
            }
        });
        for change in due {
            for shard in inner.shards.iter_mut().skip(1) {
                apply_to(shard, &change);
            }
        }
    }

    fn handle(
        &self,
        command: &Command,
    ) -> Result<Reply> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let name = command.name.to_ascii_uppercase();
        let first_arg = || command.arg_str(0).unwrap_or_default().to_string();

        let reply: Result<Reply> = match name.as_str() {
            "RG.REFRESHCLUSTER" => Ok(Reply::Status("OK".into())),
            "RG.DUMPREGISTRATIONS" => Ok(Reply::Array(
                inner.shards[0]
                    .registrations
                    .iter()
                    .map(|id| Reply::Array(vec![Reply::from("id"), Reply::from(id.as_str())]))
                    .collect(),
            )),
            "RG.DUMPEXECUTIONS" => Ok(Reply::Array(
                inner
                    .executions
                    .iter()
                    .map(|id| Reply::Array(vec![Reply::from("executionId"), Reply::from(id.as_str())]))
                    .collect(),
            )),
            "RG.UNREGISTER" => {
                let id = first_arg();
                if inner.shards[0].registrations.contains(&id) {
                    Self::apply(inner, Change::Unregister(id), self.lag);
                    Ok(Reply::Status("OK".into()))
                } else {
                    Ok(Reply::Error(format!("no such registration {id}")))
                }
            }
            "RG.DROPEXECUTION" => {
                inner.executions.remove(&first_arg());
                Ok(Reply::Status("OK".into()))
            }
            "RG.PYEXECUTE" => {
                let script = first_arg();
                let counts: Vec<Reply> = if script.contains("RG.DUMPREGISTRATIONS") {
                    inner
                        .shards
                        .iter()
                        .map(|s| Reply::from(s.registrations.len().to_string()))
                        .collect()
                } else {
                    (0..inner.shards.len())
                        .map(|i| {
                            let n = if i == 0 { inner.executions.len() } else { 0 };
                            Reply::from(n.to_string())
                        })
                        .collect()
                };
                Self::tick(inner);
                Ok(Reply::Array(vec![Reply::Array(counts), Reply::Array(vec![])]))
            }
            "RG.JEXECUTE" => {
                let test_name = first_arg();
                inner.submissions.push(test_name.clone());
                if test_name.ends_with("Failure") {
                    return Err(Error::Command {
                        command: command.name.clone(),
                        message: "artifact raised an exception".to_string(),
                    });
                }

                inner.next_id += 1;
                let id = format!("0000000000000000000000000000000000000000-{}", inner.next_id);
                inner.executions.insert(id.clone());
                Self::apply(inner, Change::Register(id), self.lag);

                if test_name.ends_with("Records") {
                    Ok(Reply::Array(vec![
                        Reply::Array(vec![Reply::from(r#"{"n":1}"#), Reply::from(r#"{"n":2}"#)]),
                        Reply::Array(vec![Reply::from("e1")]),
                    ]))
                } else {
                    Ok(Reply::Status("OK".into()))
                }
            }
            _ => Ok(Reply::Status("OK".into())),
        };

        match reply? {
            Reply::Error(message) => Err(Error::Command {
                command: command.name.clone(),
                message,
            }),
            reply => Ok(reply),
        }
    }
}

fn apply_to(
    shard: &mut Shard,
    change: &Change,
) {
    match change {
        Change::Register(id) => {
            shard.registrations.insert(id.clone());
        }
        Change::Unregister(id) => {
            shard.registrations.remove(id);
        }
    }
}

#[async_trait]
impl CommandExecutor for ShardedModule {
    async fn execute(
        &self,
        command: Command,
    ) -> Result<Reply> {
        self.handle(&command)
    }
}

#[async_trait]
impl TestEnvironment for ShardedModule {
    fn mode(&self) -> DeploymentMode {
        self.mode
    }

    fn shard_count(&self) -> usize {
        self.inner.lock().shards.len()
    }

    async fn broadcast(
        &self,
        command: Command,
    ) -> Result<Vec<Reply>> {
        let shards = self.inner.lock().shards.len();
        (0..shards).map(|_| self.handle(&command)).collect()
    }

    async fn connection(&self) -> Result<Arc<dyn CommandExecutor>> {
        Ok(Arc::new(self.clone()))
    }

    async fn cluster_connection(&self) -> Result<Arc<dyn CommandExecutor>> {
        Ok(Arc::new(self.clone()))
    }
}

pub struct ShardedModuleFactory {
    pub module: ShardedModule,
}

#[async_trait]
impl EnvironmentFactory for ShardedModuleFactory {
    async fn create(
        &self,
        _test_name: &str,
        mode: DeploymentMode,
        _env_args: &HashMap<String, String>,
    ) -> Result<Arc<dyn TestEnvironment>> {
        let mut module = self.module.clone();
        module.mode = mode;
        Ok(Arc::new(module))
    }
}
