//! Test Run Orchestrator.
//!
//! One run walks the phases
//! `INIT -> CONNECTED -> (PRE_HOOK)? -> SUBMITTED -> (INTEGRITY_VERIFIED | SUBMIT_FAILED)
//!  -> RESULTS_DECODED -> ASSERTED -> (POST_HOOK)? -> CLEANED_UP -> DONE`.
//!
//! Failures of the convergence checks, hooks and cleanup are recorded on the
//! [`TestRunContext`] and reported together once the run is over. Submission
//! failures are data: they reach the test body as `execution_error`.
//! Cleanup runs on every path, including a panicking test body.
mod context;
pub use context::*;


use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::info;
use tracing::warn;

use crate::acquire_connection;
use crate::load_artifact;
use crate::utils::colors;
use crate::CleanupCoordinator;
use crate::CommandExecutor;
use crate::ConsistencyPoller;
use crate::DecodedResults;
use crate::EnvironmentFactory;
use crate::Error;
use crate::HarnessConfig;
use crate::ModuleClient;
use crate::Result;
use crate::SubmissionError;
use crate::SubmissionOutcome;
use crate::TestEnvironment;

/// Handles passed to pre/post hooks
#[derive(Clone)]
pub struct HookArgs {
    pub env: Arc<dyn TestEnvironment>,
    pub conn: Arc<dyn CommandExecutor>,
}

pub type Hook = Arc<dyn Fn(HookArgs) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Everything the test body gets to assert on
pub struct TestArgs {
    pub env: Arc<dyn TestEnvironment>,
    pub conn: Arc<dyn CommandExecutor>,
    pub results: DecodedResults,
    pub errs: Vec<String>,
    pub execution_error: Option<SubmissionError>,
}

pub struct TestRun {
    factory: Arc<dyn EnvironmentFactory>,
    config: HarnessConfig,
    poller: ConsistencyPoller,
    pre_execute: Option<Hook>,
    post_execution: Option<Hook>,
}

impl TestRun {
    pub fn new(
        factory: Arc<dyn EnvironmentFactory>,
        config: HarnessConfig,
    ) -> Self {
        let poller = ConsistencyPoller::new(config.poll.clone());
        Self {
            factory,
            config,
            poller,
            pre_execute: None,
            post_execution: None,
        }
    }

    /// Hook run after connecting and before the artifact is submitted
    pub fn pre_execute(
        mut self,
        hook: Hook,
    ) -> Self {
        self.pre_execute = Some(hook);
        self
    }

    /// Hook run after the test body and before cleanup
    pub fn post_execution(
        mut self,
        hook: Hook,
    ) -> Self {
        self.post_execution = Some(hook);
        self
    }

    /// Runs the whole lifecycle for the test function `function_name`.
    ///
    /// # Errors
    /// - Environment creation failures are returned immediately; nothing has
    ///   touched the cluster yet.
    /// - Everything recorded during the run is returned as
    ///   `Error::TestFailed` after cleanup.
    ///
    /// # Panics
    /// A panic raised by the test body or a hook is resumed after cleanup.
    pub async fn run<F, Fut>(
        &self,
        function_name: &str,
        body: F,
    ) -> Result<TestReport>
    where
        F: FnOnce(TestArgs) -> Fut,
        Fut: Future<Output = ()>,
    {
        let test_name = self.config.run.test_name(function_name);
        info!("{}", colors::cyan(&format!("\tRunning: {test_name}")));

        let env = self
            .factory
            .create(&test_name, self.config.run.mode, &self.config.run.env_args)
            .await?;
        let mut ctx = TestRunContext::new(test_name, env.clone());
        let poller = self.poller.clone().expecting_shards(env.shard_count());

        let panic = match acquire_connection(env.as_ref()).await {
            Ok(conn) => {
                ctx.conn = Some(conn.clone());
                ctx.advance(RunPhase::Connected);
                AssertUnwindSafe(self.execute(&mut ctx, &poller, conn, body))
                    .catch_unwind()
                    .await
                    .err()
            }
            Err(e) => {
                ctx.record_failure(e);
                None
            }
        };

        match CleanupCoordinator::new(&poller).drain(env.as_ref()).await {
            Ok(report) => ctx.cleanup = Some(report),
            Err(e) => ctx.record_failure(e),
        }
        ctx.advance(RunPhase::CleanedUp);
        ctx.advance(RunPhase::Done);

        if let Some(payload) = panic {
            std::panic::resume_unwind(payload);
        }

        if ctx.failures.is_empty() {
            Ok(ctx.into_report())
        } else {
            Err(Error::TestFailed {
                test_name: ctx.test_name,
                failures: ctx.failures,
            })
        }
    }

    async fn execute<F, Fut>(
        &self,
        ctx: &mut TestRunContext,
        poller: &ConsistencyPoller,
        conn: Arc<dyn CommandExecutor>,
        body: F,
    ) where
        F: FnOnce(TestArgs) -> Fut,
        Fut: Future<Output = ()>,
    {
        let env = ctx.env.clone();
        let hook_args = HookArgs {
            env: env.clone(),
            conn: conn.clone(),
        };

        if let Some(hook) = &self.pre_execute {
            ctx.advance(RunPhase::PreHook);
            if let Err(e) = hook(hook_args.clone()).await {
                ctx.record_failure(Error::Hook {
                    hook: "pre-execute",
                    source: Box::new(e),
                });
                return;
            }
        }

        match self.submit(env.as_ref(), &ctx.test_name).await {
            Ok(outcome) => {
                ctx.outcome = outcome;
                ctx.advance(RunPhase::Submitted);
                match poller.verify_registration_integrity(env.as_ref()).await {
                    Ok(_) => ctx.advance(RunPhase::IntegrityVerified),
                    Err(e) => ctx.record_failure(e),
                }
            }
            Err(e) => {
                warn!("[{}] submission failed: {}", ctx.test_name, e);
                ctx.execution_error = Some(SubmissionError::from(&e));
                ctx.outcome = SubmissionOutcome::empty();
                ctx.advance(RunPhase::SubmitFailed);
            }
        }

        match ctx.outcome.decode() {
            Ok((results, errs)) => {
                ctx.results = Some(results.clone());
                ctx.errs = errs.clone();
                ctx.advance(RunPhase::ResultsDecoded);

                body(TestArgs {
                    env: env.clone(),
                    conn: conn.clone(),
                    results,
                    errs,
                    execution_error: ctx.execution_error.clone(),
                })
                .await;
                ctx.advance(RunPhase::Asserted);
            }
            Err(e) => ctx.record_failure(e.into()),
        }

        if let Some(hook) = &self.post_execution {
            ctx.advance(RunPhase::PostHook);
            if let Err(e) = hook(hook_args).await {
                ctx.record_failure(Error::Hook {
                    hook: "post-execution",
                    source: Box::new(e),
                });
            }
        }
    }

    async fn submit(
        &self,
        env: &dyn TestEnvironment,
        test_name: &str,
    ) -> Result<SubmissionOutcome> {
        let artifact = load_artifact(&self.config.run.artifact_path).await?;
        ModuleClient::new(env).submit_execution(test_name, &artifact).await
    }
}
