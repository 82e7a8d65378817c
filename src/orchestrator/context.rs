use std::fmt;
use std::sync::Arc;

use tracing::debug;
use tracing::error;

use crate::utils::colors;
use crate::CleanupReport;
use crate::CommandExecutor;
use crate::DecodedResults;
use crate::Error;
use crate::SubmissionError;
use crate::SubmissionOutcome;
use crate::TestEnvironment;

/// Lifecycle phases of one orchestrated test, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Init,
    Connected,
    PreHook,
    Submitted,
    IntegrityVerified,
    SubmitFailed,
    ResultsDecoded,
    Asserted,
    PostHook,
    CleanedUp,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            RunPhase::Init => "INIT",
            RunPhase::Connected => "CONNECTED",
            RunPhase::PreHook => "PRE_HOOK",
            RunPhase::Submitted => "SUBMITTED",
            RunPhase::IntegrityVerified => "INTEGRITY_VERIFIED",
            RunPhase::SubmitFailed => "SUBMIT_FAILED",
            RunPhase::ResultsDecoded => "RESULTS_DECODED",
            RunPhase::Asserted => "ASSERTED",
            RunPhase::PostHook => "POST_HOOK",
            RunPhase::CleanedUp => "CLEANED_UP",
            RunPhase::Done => "DONE",
        };
        write!(f, "{name}")
    }
}

/// Mutable state of one test invocation. Dropped when the run returns.
pub struct TestRunContext {
    pub test_name: String,
    pub env: Arc<dyn TestEnvironment>,
    pub conn: Option<Arc<dyn CommandExecutor>>,
    /// Raw `(results, errors)` streams; empty when the submission failed
    pub outcome: SubmissionOutcome,
    pub results: Option<DecodedResults>,
    pub errs: Vec<String>,
    pub execution_error: Option<SubmissionError>,
    pub cleanup: Option<CleanupReport>,
    pub failures: Vec<Error>,
    phases: Vec<RunPhase>,
}

impl TestRunContext {
    pub(crate) fn new(
        test_name: String,
        env: Arc<dyn TestEnvironment>,
    ) -> Self {
        Self {
            test_name,
            env,
            conn: None,
            outcome: SubmissionOutcome::empty(),
            results: None,
            errs: Vec::new(),
            execution_error: None,
            cleanup: None,
            failures: Vec::new(),
            phases: vec![RunPhase::Init],
        }
    }

    pub fn phase(&self) -> RunPhase {
        // Created with `Init`, only ever appended to
        self.phases.last().copied().unwrap_or(RunPhase::Init)
    }

    pub fn phases(&self) -> &[RunPhase] {
        &self.phases
    }

    pub(crate) fn advance(
        &mut self,
        next: RunPhase,
    ) {
        debug!("[{}] {} -> {}", self.test_name, self.phase(), next);
        self.phases.push(next);
    }

    /// Records a failure against the test without interrupting the lifecycle
    pub(crate) fn record_failure(
        &mut self,
        e: Error,
    ) {
        error!(
            "{}",
            colors::bred(&format!("[{}] {} failed: {}", self.test_name, self.phase(), e))
        );
        self.failures.push(e);
    }

    pub(crate) fn into_report(self) -> TestReport {
        TestReport {
            test_name: self.test_name,
            phases: self.phases,
            results: self.results,
            errs: self.errs,
            execution_error: self.execution_error,
            cleanup: self.cleanup,
        }
    }
}

/// Summary of a passed test run
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub test_name: String,
    pub phases: Vec<RunPhase>,
    pub results: Option<DecodedResults>,
    pub errs: Vec<String>,
    pub execution_error: Option<SubmissionError>,
    pub cleanup: Option<CleanupReport>,
}
