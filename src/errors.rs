//! Harness Error Hierarchy
//!
//! Failures are split by the lifecycle phase that produces them. Deadline
//! expiry, cleanup failures and verification failures are recorded against
//! the running test; submission failures are captured as data and handed to
//! the test body.

use std::path::PathBuf;
use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Deadline guard fired before the guarded operation finished
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// The remote execution call itself failed
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Registrations or executions could not be drained
    #[error(transparent)]
    Cleanup(#[from] CleanupError),

    /// Cluster never reached a consistent view after a submission
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Reply did not have the shape the command contract promises
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Execution artifact could not be read
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Configuration source failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Transport-level failure reported by the environment
    #[error("Command {command} failed: {message}")]
    Command { command: String, message: String },

    /// Environment or connection could not be acquired
    #[error("Environment unavailable: {0}")]
    Environment(String),

    /// User hook returned an error
    #[error("{hook} hook failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Aggregate of every failure recorded during one test run
    #[error("Test {test_name} failed with {} error(s): {}", failures.len(), join_failures(failures))]
    TestFailed { test_name: String, failures: Vec<Error> },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} timed out after {after:?}")]
pub struct TimeoutError {
    pub operation: &'static str,
    pub after: Duration,
}

/// Captured failure of the submit-execution call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<&Error> for SubmissionError {
    fn from(e: &Error) -> Self {
        Self::new(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    /// Module answered something other than the `OK` acknowledgement
    #[error("{command} {id} was not acknowledged, got {reply}")]
    NotAcknowledged {
        command: &'static str,
        id: String,
        reply: String,
    },

    /// Residual state survived on at least one shard
    #[error("Registrations/Executions dropping failed: {0}")]
    NotDrained(#[source] TimeoutError),

    /// Enumerating or removing state failed at the transport level
    #[error("Cleanup command failed: {0}")]
    Command(#[source] Box<Error>),
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("Registrations Integrity failed: {0}")]
    RegistrationIntegrity(#[source] TimeoutError),
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unexpected reply to {command}: expected {expected}, got {got}")]
    UnexpectedReply {
        command: &'static str,
        expected: &'static str,
        got: String,
    },

    #[error("Malformed result record: {0}")]
    MalformedRecord(#[from] serde_json::Error),

    #[error("Invalid integer in reply: {0}")]
    InvalidInteger(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not readable at {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact at {} is empty", .0.display())]
    Empty(PathBuf),
}

fn join_failures(failures: &[Error]) -> String {
    failures
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
