//! Test-orchestration harness for a clustered data-service module.
//!
//! The harness submits packaged artifacts to the module, waits until the
//! resulting registrations are visible on every shard, hands the decoded
//! results to a test body and finally drains every registration and
//! execution so the next test starts from an empty cluster.
//!
//! The only concurrency primitive is the [`DeadlineGuard`], which bounds the
//! convergence polling loops of the [`ConsistencyPoller`].

mod artifact;
mod cleanup;
mod client;
mod config;
mod constants;
mod deadline;
mod env;
mod errors;
mod fixtures;
mod orchestrator;
mod poller;
mod protocol;
pub mod utils;

pub use artifact::*;
pub use cleanup::*;
pub use client::*;
pub use config::*;
pub use constants::*;
pub use deadline::*;
pub use env::*;
pub use errors::*;
pub use fixtures::*;
pub use orchestrator::*;
pub use poller::*;
pub use protocol::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
