//! Whole-lifecycle runs against a sharded module whose followers lag
//! behind the coordinator.

use std::sync::Arc;

use gears_harness::CleanupReport;
use gears_harness::DecodedResults;
use gears_harness::DeploymentMode;
use gears_harness::Error;
use gears_harness::HarnessConfig;
use gears_harness::RunPhase;
use gears_harness::TestArgs;
use gears_harness::TestRun;
use gears_harness::VerificationError;
use serde_json::json;
use tempfile::TempDir;

use crate::common::ShardedModule;
use crate::common::ShardedModuleFactory;
use crate::enable_logger;

struct Harness {
    module: ShardedModule,
    run: TestRun,
    _dir: TempDir,
}

fn harness(
    shards: usize,
    lag: usize,
) -> Harness {
    enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("gears_tests.jar");
    std::fs::write(&artifact, b"PK\x03\x04integration").unwrap();

    let mut config = HarnessConfig::default();
    config.run.artifact_path = artifact;
    config.run.mode = DeploymentMode::OssCluster;

    let module = ShardedModule::new(shards, lag);
    let factory = Arc::new(ShardedModuleFactory { module: module.clone() });

    Harness {
        module,
        run: TestRun::new(factory, config),
        _dir: dir,
    }
}

#[tokio::test(start_paused = true)]
async fn test_lagging_followers_converge_and_cluster_is_left_empty() {
    let h = harness(3, 2);

    let report = h
        .run
        .run("testBasic", |args: TestArgs| async move {
            assert_eq!(args.results, DecodedResults::Ok);
            assert!(args.execution_error.is_none());
        })
        .await
        .unwrap();

    assert_eq!(h.module.submissions(), vec!["gears_tests.testBasic".to_string()]);
    assert!(report.phases.contains(&RunPhase::IntegrityVerified));
    assert_eq!(
        report.cleanup,
        Some(CleanupReport {
            dropped_executions: 1,
            unregistered: 1,
        })
    );
    assert_eq!(h.module.per_shard_registrations(), vec![0, 0, 0]);
    assert_eq!(h.module.execution_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_records_and_errors_reach_the_body() {
    let h = harness(3, 1);

    let report = h
        .run
        .run("testReturnsRecords", |args: TestArgs| async move {
            assert_eq!(args.results.records(), &[json!({"n": 1}), json!({"n": 2})]);
            assert_eq!(args.errs, vec!["e1".to_string()]);
        })
        .await
        .unwrap();

    assert_eq!(report.errs, vec!["e1".to_string()]);
    assert_eq!(h.module.per_shard_registrations(), vec![0, 0, 0]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_submission_is_observable_by_the_body() {
    let h = harness(3, 2);

    let report = h
        .run
        .run("testExpectedFailure", |args: TestArgs| async move {
            let err = args.execution_error.expect("submission should fail");
            assert!(err.message.contains("artifact raised an exception"));
            assert!(args.results.records().is_empty());
        })
        .await
        .unwrap();

    assert!(report.phases.contains(&RunPhase::SubmitFailed));
    assert_eq!(report.cleanup, Some(CleanupReport::default()));
}

/// Followers that take longer than the integrity deadline fail the run, yet
/// cleanup still waits them out and leaves every shard empty.
#[tokio::test(start_paused = true)]
async fn test_slow_followers_fail_integrity_but_are_drained() {
    let h = harness(3, 15);

    let result = h.run.run("testSlowCluster", |_args: TestArgs| async {}).await;

    match result {
        Err(Error::TestFailed { test_name, failures }) => {
            assert_eq!(test_name, "gears_tests.testSlowCluster");
            assert_eq!(failures.len(), 1);
            assert!(matches!(
                failures[0],
                Error::Verification(VerificationError::RegistrationIntegrity(_))
            ));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(h.module.per_shard_registrations(), vec![0, 0, 0]);
    assert_eq!(h.module.execution_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_runs_start_from_an_empty_cluster() {
    let h = harness(3, 1);

    for name in ["testFirst", "testSecond"] {
        h.run.run(name, |_args: TestArgs| async {}).await.unwrap();
        assert_eq!(h.module.per_shard_registrations(), vec![0, 0, 0]);
    }
    assert_eq!(h.module.submissions().len(), 2);
}
