// -
// Module command protocol

pub const RG_REFRESHCLUSTER: &str = "RG.REFRESHCLUSTER";
pub const RG_PYEXECUTE: &str = "RG.PYEXECUTE";
pub const RG_JEXECUTE: &str = "RG.JEXECUTE";
pub const RG_DUMPEXECUTIONS: &str = "RG.DUMPEXECUTIONS";
pub const RG_DROPEXECUTION: &str = "RG.DROPEXECUTION";
pub const RG_DUMPREGISTRATIONS: &str = "RG.DUMPREGISTRATIONS";
pub const RG_UNREGISTER: &str = "RG.UNREGISTER";

/// Literal acknowledgement returned by the module on success
pub const OK_REPLY: &str = "OK";

// -
// Convergence queries
//
// Each script runs once per shard through the shard reader and collects the
// per-shard metric back to the coordinator.

pub(crate) const SHARD_REGISTRATION_COUNT_SCRIPT: &str =
    "GB('ShardsIDReader').map(lambda x: len(execute('RG.DUMPREGISTRATIONS'))).collect().run()";

pub(crate) const SHARD_EXECUTION_COUNT_SCRIPT: &str =
    "GB('ShardsIDReader').map(lambda x: len(execute('RG.DUMPEXECUTIONS'))).collect().run()";

// -
// Defaults

pub(crate) const DEFAULT_ARTIFACT_PATH: &str = "../gears_tests/bin/gears_tests.jar";
pub(crate) const DEFAULT_TEST_NAME_PREFIX: &str = "gears_tests";

/// Environment variable prefix for configuration overrides
pub(crate) const CONFIG_ENV_PREFIX: &str = "GEARS_HARNESS";
