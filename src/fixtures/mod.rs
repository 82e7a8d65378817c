//! Data seeding helpers usable as pre-execution hooks.


use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use crate::Command;
use crate::CommandExecutor;
use crate::Hook;
use crate::HookArgs;
use crate::Result;

/// Value seeded under one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedValue {
    Str(String),
    List(Vec<String>),
    Hash(Vec<(String, String)>),
}

impl From<&str> for SeedValue {
    fn from(s: &str) -> Self {
        SeedValue::Str(s.to_string())
    }
}

/// Writes `data` through the run's connection, in order.
///
/// Strings use `set`, lists a single `lpush` with every element, hashes one
/// `hset` per field.
pub async fn seed_keys(
    conn: &dyn CommandExecutor,
    data: &[(String, SeedValue)],
) -> Result<()> {
    for (key, value) in data {
        match value {
            SeedValue::Str(s) => {
                conn.execute(Command::new("set").arg(key).arg(s)).await?;
            }
            SeedValue::List(items) => {
                conn.execute(Command::new("lpush").arg(key).args(items)).await?;
            }
            SeedValue::Hash(fields) => {
                for (field, val) in fields {
                    conn.execute(Command::new("hset").arg(key).arg(field).arg(val)).await?;
                }
            }
        }
    }
    debug!("seeded {} key(s)", data.len());
    Ok(())
}

/// Pre-execution hook seeding `data` before the artifact runs
pub fn put_keys<K, V>(data: impl IntoIterator<Item = (K, V)>) -> Hook
where
    K: Into<String>,
    V: Into<SeedValue>,
{
    let data: Arc<Vec<(String, SeedValue)>> =
        Arc::new(data.into_iter().map(|(k, v)| (k.into(), v.into())).collect());

    Arc::new(move |args: HookArgs| {
        let data = data.clone();
        async move { seed_keys(args.conn.as_ref(), &data).await }.boxed()
    })
}
