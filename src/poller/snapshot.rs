use std::collections::BTreeSet;

use crate::ProtocolError;
use crate::Reply;
use crate::RG_PYEXECUTE;
use crate::SHARD_EXECUTION_COUNT_SCRIPT;
use crate::SHARD_REGISTRATION_COUNT_SCRIPT;

/// Per-shard quantity the poller can observe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardMetric {
    Registrations,
    Executions,
}

impl ShardMetric {
    pub(crate) fn script(&self) -> &'static str {
        match self {
            ShardMetric::Registrations => SHARD_REGISTRATION_COUNT_SCRIPT,
            ShardMetric::Executions => SHARD_EXECUTION_COUNT_SCRIPT,
        }
    }
}

/// Values of one metric collected from every shard during a single poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardConsensusSnapshot {
    metric: ShardMetric,
    values: Vec<i64>,
    shard_errors: Vec<String>,
    expected_shards: Option<usize>,
}

impl ShardConsensusSnapshot {
    pub fn new(
        metric: ShardMetric,
        values: Vec<i64>,
    ) -> Self {
        Self {
            metric,
            values,
            shard_errors: Vec::new(),
            expected_shards: None,
        }
    }

    /// Requires one value from each of `shards` shards before the snapshot
    /// can count as converged.
    pub fn expecting(
        mut self,
        shards: usize,
    ) -> Self {
        self.expected_shards = Some(shards);
        self
    }

    /// Parses the `(results, errors)` pair returned by a collect query
    pub fn from_reply(
        metric: ShardMetric,
        reply: Reply,
    ) -> std::result::Result<Self, ProtocolError> {
        let got = reply.to_string();
        let mut parts = reply.into_array(RG_PYEXECUTE)?.into_iter();
        let (Some(results), errors) = (parts.next(), parts.next()) else {
            return Err(ProtocolError::UnexpectedReply {
                command: RG_PYEXECUTE,
                expected: "(results, errors) pair",
                got,
            });
        };

        let values = results
            .into_array(RG_PYEXECUTE)?
            .iter()
            .map(Reply::as_i64)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let shard_errors = match errors {
            Some(errors) => errors
                .into_array(RG_PYEXECUTE)?
                .into_iter()
                .map(|e| e.to_string())
                .collect(),
            None => Vec::new(),
        };

        Ok(Self {
            metric,
            values,
            shard_errors,
            expected_shards: None,
        })
    }

    pub fn metric(&self) -> ShardMetric {
        self.metric
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn shard_errors(&self) -> &[String] {
        &self.shard_errors
    }

    /// Number of distinct values reported across shards
    pub fn distinct_count(&self) -> usize {
        self.values.iter().collect::<BTreeSet<_>>().len()
    }

    /// A shard that did not answer leaves the snapshot incomplete
    pub fn is_complete(&self) -> bool {
        self.expected_shards.map_or(true, |n| self.values.len() == n)
    }

    /// The common value when every shard agrees and none failed
    pub fn uniform_value(&self) -> Option<i64> {
        if !self.shard_errors.is_empty() || !self.is_complete() || self.distinct_count() != 1 {
            return None;
        }
        self.values.first().copied()
    }

    /// Every shard reports the same count; a uniform zero only counts when
    /// `allow_empty` is set.
    pub fn has_registration_consensus(
        &self,
        allow_empty: bool,
    ) -> bool {
        match self.uniform_value() {
            Some(0) => allow_empty,
            Some(_) => true,
            None => false,
        }
    }

    /// Every shard reports zero
    pub fn is_drained(&self) -> bool {
        self.uniform_value() == Some(0)
    }
}
