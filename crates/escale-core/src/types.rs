//! Shared types used across escale crates.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Role letters Elasticsearch reports for roles that hold shards
/// (`d` data, `h` hot, `w` warm, `c` cold, `f` frozen, `s` content).
const DATA_ROLE_LETTERS: &[char] = &['d', 'h', 'w', 'c', 'f', 's'];

/// Whether a node can hold shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// Eligible to hold shards; a candidate for removal.
    Data,
    /// Master-eligible, ingest or coordinating-only node. Never holds shards.
    CoordinatorOnly,
}

impl NodeRole {
    /// Classify a `_cat/nodes` `node.role` string such as `"mdi"` or `"m"`.
    pub fn from_role_letters(letters: &str) -> Self {
        if letters.chars().any(|c| DATA_ROLE_LETTERS.contains(&c)) {
            NodeRole::Data
        } else {
            NodeRole::CoordinatorOnly
        }
    }
}

/// A cluster member as reported by the cluster at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub ip: String,
    pub role: NodeRole,
    /// Raw role letters, kept for display.
    pub role_letters: String,
    /// True for the elected master.
    pub master: bool,
}

impl Node {
    pub fn is_data(&self) -> bool {
        self.role == NodeRole::Data
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name={} ip={} role={} master={}",
            self.name,
            self.ip,
            self.role_letters,
            if self.master { "*" } else { "-" }
        )
    }
}

/// A single shard copy and the node it currently lives on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    pub index: String,
    pub shard: String,
    /// `p` for primary, `r` for replica.
    pub prirep: String,
    pub state: String,
    /// Unassigned shards have no node.
    pub node: Option<String>,
}

/// Snapshot of a cloud scaling group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalingGroup {
    pub name: String,
    pub desired_capacity: u32,
    pub min_size: u32,
    pub max_size: u32,
}

/// Fixed-interval, bounded-attempt retry policy for wait phases.
///
/// `interval * (max_attempts - 1)` is the longest a wait can sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Default policy for waiting on new nodes to join the cluster.
    pub const JOIN: RetryPolicy = RetryPolicy {
        interval: Duration::from_secs(5),
        max_attempts: 100,
    };

    /// Default policy for waiting on shards to drain off a node (~25 min).
    pub const DRAIN: RetryPolicy = RetryPolicy {
        interval: Duration::from_secs(5),
        max_attempts: 300,
    };

    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Wall-clock ceiling on time spent sleeping between attempts.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn ceiling(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts.saturating_sub(1))
            .unwrap_or(Duration::MAX)
    }
}
