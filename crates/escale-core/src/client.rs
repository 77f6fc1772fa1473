//! Collaborator traits driven by the scale orchestrators.
//!
//! Each method wraps a single remote call. Implementations live in
//! `escale-cluster` (Elasticsearch) and `escale-cloud` (AWS); tests
//! substitute recording fakes.

use std::future::Future;
use std::pin::Pin;

use crate::types::{Node, ScalingGroup, Shard};

/// Boxed future alias for collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Shard-placement controls of the search cluster.
pub trait ClusterClient: Send + Sync {
    /// All nodes currently in the cluster.
    fn list_nodes(&self) -> BoxFuture<'_, Vec<Node>>;

    /// Enable or disable cluster-wide shard allocation.
    fn set_allocation(&self, enabled: bool) -> BoxFuture<'_, ()>;

    /// Exclude a node from shard allocation so its shards relocate.
    fn drain<'a>(&'a self, node_name: &'a str) -> BoxFuture<'a, ()>;

    /// Remove every shard-allocation exclusion rule.
    fn clear_exclusions(&self) -> BoxFuture<'_, ()>;

    /// Shards currently placed on any of the named nodes.
    fn shards_on<'a>(&'a self, node_names: &'a [String]) -> BoxFuture<'a, Vec<Shard>>;
}

/// The cloud scaling group that owns the cluster's instances.
pub trait ScalingGroupClient: Send + Sync {
    fn describe<'a>(&'a self, group: &'a str) -> BoxFuture<'a, ScalingGroup>;

    fn set_desired_capacity<'a>(&'a self, group: &'a str, capacity: u32) -> BoxFuture<'a, ()>;

    /// Detach an instance, optionally decrementing desired capacity so the
    /// group does not launch a replacement.
    fn detach_instance<'a>(
        &'a self,
        group: &'a str,
        instance_id: &'a str,
        decrement_desired: bool,
    ) -> BoxFuture<'a, ()>;
}

/// Compute-instance lookups and lifecycle.
pub trait ComputeClient: Send + Sync {
    /// Instance id owning `ip`, or `None` when no instance matches.
    fn resolve_instance_id_by_private_ip<'a>(&'a self, ip: &'a str) -> BoxFuture<'a, Option<String>>;

    fn terminate_instance<'a>(&'a self, instance_id: &'a str) -> BoxFuture<'a, ()>;
}
