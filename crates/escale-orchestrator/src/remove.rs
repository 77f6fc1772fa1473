//! Remove-nodes orchestrator.
//!
//! Drains one data node, takes its instance out of the scaling group
//! without a replacement, terminates it, and finally clears the
//! allocation exclusions.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use escale_core::{ClusterClient, ComputeClient, Node, RetryPolicy, ScalingGroupClient};

use crate::cancel::CancelSignal;
use crate::error::{ScaleError, ScaleResult, Step};
use crate::poller::poll_until;
use crate::selector::{data_nodes, select_target};

/// Resolved, validated options for one remove run.
#[derive(Debug, Clone)]
pub struct RemoveOptions {
    pub group: String,
    /// Node to remove; a random data node when `None`.
    pub target_name: Option<String>,
    pub drain_policy: RetryPolicy,
    /// Clear exclusions if the run fails between draining and detaching.
    pub compensate: bool,
}

impl RemoveOptions {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            target_name: None,
            drain_policy: RetryPolicy::DRAIN,
            compensate: true,
        }
    }
}

/// The node being removed and the instance behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTarget {
    pub node: Node,
    pub instance_id: String,
}

pub struct RemoveNodes {
    cluster: Arc<dyn ClusterClient>,
    scaling: Arc<dyn ScalingGroupClient>,
    compute: Arc<dyn ComputeClient>,
    options: RemoveOptions,
    cancel: CancelSignal,
    rng: StdRng,
}

impl RemoveNodes {
    /// Create a remove run whose random source is seeded from the clock.
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        scaling: Arc<dyn ScalingGroupClient>,
        compute: Arc<dyn ComputeClient>,
        options: RemoveOptions,
    ) -> Self {
        Self {
            cluster,
            scaling,
            compute,
            options,
            cancel: CancelSignal::never(),
            rng: StdRng::seed_from_u64(clock_seed()),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Run the remove sequence to completion or the first failure.
    pub async fn run(mut self) -> ScaleResult<RemovalTarget> {
        info!("listing data nodes");
        self.checkpoint(Step::Enumerate)?;
        let nodes = self
            .cluster
            .list_nodes()
            .await
            .map_err(ScaleError::remote(Step::Enumerate))?;
        let data = data_nodes(nodes);
        for node in &data {
            info!(%node, "data node");
        }

        let node = select_target(&data, self.options.target_name.as_deref(), &mut self.rng)
            .map_err(|source| ScaleError::Selection {
                step: Step::Select,
                source,
            })?
            .clone();
        info!(%node, "selected node for removal");

        self.checkpoint(Step::ResolveInstance)?;
        let instance_id = self
            .compute
            .resolve_instance_id_by_private_ip(&node.ip)
            .await
            .map_err(ScaleError::remote(Step::ResolveInstance))?
            .ok_or_else(|| ScaleError::InstanceNotFound {
                step: Step::ResolveInstance,
                ip: node.ip.clone(),
            })?;
        info!(instance_id = %instance_id, "resolved instance for removal");
        let target = RemovalTarget { node, instance_id };

        self.checkpoint(Step::DrainShards)?;
        info!(node = %target.node.name, "draining shards from node");
        self.cluster
            .drain(&target.node.name)
            .await
            .map_err(ScaleError::remote(Step::DrainShards))?;

        // From here until the instance is detached, exclusions are ours to undo.
        if let Err(err) = self.wait_and_detach(&target).await {
            if self.options.compensate {
                self.restore_exclusions(&err).await;
            }
            return Err(err);
        }

        info!(instance_id = %target.instance_id, "terminating instance");
        self.compute
            .terminate_instance(&target.instance_id)
            .await
            .map_err(ScaleError::remote(Step::TerminateInstance))?;

        info!("removing all shard allocation exclusion rules");
        self.cluster
            .clear_exclusions()
            .await
            .map_err(ScaleError::remote(Step::ClearExclusions))?;

        info!(node = %target.node.name, instance_id = %target.instance_id, "remove finished");
        Ok(target)
    }

    async fn wait_and_detach(&mut self, target: &RemovalTarget) -> ScaleResult<()> {
        info!(
            ceiling = ?self.options.drain_policy.ceiling(),
            "waiting for shards to drain from node"
        );
        let cluster = self.cluster.as_ref();
        let names = [target.node.name.clone()];
        let names = names.as_slice();
        let attempts = poll_until(self.options.drain_policy, &mut self.cancel, move || async move {
            let shards = cluster.shards_on(names).await?;
            debug!(remaining = shards.len(), "shards on draining node");
            Ok(shards.is_empty())
        })
        .await
        .map_err(|e| ScaleError::from_poll(Step::DrainShards, e))?;
        info!(attempts, "node drained");

        self.checkpoint(Step::DetachInstance)?;
        info!(
            group = %self.options.group,
            instance_id = %target.instance_id,
            "detaching instance from scaling group"
        );
        self.scaling
            .detach_instance(&self.options.group, &target.instance_id, true)
            .await
            .map_err(ScaleError::remote(Step::DetachInstance))
    }

    async fn restore_exclusions(&self, cause: &ScaleError) {
        warn!(step = %cause.step(), "remove failed, clearing shard allocation exclusions");
        if let Err(e) = self.cluster.clear_exclusions().await {
            warn!(error = %e, "could not clear exclusions; the node stays excluded");
        }
    }

    fn checkpoint(&self, step: Step) -> ScaleResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ScaleError::Cancelled { step });
        }
        Ok(())
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
