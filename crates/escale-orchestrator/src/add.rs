//! Add-nodes orchestrator.
//!
//! Grows the scaling group to an absolute node count while shard
//! allocation is disabled, so new empty nodes do not trigger rebalancing
//! against a half-formed node set.

use std::sync::Arc;

use tracing::{info, warn};

use escale_core::{ClusterClient, RetryPolicy, ScalingGroupClient};

use crate::cancel::CancelSignal;
use crate::error::{ScaleError, ScaleResult, Step};
use crate::poller::poll_until;

/// Resolved, validated options for one add run.
#[derive(Debug, Clone)]
pub struct AddOptions {
    pub group: String,
    /// Absolute node count to reach.
    pub desired: u32,
    pub join_policy: RetryPolicy,
    /// Re-enable allocation if the run fails after disabling it.
    pub compensate: bool,
}

impl AddOptions {
    pub fn new(group: impl Into<String>, desired: u32) -> Self {
        Self {
            group: group.into(),
            desired,
            join_policy: RetryPolicy::JOIN,
            compensate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub previous_capacity: u32,
    pub capacity: u32,
    /// Poll attempts until every node had joined.
    pub join_attempts: u32,
}

pub struct AddNodes {
    cluster: Arc<dyn ClusterClient>,
    scaling: Arc<dyn ScalingGroupClient>,
    options: AddOptions,
    cancel: CancelSignal,
}

impl AddNodes {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        scaling: Arc<dyn ScalingGroupClient>,
        options: AddOptions,
    ) -> Self {
        Self {
            cluster,
            scaling,
            options,
            cancel: CancelSignal::never(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the add sequence to completion or the first failure.
    pub async fn run(mut self) -> ScaleResult<AddOutcome> {
        let group_name = self.options.group.clone();
        let desired = self.options.desired;

        // Capacity guard runs before anything is mutated.
        self.checkpoint(Step::GrowScalingGroup)?;
        let group = self
            .scaling
            .describe(&group_name)
            .await
            .map_err(ScaleError::remote(Step::GrowScalingGroup))?;
        if desired <= group.desired_capacity {
            return Err(ScaleError::InvalidCapacity {
                step: Step::GrowScalingGroup,
                requested: desired,
                current: group.desired_capacity,
            });
        }
        if desired > group.max_size {
            warn!(
                group = %group_name,
                desired,
                max = group.max_size,
                "requested capacity exceeds the group's max size"
            );
        }

        info!("disabling shard allocation for the cluster");
        self.checkpoint(Step::DisableAllocation)?;
        self.cluster
            .set_allocation(false)
            .await
            .map_err(ScaleError::remote(Step::DisableAllocation))?;

        let joined = self.grow_and_wait(&group_name, desired).await;
        let join_attempts = match joined {
            Ok(attempts) => attempts,
            Err(err) => {
                if self.options.compensate {
                    self.restore_allocation(&err).await;
                }
                return Err(err);
            }
        };

        info!("enabling shard allocation for the cluster");
        self.cluster
            .set_allocation(true)
            .await
            .map_err(ScaleError::remote(Step::EnableAllocation))?;

        info!(
            group = %group_name,
            from = group.desired_capacity,
            to = desired,
            "add finished"
        );
        Ok(AddOutcome {
            previous_capacity: group.desired_capacity,
            capacity: desired,
            join_attempts,
        })
    }

    async fn grow_and_wait(&mut self, group: &str, desired: u32) -> ScaleResult<u32> {
        self.checkpoint(Step::GrowScalingGroup)?;
        self.scaling
            .set_desired_capacity(group, desired)
            .await
            .map_err(ScaleError::remote(Step::GrowScalingGroup))?;
        info!(group, desired, "scaling group capacity raised");

        info!(
            target = desired,
            ceiling = ?self.options.join_policy.ceiling(),
            "waiting for nodes to join the cluster"
        );
        let cluster = self.cluster.as_ref();
        let target = desired as usize;
        poll_until(self.options.join_policy, &mut self.cancel, move || async move {
            let nodes = cluster.list_nodes().await?;
            info!(joined = nodes.len(), target, "cluster node count");
            Ok(nodes.len() == target)
        })
        .await
        .map_err(|e| ScaleError::from_poll(Step::WaitForJoin, e))
    }

    async fn restore_allocation(&self, cause: &ScaleError) {
        warn!(step = %cause.step(), "add failed, re-enabling shard allocation");
        if let Err(e) = self.cluster.set_allocation(true).await {
            warn!(error = %e, "could not re-enable shard allocation; it is still disabled");
        }
    }

    fn checkpoint(&self, step: Step) -> ScaleResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ScaleError::Cancelled { step });
        }
        Ok(())
    }
}
