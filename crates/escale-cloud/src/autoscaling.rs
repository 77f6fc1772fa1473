use aws_config::SdkConfig;
use tracing::{debug, info};

use escale_core::{BoxFuture, ScalingGroup, ScalingGroupClient};

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct AutoScalingClient {
    client: aws_sdk_autoscaling::Client,
}

impl AutoScalingClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_autoscaling::Client::new(config),
        }
    }

    pub async fn describe_group(&self, group: &str) -> Result<ScalingGroup> {
        let resp = self
            .client
            .describe_auto_scaling_groups()
            .auto_scaling_group_names(group)
            .send()
            .await
            .map_err(aws_sdk_autoscaling::Error::from)?;

        let found = resp
            .auto_scaling_groups
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::GroupNotFound(group.to_string()))?;

        let capacity = |value: Option<i32>, what: &'static str| -> Result<u32> {
            value
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| Error::MissingDetails(group.to_string(), what))
        };

        let described = ScalingGroup {
            name: group.to_string(),
            desired_capacity: capacity(found.desired_capacity, "desired capacity")?,
            min_size: capacity(found.min_size, "min size")?,
            max_size: capacity(found.max_size, "max size")?,
        };
        debug!(
            group,
            desired = described.desired_capacity,
            min = described.min_size,
            max = described.max_size,
            "described auto scaling group"
        );
        Ok(described)
    }

    pub async fn set_capacity(&self, group: &str, capacity: u32) -> Result<()> {
        let desired = i32::try_from(capacity).map_err(|_| Error::CapacityOutOfRange(capacity))?;
        self.client
            .set_desired_capacity()
            .auto_scaling_group_name(group)
            .desired_capacity(desired)
            .honor_cooldown(false)
            .send()
            .await
            .map_err(aws_sdk_autoscaling::Error::from)?;
        info!(group, capacity, "set desired capacity");
        Ok(())
    }

    pub async fn detach(&self, group: &str, instance_id: &str, decrement_desired: bool) -> Result<()> {
        self.client
            .detach_instances()
            .auto_scaling_group_name(group)
            .instance_ids(instance_id)
            .should_decrement_desired_capacity(decrement_desired)
            .send()
            .await
            .map_err(aws_sdk_autoscaling::Error::from)?;
        info!(group, instance_id, decrement_desired, "detached instance");
        Ok(())
    }
}

impl ScalingGroupClient for AutoScalingClient {
    fn describe<'a>(&'a self, group: &'a str) -> BoxFuture<'a, ScalingGroup> {
        Box::pin(async move { Ok(self.describe_group(group).await?) })
    }

    fn set_desired_capacity<'a>(&'a self, group: &'a str, capacity: u32) -> BoxFuture<'a, ()> {
        Box::pin(async move { Ok(self.set_capacity(group, capacity).await?) })
    }

    fn detach_instance<'a>(
        &'a self,
        group: &'a str,
        instance_id: &'a str,
        decrement_desired: bool,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move { Ok(self.detach(group, instance_id, decrement_desired).await?) })
    }
}
