use aws_config::SdkConfig;
use aws_sdk_ec2::types::Filter;
use tracing::info;

use escale_core::{BoxFuture, ComputeClient};

use crate::error::Result;

#[derive(Clone, Debug)]
pub struct Ec2Client {
    client: aws_sdk_ec2::Client,
}

impl Ec2Client {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(config),
        }
    }

    pub async fn instance_id_by_private_ip(&self, private_ip: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name("private-ip-address")
                    .values(private_ip)
                    .build(),
            )
            .send()
            .await
            .map_err(aws_sdk_ec2::Error::from)?;

        let reservations = resp.reservations.unwrap_or_default();
        Ok(reservations
            .into_iter()
            .flat_map(|r| r.instances.unwrap_or_default())
            .find_map(|i| i.instance_id))
    }

    pub async fn terminate(&self, instance_id: &str) -> Result<()> {
        self.client
            .terminate_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(aws_sdk_ec2::Error::from)?;
        info!(instance_id, "termination requested");
        Ok(())
    }
}

impl ComputeClient for Ec2Client {
    fn resolve_instance_id_by_private_ip<'a>(&'a self, ip: &'a str) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.instance_id_by_private_ip(ip).await?) })
    }

    fn terminate_instance<'a>(&'a self, instance_id: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(async move { Ok(self.terminate(instance_id).await?) })
    }
}
