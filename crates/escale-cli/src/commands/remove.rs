use std::sync::Arc;

use tracing::info;

use escale_cloud::{AutoScalingClient, Ec2Client};
use escale_cluster::EsClient;
use escale_orchestrator::{CancelSignal, RemoveNodes};

use crate::options::RemoveArgs;

pub async fn remove(args: RemoveArgs, cancel: CancelSignal) -> anyhow::Result<()> {
    let file = args.connection.load_config()?;
    let resolved = args.resolve(&file)?;

    let cluster = Arc::new(EsClient::new(&resolved.endpoint.host, resolved.endpoint.port)?);
    let sdk_config = escale_cloud::load_sdk_config(
        resolved.aws.region.as_deref(),
        resolved.aws.profile.as_deref(),
    )
    .await;
    let scaling = Arc::new(AutoScalingClient::new(&sdk_config));
    let compute = Arc::new(Ec2Client::new(&sdk_config));

    let removed = RemoveNodes::new(cluster, scaling, compute, resolved.options)
        .with_cancel(cancel)
        .run()
        .await?;

    info!(
        node = %removed.node.name,
        instance_id = %removed.instance_id,
        "finished"
    );
    Ok(())
}
