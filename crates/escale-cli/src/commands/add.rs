use std::sync::Arc;

use tracing::info;

use escale_cloud::AutoScalingClient;
use escale_cluster::EsClient;
use escale_orchestrator::{AddNodes, CancelSignal};

use crate::options::AddArgs;

pub async fn add(args: AddArgs, cancel: CancelSignal) -> anyhow::Result<()> {
    let file = args.connection.load_config()?;
    let resolved = args.resolve(&file)?;

    let cluster = Arc::new(EsClient::new(&resolved.endpoint.host, resolved.endpoint.port)?);
    let sdk_config = escale_cloud::load_sdk_config(
        resolved.aws.region.as_deref(),
        resolved.aws.profile.as_deref(),
    )
    .await;
    let scaling = Arc::new(AutoScalingClient::new(&sdk_config));

    let outcome = AddNodes::new(cluster, scaling, resolved.options)
        .with_cancel(cancel)
        .run()
        .await?;

    info!(
        from = outcome.previous_capacity,
        to = outcome.capacity,
        attempts = outcome.join_attempts,
        "finished"
    );
    Ok(())
}
