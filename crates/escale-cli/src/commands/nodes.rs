use escale_cluster::EsClient;
use escale_core::ClusterClient;

use crate::options::NodesArgs;

pub async fn nodes(args: NodesArgs) -> anyhow::Result<()> {
    let file = args.connection.load_config()?;
    let endpoint = args.connection.resolve(&file)?;

    let client = EsClient::new(&endpoint.host, endpoint.port)?;
    for node in client.list_nodes().await? {
        println!("{node}");
    }
    Ok(())
}
