//! escale-cluster — Elasticsearch shard-placement controls.
//!
//! Implements [`escale_core::ClusterClient`] over plain HTTP/1.1 using
//! the `_cat` and `_cluster/settings` APIs.
//!
//! # Requests
//!
//! ```text
//! list_nodes        GET /_cat/nodes?format=json&h=name,ip,node.role,master
//! shards_on         GET /_cat/shards?format=json&h=index,shard,prirep,state,node
//! set_allocation    PUT /_cluster/settings  cluster.routing.allocation.enable = all | none
//! drain             PUT /_cluster/settings  cluster.routing.allocation.exclude._name += node
//! clear_exclusions  PUT /_cluster/settings  cluster.routing.allocation.exclude._name = ""
//! ```
//!
//! All settings are written as `transient`.

pub mod client;
pub mod transport;

#[cfg(test)]
mod test_server;

pub use client::EsClient;
pub use transport::HttpTransport;
