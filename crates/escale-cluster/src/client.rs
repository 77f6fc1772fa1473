//! Elasticsearch implementation of [`ClusterClient`].

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use escale_core::{BoxFuture, ClusterClient, Node, NodeRole, Shard};

use crate::transport::HttpTransport;

const SETTINGS_PATH: &str = "/_cluster/settings";
const NODES_PATH: &str = "/_cat/nodes?format=json&h=name,ip,node.role,master";
const SHARDS_PATH: &str = "/_cat/shards?format=json&h=index,shard,prirep,state,node";

const ALLOCATION_ENABLE: &str = "cluster.routing.allocation.enable";
const EXCLUDE_NAME: &str = "cluster.routing.allocation.exclude._name";

/// Row of `_cat/nodes?format=json`.
#[derive(Debug, Deserialize)]
struct CatNode {
    name: String,
    ip: String,
    #[serde(rename = "node.role")]
    role: String,
    master: String,
}

/// Row of `_cat/shards?format=json`.
#[derive(Debug, Deserialize)]
struct CatShard {
    index: String,
    shard: String,
    prirep: String,
    state: String,
    node: Option<String>,
}

/// Client for a single Elasticsearch endpoint.
#[derive(Debug, Clone)]
pub struct EsClient {
    http: HttpTransport,
}

impl EsClient {
    pub fn new(host: &str, port: u16) -> anyhow::Result<Self> {
        Ok(Self {
            http: HttpTransport::new(host, port)?,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    async fn fetch_nodes(&self) -> anyhow::Result<Vec<Node>> {
        let body = self.http.get(NODES_PATH).await?;
        parse_cat_nodes(&body)
    }

    async fn put_transient(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let body = transient_setting(key, value);
        self.http.put(SETTINGS_PATH, &body).await?;
        Ok(())
    }

    async fn current_exclusions(&self) -> anyhow::Result<Option<String>> {
        let body = self
            .http
            .get(&format!("{SETTINGS_PATH}?flat_settings=true"))
            .await?;
        let settings: Value =
            serde_json::from_slice(&body).context("failed to decode cluster settings")?;
        Ok(settings
            .get("transient")
            .and_then(|t| t.get(EXCLUDE_NAME))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn exclude(&self, node_name: &str) -> anyhow::Result<()> {
        let existing = self.current_exclusions().await?;
        let merged = merge_exclusions(existing.as_deref(), node_name);
        info!(node = %node_name, exclusions = %merged, "excluding node from shard allocation");
        self.put_transient(EXCLUDE_NAME, &merged).await
    }

    async fn fetch_shards(&self, node_names: &[String]) -> anyhow::Result<Vec<Shard>> {
        let body = self.http.get(SHARDS_PATH).await?;
        let shards = parse_cat_shards(&body)?;
        Ok(shards_on_nodes(shards, node_names))
    }
}

impl ClusterClient for EsClient {
    fn list_nodes(&self) -> BoxFuture<'_, Vec<Node>> {
        Box::pin(self.fetch_nodes())
    }

    fn set_allocation(&self, enabled: bool) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let value = if enabled { "all" } else { "none" };
            debug!(value, "setting cluster allocation");
            self.put_transient(ALLOCATION_ENABLE, value).await
        })
    }

    fn drain<'a>(&'a self, node_name: &'a str) -> BoxFuture<'a, ()> {
        Box::pin(self.exclude(node_name))
    }

    fn clear_exclusions(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.put_transient(EXCLUDE_NAME, ""))
    }

    fn shards_on<'a>(&'a self, node_names: &'a [String]) -> BoxFuture<'a, Vec<Shard>> {
        Box::pin(self.fetch_shards(node_names))
    }
}

fn transient_setting(key: &str, value: &str) -> Value {
    json!({ "transient": { key: value } })
}

fn parse_cat_nodes(body: &[u8]) -> anyhow::Result<Vec<Node>> {
    let rows: Vec<CatNode> =
        serde_json::from_slice(body).context("failed to decode _cat/nodes response")?;
    Ok(rows
        .into_iter()
        .map(|row| Node {
            role: NodeRole::from_role_letters(&row.role),
            master: row.master == "*",
            name: row.name,
            ip: row.ip,
            role_letters: row.role,
        })
        .collect())
}

fn parse_cat_shards(body: &[u8]) -> anyhow::Result<Vec<Shard>> {
    let rows: Vec<CatShard> =
        serde_json::from_slice(body).context("failed to decode _cat/shards response")?;
    Ok(rows
        .into_iter()
        .map(|row| Shard {
            index: row.index,
            shard: row.shard,
            prirep: row.prirep,
            state: row.state,
            node: row.node,
        })
        .collect())
}

/// Keep shards whose current node is one of `node_names`.
///
/// A relocating shard reports its node as `"<source> -> <ip> <id> <target>"`;
/// it still counts against the source until the move completes.
fn shards_on_nodes(shards: Vec<Shard>, node_names: &[String]) -> Vec<Shard> {
    shards
        .into_iter()
        .filter(|shard| {
            shard
                .node
                .as_deref()
                .and_then(|n| n.split_whitespace().next())
                .is_some_and(|current| node_names.iter().any(|name| name == current))
        })
        .collect()
}

/// Append `node_name` to a comma-separated exclusion list, without duplicates.
fn merge_exclusions(existing: Option<&str>, node_name: &str) -> String {
    let mut names: Vec<&str> = existing
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    if !names.contains(&node_name) {
        names.push(node_name);
    }
    names.join(",")
}
