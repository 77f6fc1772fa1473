//! Removal target selection.

use rand::Rng;
use thiserror::Error;

use escale_core::Node;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no data nodes in the cluster")]
    EmptyNodeSet,

    #[error("data node not found: {0}")]
    NodeNotFound(String),
}

/// Keep only the nodes that can hold shards.
pub fn data_nodes(nodes: Vec<Node>) -> Vec<Node> {
    nodes.into_iter().filter(Node::is_data).collect()
}

/// Pick one node from `nodes`.
///
/// With a non-empty `name`, the node with exactly that name; otherwise a
/// uniformly random member drawn from `rng`.
pub fn select_target<'a, R>(
    nodes: &'a [Node],
    name: Option<&str>,
    rng: &mut R,
) -> Result<&'a Node, SelectionError>
where
    R: Rng + ?Sized,
{
    if nodes.is_empty() {
        return Err(SelectionError::EmptyNodeSet);
    }

    match name.filter(|n| !n.is_empty()) {
        Some(name) => nodes
            .iter()
            .find(|node| node.name == name)
            .ok_or_else(|| SelectionError::NodeNotFound(name.to_string())),
        None => Ok(&nodes[rng.gen_range(0..nodes.len())]),
    }
}
