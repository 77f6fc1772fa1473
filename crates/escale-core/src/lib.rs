//! escale-core — shared model for the escale node scaler.
//!
//! Holds the node/shard/scaling-group types passed between crates, the
//! collaborator traits the orchestrator drives (cluster, scaling group,
//! compute), and the optional `.escale.toml` configuration file.

pub mod client;
pub mod config;
pub mod types;

pub use client::{BoxFuture, ClusterClient, ComputeClient, ScalingGroupClient};
pub use config::{ConfigError, EscaleConfig, parse_duration};
pub use types::*;
