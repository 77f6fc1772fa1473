//! escale-orchestrator — add and remove search-cluster nodes safely.
//!
//! Coordinates two control planes that know nothing of each other: the
//! cloud scaling group that owns the instances, and the cluster's shard
//! allocation controls. Each orchestrator runs a fixed, strictly
//! sequential step list and returns one terminal outcome.
//!
//! # Add
//!
//! ```text
//! describe group ── requested <= current? ──> InvalidCapacity (nothing mutated)
//!   └─> DisableAllocation ─> GrowScalingGroup ─> WaitForJoin ─> EnableAllocation
//! ```
//!
//! # Remove
//!
//! ```text
//! Enumerate ─> Select ─> ResolveInstance ─> DrainShards ─> DetachInstance
//!   ─> TerminateInstance ─> ClearExclusions
//! ```
//!
//! Any failure stops the run at that step. Steps before `TerminateInstance`
//! never destroy capacity. With compensation enabled, a failure after
//! allocation was disabled (add) or after the drain was requested (remove,
//! up to and including detach) triggers one best-effort restoring call.
//!
//! Both wait phases go through [`poller::poll_until`], which honours a
//! [`CancelSignal`] between attempts.

pub mod add;
pub mod cancel;
pub mod error;
pub mod poller;
pub mod remove;
pub mod selector;

pub use add::{AddNodes, AddOptions, AddOutcome};
pub use cancel::{CancelHandle, CancelSignal};
pub use error::{ScaleError, ScaleResult, Step};
pub use poller::{PollError, poll_until};
pub use remove::{RemovalTarget, RemoveNodes, RemoveOptions};
pub use selector::{SelectionError, data_nodes, select_target};
