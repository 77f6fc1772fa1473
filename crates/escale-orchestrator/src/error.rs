//! Orchestrator error types.
//!
//! Every error names the [`Step`] it stopped at. Remote state reflects
//! all steps before it.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::poller::PollError;
use crate::selector::SelectionError;

/// A step of the add or remove sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    DisableAllocation,
    GrowScalingGroup,
    WaitForJoin,
    EnableAllocation,
    Enumerate,
    Select,
    ResolveInstance,
    DrainShards,
    DetachInstance,
    TerminateInstance,
    ClearExclusions,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::DisableAllocation => "disable-allocation",
            Step::GrowScalingGroup => "grow-scaling-group",
            Step::WaitForJoin => "wait-for-join",
            Step::EnableAllocation => "enable-allocation",
            Step::Enumerate => "enumerate",
            Step::Select => "select",
            Step::ResolveInstance => "resolve-instance",
            Step::DrainShards => "drain-shards",
            Step::DetachInstance => "detach-instance",
            Step::TerminateInstance => "terminate-instance",
            Step::ClearExclusions => "clear-exclusions",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a scale operation.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("[{step}] requested capacity {requested} must be greater than current desired capacity {current}")]
    InvalidCapacity {
        step: Step,
        requested: u32,
        current: u32,
    },

    #[error("[{step}] remote call failed: {source}")]
    Remote {
        step: Step,
        #[source]
        source: anyhow::Error,
    },

    #[error("[{step}] {source}")]
    Selection {
        step: Step,
        #[source]
        source: SelectionError,
    },

    #[error("[{step}] no instance found with private ip {ip}")]
    InstanceNotFound { step: Step, ip: String },

    #[error("[{step}] timed out after {attempts} attempts ({waited:?}); the remote side may still converge")]
    Timeout {
        step: Step,
        attempts: u32,
        waited: Duration,
    },

    #[error("[{step}] cancelled")]
    Cancelled { step: Step },
}

pub type ScaleResult<T> = Result<T, ScaleError>;

impl ScaleError {
    pub(crate) fn remote(step: Step) -> impl FnOnce(anyhow::Error) -> ScaleError {
        move |source| ScaleError::Remote { step, source }
    }

    pub(crate) fn from_poll(step: Step, err: PollError) -> ScaleError {
        match err {
            PollError::Timeout { attempts, waited } => ScaleError::Timeout {
                step,
                attempts,
                waited,
            },
            PollError::Cancelled { .. } => ScaleError::Cancelled { step },
            PollError::Check { source, .. } => ScaleError::Remote { step, source },
        }
    }

    /// The step the operation stopped at.
    pub fn step(&self) -> Step {
        match self {
            ScaleError::InvalidCapacity { step, .. }
            | ScaleError::Remote { step, .. }
            | ScaleError::Selection { step, .. }
            | ScaleError::InstanceNotFound { step, .. }
            | ScaleError::Timeout { step, .. }
            | ScaleError::Cancelled { step } => *step,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScaleError::Timeout { .. })
    }
}
