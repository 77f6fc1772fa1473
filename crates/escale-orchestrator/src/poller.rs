//! Bounded, fixed-interval condition polling.
//!
//! The check is re-run until it reports `true`, fails, the attempt budget
//! runs out, or the cancel signal fires. Sleeps happen only between
//! attempts, so success on attempt `k` has slept exactly `k - 1` intervals.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use escale_core::RetryPolicy;

use crate::cancel::CancelSignal;

#[derive(Debug, Error)]
pub enum PollError {
    #[error("condition not met after {attempts} attempts ({waited:?})")]
    Timeout { attempts: u32, waited: Duration },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error("check failed on attempt {attempt}: {source}")]
    Check {
        attempt: u32,
        #[source]
        source: anyhow::Error,
    },
}

/// Poll `check` under `policy`, returning the attempt on which it succeeded.
///
/// An `Err` from `check` is not retried. The check must be safe to call
/// repeatedly.
pub async fn poll_until<F, Fut>(
    policy: RetryPolicy,
    cancel: &mut CancelSignal,
    mut check: F,
) -> Result<u32, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                attempts: attempt - 1,
            });
        }

        match check().await {
            Ok(true) => return Ok(attempt),
            Ok(false) => {
                debug!(attempt, max = policy.max_attempts, "condition not met yet");
            }
            Err(source) => return Err(PollError::Check { attempt, source }),
        }

        if attempt < policy.max_attempts {
            tokio::select! {
                _ = tokio::time::sleep(policy.interval) => {}
                _ = cancel.cancelled() => {
                    return Err(PollError::Cancelled { attempts: attempt });
                }
            }
        }
    }

    Err(PollError::Timeout {
        attempts: policy.max_attempts,
        waited: policy.ceiling(),
    })
}
