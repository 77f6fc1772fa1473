//! escale-cloud — AWS side of a scale operation.
//!
//! [`AutoScalingClient`] implements [`escale_core::ScalingGroupClient`] and
//! [`Ec2Client`] implements [`escale_core::ComputeClient`]. Both are built
//! from one shared SDK config loaded by [`load_sdk_config`].

mod autoscaling;
mod ec2;
mod error;

pub use autoscaling::AutoScalingClient;
pub use ec2::Ec2Client;
pub use error::{Error, Result};

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Load AWS configuration from the environment, optionally pinning the
/// region and the shared-config profile.
pub async fn load_sdk_config(region: Option<&str>, profile: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region.filter(|r| !r.is_empty()) {
        loader = loader.region(Region::new(region.to_string()));
    }
    if let Some(profile) = profile.filter(|p| !p.is_empty()) {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}
