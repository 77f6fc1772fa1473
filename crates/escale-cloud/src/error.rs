use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    AutoScaling(#[from] aws_sdk_autoscaling::Error),

    #[error("{0}")]
    EC2(#[from] aws_sdk_ec2::Error),

    #[error("auto scaling group not found: {0}")]
    GroupNotFound(String),

    #[error("auto scaling group {0} is missing {1}")]
    MissingDetails(String, &'static str),

    #[error("capacity out of range: {0}")]
    CapacityOutOfRange(u32),
}
