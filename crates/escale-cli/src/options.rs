//! Command-line flags and their resolution against `.escale.toml`.
//!
//! A flag given on the command line wins, then the config file value,
//! then the built-in default. Resolution ends in validation so the
//! orchestrators only ever see complete option records.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use escale_core::{ConfigError, EscaleConfig, RetryPolicy, parse_duration};
use escale_orchestrator::{AddOptions, RemoveOptions};

pub const DEFAULT_PORT: u16 = 9200;
pub const DEFAULT_CONFIG_FILE: &str = ".escale.toml";

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Elasticsearch host
    #[arg(long)]
    pub host: Option<String>,

    /// Elasticsearch port [default: 9200]
    #[arg(long)]
    pub port: Option<u16>,

    /// Configuration file to read in
    #[arg(short = 'f', long, default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct AwsArgs {
    /// Auto Scaling group name
    #[arg(short = 'g', long)]
    pub auto_scaling_group: Option<String>,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,

    /// AWS profile name
    #[arg(long)]
    pub profile: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RetryArgs {
    /// Max attempts while waiting for the cluster to converge
    #[arg(long)]
    pub max_retry: Option<u32>,

    /// Delay between attempts, e.g. 5s, 500ms, 2m
    #[arg(long, value_parser = parse_delay)]
    pub delay: Option<Duration>,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub aws: AwsArgs,

    /// Desired node count after the add
    #[arg(long)]
    pub desired: Option<u32>,

    #[command(flatten)]
    pub retry: RetryArgs,

    /// Leave allocation disabled if the add fails midway
    #[arg(long)]
    pub no_compensate: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub aws: AwsArgs,

    /// The name of the node to remove (random data node if omitted)
    #[arg(long)]
    pub remove_node_name: Option<String>,

    #[command(flatten)]
    pub retry: RetryArgs,

    /// Leave exclusions applied if the remove fails before detaching
    #[arg(long)]
    pub no_compensate: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NodesArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSelectors {
    pub region: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedAdd {
    pub endpoint: Endpoint,
    pub aws: AwsSelectors,
    pub options: AddOptions,
}

#[derive(Debug, Clone)]
pub struct ResolvedRemove {
    pub endpoint: Endpoint,
    pub aws: AwsSelectors,
    pub options: RemoveOptions,
}

fn parse_delay(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Validation(msg.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ConnectionArgs {
    pub fn load_config(&self) -> Result<EscaleConfig, ConfigError> {
        Ok(EscaleConfig::load_optional(&self.config_file)?.unwrap_or_default())
    }

    pub fn resolve(&self, file: &EscaleConfig) -> Result<Endpoint, ConfigError> {
        let host = non_empty(self.host.clone())
            .or_else(|| non_empty(file.host.clone()))
            .ok_or_else(|| invalid("host is required"))?;
        let port = self.port.or(file.port).unwrap_or(DEFAULT_PORT);
        Ok(Endpoint { host, port })
    }
}

impl AwsArgs {
    fn group(&self, file: &EscaleConfig) -> Result<String, ConfigError> {
        non_empty(self.auto_scaling_group.clone())
            .or_else(|| non_empty(file.auto_scaling_group.clone()))
            .ok_or_else(|| invalid("auto-scaling-group is required"))
    }

    fn selectors(&self, file: &EscaleConfig) -> AwsSelectors {
        AwsSelectors {
            region: non_empty(self.region.clone()).or_else(|| non_empty(file.region.clone())),
            profile: non_empty(self.profile.clone()).or_else(|| non_empty(file.profile.clone())),
        }
    }
}

impl RetryArgs {
    fn policy(&self, file: &EscaleConfig, default: RetryPolicy) -> Result<RetryPolicy, ConfigError> {
        let max_attempts = self
            .max_retry
            .or(file.max_retry)
            .unwrap_or(default.max_attempts);
        if max_attempts == 0 {
            return Err(invalid("max-retry must be greater than 0"));
        }
        let interval = match self.delay {
            Some(delay) => delay,
            None => file.delay()?.unwrap_or(default.interval),
        };
        Ok(RetryPolicy::new(interval, max_attempts))
    }
}

impl AddArgs {
    pub fn resolve(&self, file: &EscaleConfig) -> Result<ResolvedAdd, ConfigError> {
        let endpoint = self.connection.resolve(file)?;
        let group = self.aws.group(file)?;
        let desired = self
            .desired
            .filter(|d| *d > 0)
            .ok_or_else(|| invalid("desired is required (desired > 0)"))?;
        let options = AddOptions {
            join_policy: self.retry.policy(file, RetryPolicy::JOIN)?,
            compensate: !self.no_compensate,
            ..AddOptions::new(group, desired)
        };
        Ok(ResolvedAdd {
            endpoint,
            aws: self.aws.selectors(file),
            options,
        })
    }
}

impl RemoveArgs {
    pub fn resolve(&self, file: &EscaleConfig) -> Result<ResolvedRemove, ConfigError> {
        let endpoint = self.connection.resolve(file)?;
        let group = self.aws.group(file)?;
        let options = RemoveOptions {
            target_name: non_empty(self.remove_node_name.clone()),
            drain_policy: self.retry.policy(file, RetryPolicy::DRAIN)?,
            compensate: !self.no_compensate,
            ..RemoveOptions::new(group)
        };
        Ok(ResolvedRemove {
            endpoint,
            aws: self.aws.selectors(file),
            options,
        })
    }
}
