//! `.escale.toml` configuration file parser.
//!
//! Every key is optional. Values from the file fill in whatever the
//! command line left unset; see `escale-cli` for the layering.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscaleConfig {
    /// Elasticsearch host. `url` is accepted for older config files.
    #[serde(alias = "url")]
    pub host: Option<String>,
    pub port: Option<u16>,
    pub auto_scaling_group: Option<String>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub max_retry: Option<u32>,
    /// Delay between retries, e.g. `"5s"`.
    pub delay: Option<String>,
}

impl EscaleConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file if it exists. A missing file yields `None`.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, ConfigError> {
        match Self::from_file(path) {
            Ok(config) => Ok(Some(config)),
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!(path = %path.display(), "config file not found, using flags and defaults");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The parsed `delay` value, if set.
    pub fn delay(&self) -> Result<Option<Duration>, ConfigError> {
        self.delay.as_deref().map(parse_duration).transpose()
    }
}

/// Parse a duration string like "5s", "500ms", "2m". A bare number is seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let trimmed = s.trim();
    let parsed = if let Some(secs) = trimmed.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = trimmed.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        trimmed.parse::<u64>().ok().map(Duration::from_secs)
    };
    parsed.ok_or_else(|| ConfigError::InvalidDuration(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_full_file() {
        let toml_str = r#"
host = "es.internal"
port = 9201
auto_scaling_group = "es-data"
region = "ap-northeast-1"
profile = "ops"
max_retry = 10
delay = "2s"
"#;
        let config: EscaleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host.as_deref(), Some("es.internal"));
        assert_eq!(config.port, Some(9201));
        assert_eq!(config.auto_scaling_group.as_deref(), Some("es-data"));
        assert_eq!(config.max_retry, Some(10));
        assert_eq!(config.delay().unwrap(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn url_key_is_an_alias_for_host() {
        let config: EscaleConfig = toml::from_str(r#"url = "localhost""#).unwrap();
        assert_eq!(config.host.as_deref(), Some("localhost"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(toml::from_str::<EscaleConfig>("hots = \"typo\"").is_err());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EscaleConfig::load_optional(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        let err = EscaleConfig::load_optional(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "auto_scaling_group = \"es-data\"").unwrap();
        let loaded = EscaleConfig::load_optional(file.path()).unwrap().unwrap();
        assert_eq!(loaded.auto_scaling_group.as_deref(), Some("es-data"));
        assert!(loaded.host.is_none());
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
        assert!(matches!(
            parse_duration("soon"),
            Err(ConfigError::InvalidDuration(_))
        ));
    }

    #[test]
    fn parse_duration_rejects_minutes_that_overflow() {
        assert!(matches!(
            parse_duration("307445734561825861m"),
            Err(ConfigError::InvalidDuration(_))
        ));
        assert_eq!(
            parse_duration("18446744073709551615s").unwrap(),
            Duration::from_secs(u64::MAX)
        );
    }
}
