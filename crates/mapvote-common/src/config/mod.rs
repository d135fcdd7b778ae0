//! Configuration types for the map-vote client

use {
    serde::{Deserialize, Serialize},
    std::{
        fs,
        path::{Path, PathBuf},
        time::Duration,
    },
};

use crate::errors::{Error, Result};

pub const ENV_API_URL: &str = "MAPVOTE_API_URL";
pub const ENV_DATA_DIR: &str = "MAPVOTE_DATA_DIR";
pub const ENV_LOG: &str = "MAPVOTE_LOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the election API, without the `/api` prefix
    pub base_url: String,
    /// Directory holding persisted preferences and cached snapshots
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Results poll period in seconds
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            data_dir: PathBuf::from(".mapvote"),
            log_level: "info".to_string(),
            poll_interval_secs: 10,
            request_timeout_secs: 10,
        }
    }
}

impl ClientConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&contents)?;
        tracing::debug!("Loaded client config from {}", path.display());
        Ok(config)
    }

    /// Apply `MAPVOTE_*` environment overrides on top of the current values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            self.base_url = url;
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var(ENV_LOG) {
            self.log_level = level;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_poll_every_ten_seconds() {
        let config = ClientConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_url": "https://vote.example.org"}}"#).unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://vote.example.org");
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.data_dir, PathBuf::from(".mapvote"));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = ClientConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_blank_url() {
        let config = ClientConfig {
            base_url: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
