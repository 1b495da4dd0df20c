//! Configuration for termination and discovery.
//!
//! Stores settings in JSON format at `~/.portchaser/config.json`. Every key is
//! optional; missing keys fall back to the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::killer::TerminationSettings;
use crate::scanner::DiscoverySettings;

/// Settings stored in `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Wait between the graceful and forced signal, in milliseconds.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Refuse to terminate system processes.
    #[serde(default = "default_true")]
    pub system_protection: bool,

    /// PIDs below this value are treated as system processes.
    #[serde(default = "default_low_pid_threshold")]
    pub low_pid_threshold: u32,

    /// Minimum time between scans for a driving loop, in milliseconds.
    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,

    /// Per-port connect timeout for the fallback probe, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Overall deadline for the fallback probe, in milliseconds.
    #[serde(default = "default_fallback_deadline_ms")]
    pub fallback_deadline_ms: u64,

    /// Lifetime of an enriched cache entry, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Resolve container identity with the docker CLI during enrichment.
    #[serde(default = "default_true")]
    pub docker_lookup: bool,
}

fn default_grace_period_ms() -> u64 {
    3_000
}

fn default_true() -> bool {
    true
}

fn default_low_pid_threshold() -> u32 {
    100
}

fn default_rescan_interval_ms() -> u64 {
    3_000
}

fn default_probe_timeout_ms() -> u64 {
    20
}

fn default_fallback_deadline_ms() -> u64 {
    500
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
            system_protection: true,
            low_pid_threshold: default_low_pid_threshold(),
            rescan_interval_ms: default_rescan_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            fallback_deadline_ms: default_fallback_deadline_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            docker_lookup: true,
        }
    }
}

impl Settings {
    /// Termination engine settings.
    pub fn termination(&self) -> TerminationSettings {
        TerminationSettings {
            grace_period: Duration::from_millis(self.grace_period_ms),
            system_protection: self.system_protection,
            low_pid_threshold: self.low_pid_threshold,
            ..TerminationSettings::default()
        }
    }

    /// Port discovery settings.
    pub fn discovery(&self) -> DiscoverySettings {
        DiscoverySettings {
            rescan_interval: Duration::from_millis(self.rescan_interval_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            fallback_deadline: Duration::from_millis(self.fallback_deadline_ms),
            cache_ttl: Some(Duration::from_secs(self.cache_ttl_secs)),
            docker_lookup: self.docker_lookup,
        }
    }
}

/// Reads and writes [`Settings`] on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a config store with the default path.
    ///
    /// Default path: `~/.portchaser/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".portchaser").join("config.json"),
        })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load settings from disk.
    ///
    /// Returns defaults if the file doesn't exist.
    pub async fn load(&self) -> Result<Settings> {
        if !fs::try_exists(&self.config_path).await? {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Write settings to disk, creating the directory if needed.
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir).await.map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        let mut file = fs::File::create(&self.config_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::with_path(dir.path().join("config.json"));

        let settings = tokio_test::assert_ok!(store.load().await);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.termination().grace_period, Duration::from_secs(3));
        assert_eq!(settings.discovery().rescan_interval, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::with_path(dir.path().join("nested").join("config.json"));

        let settings = Settings {
            grace_period_ms: 750,
            system_protection: false,
            ..Settings::default()
        };
        store.save(&settings).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, settings);
        assert!(!loaded.termination().system_protection);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, r#"{ "gracePeriodMs": 200 }"#)
            .await
            .unwrap();

        let loaded = ConfigStore::with_path(path).load().await.unwrap();
        assert_eq!(loaded.grace_period_ms, 200);
        assert!(loaded.system_protection);
        assert_eq!(loaded.low_pid_threshold, 100);
    }

    #[tokio::test]
    async fn test_invalid_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = ConfigStore::with_path(path).load().await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
