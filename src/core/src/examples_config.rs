use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::api::DEFAULT_API_URL;
use crate::paths::examples_config_path;

/// Settings shared by the example commands, read from `~/.border0/examples.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExamplesConfig {
    pub api: ApiConfig,
    pub session_logs: SessionLogsConfig,
    pub provisioner: ProvisionerConfig,
}

impl ExamplesConfig {
    /// Load the config file; a missing file yields defaults.
    pub fn load() -> Result<Self, String> {
        let path = examples_config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw =
            std::fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        toml::from_str(&raw).map_err(|e| format!("parse {}: {e}", path.display()))
    }

    /// API base URL; `BORDER0_API_URL` overrides the file.
    pub fn api_url(&self) -> String {
        match std::env::var("BORDER0_API_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.api.base_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionLogsConfig {
    pub state_file: PathBuf,
    pub output_file: PathBuf,
    /// Maximum sessions whose recordings are fetched at once.
    pub workers: usize,
    pub page_size: u32,
    /// Window used on the first run, before any state exists.
    pub lookback_hours: i64,
}

impl Default for SessionLogsConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("app_state.json"),
            output_file: PathBuf::from("processed_sessions.json"),
            workers: 10,
            page_size: 100,
            lookback_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    pub source_file: PathBuf,
    pub state_file: PathBuf,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            source_file: PathBuf::from("source.json"),
            state_file: PathBuf::from("provisioner.state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExamplesConfig::load_from(&dir.path().join("examples.toml")).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.session_logs.workers, 10);
        assert_eq!(config.provisioner.source_file, PathBuf::from("source.json"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.toml");
        std::fs::write(
            &path,
            "[session_logs]\nworkers = 4\noutput_file = \"/var/lib/border0/sessions.json\"\n",
        )
        .unwrap();

        let config = ExamplesConfig::load_from(&path).unwrap();
        assert_eq!(config.session_logs.workers, 4);
        assert_eq!(
            config.session_logs.output_file,
            PathBuf::from("/var/lib/border0/sessions.json")
        );
        assert_eq!(config.session_logs.page_size, 100);
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.toml");
        std::fs::write(&path, "[api\nbase_url = 1").unwrap();
        let err = ExamplesConfig::load_from(&path).unwrap_err();
        assert!(err.starts_with(&format!("parse {}", path.display())), "{err}");
    }
}
