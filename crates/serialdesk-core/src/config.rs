use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SerialDeskError};

/// Root application configuration, loaded from `~/.config/serialdesk/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub form: FormConfig,
    pub log: LogConfig,
}

/// Where the suggestion and details endpoints live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Transport timeout. Unset means whatever reqwest does by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub min_query_chars: usize,
    pub blur_hide_delay_ms: u64,
    pub refire_delay_ms: u64,
    pub support_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            user_agent: "serialdesk/0.1".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            blur_hide_delay_ms: 200,
            refire_delay_ms: 500,
            support_email: "service@electrolabgroup.com".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl FormConfig {
    pub fn blur_hide_delay(&self) -> Duration {
        Duration::from_millis(self.blur_hide_delay_ms)
    }

    pub fn refire_delay(&self) -> Duration {
        Duration::from_millis(self.refire_delay_ms)
    }

    /// Text shown when a serial is unknown or has no customer attached.
    pub fn not_found_message(&self) -> String {
        format!(
            "We were not able to fetch this serial number in our system.\n\
             For service booking please mail us on: {}",
            self.support_email
        )
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/serialdesk/config.toml`
    pub fn config_path() -> PathBuf {
        // Allow override via env var
        if let Ok(path) = std::env::var("SERIALDESK_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("serialdesk")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SERIALDESK_BASE_URL")
            && !url.trim().is_empty()
        {
            self.backend.base_url = url;
        }
    }

    // ─── Derived paths ─────────────────────────────────────

    /// Log file used while the TUI owns the terminal.
    pub fn log_file_path(&self) -> PathBuf {
        match &self.log.file {
            Some(file) => PathBuf::from(file),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("serialdesk")
                .join("serialdesk.log"),
        }
    }

    /// Flattened `section.key = value` view, used by `serialdesk config`.
    pub fn key_values(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("backend.base_url", self.backend.base_url.clone());
        map.insert("backend.user_agent", self.backend.user_agent.clone());
        map.insert(
            "backend.timeout_secs",
            self.backend
                .timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".to_string()),
        );
        map.insert("form.min_query_chars", self.form.min_query_chars.to_string());
        map.insert(
            "form.blur_hide_delay_ms",
            self.form.blur_hide_delay_ms.to_string(),
        );
        map.insert("form.refire_delay_ms", self.form.refire_delay_ms.to_string());
        map.insert("form.support_email", self.form.support_email.clone());
        map.insert("log.level", self.log.level.clone());
        map.insert(
            "log.file",
            self.log_file_path().to_string_lossy().to_string(),
        );
        map
    }

    pub fn get(&self, key: &str) -> Result<String> {
        self.key_values()
            .remove(key)
            .ok_or_else(|| SerialDeskError::UnknownConfigKey(key.to_string()))
    }
}
