//! Runtime configuration
//!
//! Values come from `config.toml` in the user config directory, then the
//! `IPAM_URL` / `IPAM_TOKEN` environment variables (a `.env` file is loaded
//! first), then command-line flags. Later sources win. Nothing is written back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ClientSettings;

pub const APP_DIR: &str = "ipam-console";
pub const ENV_URL: &str = "IPAM_URL";
pub const ENV_TOKEN: &str = "IPAM_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub token: Option<String>,
    /// Scheme placed before the token in the `Authorization` header
    pub auth_scheme: String,
    pub page_size: usize,
    pub refresh_interval_secs: u64,
    pub tick_millis: u64,
    /// Sheet read by bulk import when the workbook has it
    pub import_sheet: String,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://demo.netbox.dev".to_string(),
            token: None,
            auth_scheme: "Token".to_string(),
            page_size: 1000,
            refresh_interval_secs: 30,
            tick_millis: 250,
            import_sheet: "Sheet1".to_string(),
            export_dir: None,
        }
    }
}

/// `~/.config/ipam-console/`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

impl Config {
    /// Load the file layer.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be at least 1");
        }
        if self.tick_millis == 0 {
            anyhow::bail!("tick_millis must be at least 1");
        }
        Ok(())
    }

    /// Apply the process environment (after loading any `.env` file)
    pub fn apply_env(&mut self) {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.token = Some(token);
        }
    }

    /// Apply command-line values, which take precedence over everything else
    pub fn apply_overrides(&mut self, url: Option<String>, token: Option<String>) {
        if let Some(url) = url {
            self.base_url = url;
        }
        if let Some(token) = token {
            self.token = Some(token);
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// Where exports land when given a bare file name
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| config_dir().join("exports"))
    }

    /// Resolve an export target: relative paths go under [`Config::export_dir`]
    pub fn export_path(&self, file: &Path) -> PathBuf {
        if file.is_absolute() || file.parent().is_some_and(|p| !p.as_os_str().is_empty()) {
            file.to_path_buf()
        } else {
            self.export_dir().join(file)
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            token: self.token.clone().unwrap_or_default(),
            auth_scheme: self.auth_scheme.clone(),
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("base_url = \"http://netbox.local\"\npage_size = 50\n").unwrap();
        assert_eq!(config.base_url, "http://netbox.local");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.auth_scheme, "Token");
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(Config::from_toml("refresh_interval_secs = 0").is_err());
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let mut config = Config::from_toml("base_url = \"http://file\"\ntoken = \"file\"").unwrap();
        let env: HashMap<&str, &str> = [(ENV_URL, "http://env"), (ENV_TOKEN, "")].into();
        config.apply_env_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.base_url, "http://env");
        assert_eq!(config.token.as_deref(), Some("file"));

        config.apply_overrides(None, Some("cli".into()));
        assert_eq!(config.base_url, "http://env");
        assert_eq!(config.token.as_deref(), Some("cli"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tick_millis = 100\nimport_sheet = \"Devices\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tick(), Duration::from_millis(100));
        assert_eq!(config.import_sheet, "Devices");
    }

    #[test]
    fn test_export_path_resolution() {
        let config = Config {
            export_dir: Some(PathBuf::from("/tmp/exports")),
            ..Config::default()
        };
        assert_eq!(
            config.export_path(Path::new("devices.xlsx")),
            PathBuf::from("/tmp/exports/devices.xlsx")
        );
        assert_eq!(
            config.export_path(Path::new("out/devices.xlsx")),
            PathBuf::from("out/devices.xlsx")
        );
    }

    #[test]
    fn test_client_settings_trim_base_url() {
        let config = Config {
            base_url: "https://netbox.example/".into(),
            token: Some("abc".into()),
            ..Config::default()
        };
        let settings = config.client_settings();
        assert_eq!(settings.base_url, "https://netbox.example");
        assert_eq!(settings.token, "abc");
    }
}
