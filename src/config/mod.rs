use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "calorie-tracker";

fn default_status_timeout() -> u64 {
    3
}

/// Optional colour overrides, `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PaletteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gained: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_selected: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Storage file holding the record slot (defaults to the data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Seconds before a status message clears itself
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    #[serde(default)]
    pub palette: PaletteConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            status_timeout_secs: default_status_timeout(),
            palette: PaletteConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(APP_DIR);

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Per-user data directory for the storage file and logs
    pub fn data_dir() -> Result<PathBuf> {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?
            .join(APP_DIR);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Ok(Self::load_from(&path)),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Defaults are only written when no config file exists yet. A file
    /// that fails to read or parse is left untouched.
    fn load_from(path: &Path) -> Self {
        if !path.exists() {
            let config = AppConfig::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Could not write default config: {}", e);
            }
            return config;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Failed to parse {}, using defaults: {}", path.display(), e),
            },
            Err(e) => tracing::warn!("Failed to read {}, using defaults: {}", path.display(), e),
        }
        AppConfig::default()
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Storage file to use, with `--data-file` taking precedence
    pub fn storage_path(&self, override_path: Option<PathBuf>) -> Result<PathBuf> {
        match override_path.or_else(|| self.data_file.clone()) {
            Some(path) => Ok(path),
            None => Ok(Self::data_dir()?.join("storage.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            data_file: Some(PathBuf::from("/tmp/calories.json")),
            status_timeout_secs: 5,
            palette: PaletteConfig {
                gained: Some("#a6da95".to_string()),
                burned: Some("#f38ba8".to_string()),
                ..PaletteConfig::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(config, deserialized);
        assert!(!serialized.contains("accent"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.status_timeout_secs, 3);

        let config = AppConfig::parse("[palette]\naccent = \"#fc0\"\n").unwrap();
        assert_eq!(config.palette.accent.as_deref(), Some("#fc0"));
        assert_eq!(config.data_file, None);
    }

    #[test]
    fn test_storage_path_precedence() {
        let config = AppConfig {
            data_file: Some(PathBuf::from("/from/config.json")),
            ..AppConfig::default()
        };
        assert_eq!(
            config.storage_path(Some(PathBuf::from("/from/flag.json"))).unwrap(),
            PathBuf::from("/from/flag.json")
        );
        assert_eq!(
            config.storage_path(None).unwrap(),
            PathBuf::from("/from/config.json")
        );
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = AppConfig::load_from(&path);
        assert_eq!(config, AppConfig::default());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(AppConfig::parse(&written).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_broken_file_is_left_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let content = "data_file = \"/home/me/calories.json\"\nstatus_timeout_secs = \"five\"\n";
        std::fs::write(&path, content).unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_load_keeps_broken_file_under_xdg_config_home() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        let path = temp_dir.path().join(APP_DIR).join("config.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let content = "data_file = \"/home/me/calories.json\"\nstatus_timeout_secs = \"five\"\n";
        std::fs::write(&path, content).unwrap();

        let config = AppConfig::load().unwrap();
        std::env::remove_var("XDG_CONFIG_HOME");

        assert_eq!(config.data_file, None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }
}
