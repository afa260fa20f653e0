//! Ledger configuration
//!
//! Loaded from `mealtoken.toml`. Every key is optional:
//!
//! ```toml
//! data_file = "/var/lib/mealtoken/token_data.json"
//!
//! [cutoffs.lunch]
//! sell = "14:00"
//! display = "14:10"
//!
//! [cutoffs.dinner]
//! sell = "22:15"
//! display = "22:30"
//!
//! [admin]
//! username = "admin"
//! roll = "000000"
//! mobile = "01111111111"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::expiry::ExpiryPolicy;
use crate::permissions::AdminIdentity;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV: &str = "MEALTOKEN_CONFIG";
pub const CONFIG_FILE_NAME: &str = "mealtoken.toml";
pub const DEFAULT_DATA_FILE_NAME: &str = "token_data.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Snapshot file; defaults to the platform data directory
    pub data_file: Option<PathBuf>,
    pub cutoffs: ExpiryPolicy,
    pub admin: AdminIdentity,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Could not determine {0} directory")]
    NoProjectDir(&'static str),
}

impl LedgerConfig {
    /// Parse configuration directly from TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(content)?;
        config.cutoffs.warn_on_inverted_cutoffs();
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `$MEALTOKEN_CONFIG`, else from the platform config directory
    pub fn discover() -> Result<Self, ConfigError> {
        Self::load_or_default(&Self::config_path()?)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dirs = project_dirs().ok_or(ConfigError::NoProjectDir("config"))?;
        Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Resolve where the snapshot lives
    pub fn data_file_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        let dirs = project_dirs().ok_or(ConfigError::NoProjectDir("data"))?;
        Ok(dirs.data_dir().join(DEFAULT_DATA_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("bd", "ruet", "mealtoken")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;
    use chrono::NaiveTime;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_is_default() {
        let config = LedgerConfig::from_toml("").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.admin.username, "admin");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
data_file = "/tmp/tokens.json"

[cutoffs.lunch]
sell = "13:00"
display = "13:20"

[cutoffs.dinner]
sell = "21:00"
display = "21:10"

[admin]
username = "warden"
roll = "1"
mobile = "0170"
"#;
        let config = LedgerConfig::from_toml(toml).unwrap();
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/tokens.json")));
        assert_eq!(
            config.cutoffs.sell_cutoff(MealType::Dinner),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap()
        );
        assert_eq!(config.admin.username, "warden");
        assert_eq!(config.data_file_path().unwrap(), PathBuf::from("/tmp/tokens.json"));
    }

    #[test]
    fn test_partial_cutoff_table_keeps_defaults() {
        let config = LedgerConfig::from_toml("[cutoffs.lunch]\nsell = \"13:00\"\n").unwrap();
        let defaults = ExpiryPolicy::default();
        assert_eq!(
            config.cutoffs.sell_cutoff(MealType::Lunch),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap()
        );
        assert_eq!(
            config.cutoffs.display_cutoff(MealType::Lunch),
            defaults.display_cutoff(MealType::Lunch)
        );
        assert_eq!(config.cutoffs.dinner, defaults.dinner);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = LedgerConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "cutoffs = 5").unwrap();
        let result = LedgerConfig::load_or_default(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
