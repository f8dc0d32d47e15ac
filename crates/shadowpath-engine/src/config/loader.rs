use super::schema::ShadowPathConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Browser binary, applied on top of any file value.
pub const CHROME_BIN_ENV: &str = "CHROME_BIN";
/// Persistent profile directory, applied on top of any file value.
pub const USER_DATA_DIR_ENV: &str = "SHADOWPATH_USER_DATA_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve the effective configuration.
    ///
    /// An explicit `path` must exist. Without one the first of
    /// `./shadowpath.yaml` and `~/.shadowpath/config.yaml` that exists is
    /// read, falling back to defaults. Environment overrides apply last.
    pub async fn load(path: Option<&Path>) -> Result<ShadowPathConfig, ConfigError> {
        let config = match path {
            Some(path) => Self::load_from(path).await?,
            None => Self::load_default().await?,
        };
        Ok(Self::apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    async fn load_default() -> Result<ShadowPathConfig, ConfigError> {
        let local_config = PathBuf::from("./shadowpath.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".shadowpath").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(ShadowPathConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<ShadowPathConfig, ConfigError> {
        tracing::debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: ShadowPathConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Overlay `CHROME_BIN` and `SHADOWPATH_USER_DATA_DIR` as read through
    /// `lookup`. Empty values are ignored.
    pub fn apply_env_overrides<F>(mut config: ShadowPathConfig, lookup: F) -> ShadowPathConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(chrome_bin) = var(CHROME_BIN_ENV) {
            tracing::debug!("{} overrides browser.chrome_bin", CHROME_BIN_ENV);
            config.browser.chrome_bin = Some(PathBuf::from(chrome_bin));
        }
        if let Some(dir) = var(USER_DATA_DIR_ENV) {
            tracing::debug!("{} overrides browser.user_data_dir", USER_DATA_DIR_ENV);
            config.browser.user_data_dir = Some(PathBuf::from(dir));
        }
        config
    }
}
