use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tsuki_api::Endpoints;

use crate::error::CoreError;
use crate::locator::EpisodeLocator;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub airing: AiringConfig,
    pub navigation: NavigationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiringConfig {
    pub fallback_url: String,
    /// Passthrough proxy for the fallback source. Omit to call it directly.
    #[serde(default)]
    pub proxy_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    pub fallback_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber` env-filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl AppConfig {
    /// Load config: user file (if exists) replaces the built-in defaults.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::config_path())
    }

    /// Load from an explicit path, falling back to defaults when it is absent.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let config = if path.exists() {
            tracing::debug!(path = %path.display(), "loading user config");
            let user_str =
                std::fs::read_to_string(path).map_err(|e| CoreError::Config(e.to_string()))?;
            toml::from_str::<AppConfig>(&user_str).map_err(|e| CoreError::Config(e.to_string()))?
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| CoreError::Config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject unusable URLs and a zero page size.
    pub fn validate(&self) -> Result<(), CoreError> {
        let urls = [
            ("catalog.base_url", Some(&self.catalog.base_url)),
            ("airing.fallback_url", Some(&self.airing.fallback_url)),
            ("airing.proxy_url", self.airing.proxy_url.as_ref()),
        ];
        for (key, value) in urls {
            if let Some(value) = value {
                url::Url::parse(value)
                    .map_err(|e| CoreError::Config(format!("{key}: {e}")))?;
            }
        }
        if self.navigation.fallback_page_size == 0 {
            return Err(CoreError::Config(
                "navigation.fallback_page_size must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Endpoints for the catalog client.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            catalog: self.catalog.base_url.clone(),
            schedule: self.airing.fallback_url.clone(),
            proxy: self.airing.proxy_url.clone().filter(|p| !p.is_empty()),
            user_agent: self.catalog.user_agent.clone(),
        }
    }

    /// A fresh locator using the configured fallback page size.
    pub fn locator(&self) -> EpisodeLocator {
        EpisodeLocator::new(self.navigation.fallback_page_size)
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "tsuki")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
