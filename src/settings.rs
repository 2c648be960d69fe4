//! Settings for hookpin itself
//!
//! Layers, lowest priority first: embedded defaults, the user file, the
//! project `hookpin.toml`, an explicit `--settings` file, then `HOOKPIN_*`
//! environment variables. CLI flags are applied on top by the caller.

use crate::pipeline::Stage;
use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Embed the default settings at compile time
const DEFAULT_SETTINGS: &str = include_str!("../default-settings.toml");

/// Project-level settings file name
pub const PROJECT_SETTINGS_FILE: &str = "hookpin.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Pipeline descriptor path, relative to the working directory
    pub config_file: PathBuf,

    /// Repository cache location
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Disable fetching of hook repositories
    pub offline: bool,

    pub default_stage: Stage,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_with_custom_settings(None)
    }

    pub fn load_with_custom_settings(custom: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_SETTINGS));

        if let Some(user) = Self::user_settings_path() {
            figment = figment.merge(Toml::file(user));
        }
        figment = figment.merge(Toml::file(PROJECT_SETTINGS_FILE));

        if let Some(path) = custom {
            if !path.exists() {
                bail!("Settings file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        // Environment variables always have highest priority
        figment = figment.merge(Env::prefixed("HOOKPIN_"));

        let settings: Settings = figment.extract().context("Failed to load hookpin settings")?;
        tracing::trace!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Configured cache directory, or `<user cache dir>/hookpin`
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("hookpin")
        })
    }

    fn user_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hookpin").join("settings.toml"))
    }
}
