//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Theme display mode preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ThemeMode {
    /// Automatically detect OS theme (dark/light)
    #[default]
    Auto,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// Directory where generated overlays and blobs are written
    pub output_dir: PathBuf,
    /// Base device-tree blob used when merging overlays into a full DTB
    pub base_dtb: Option<PathBuf>,
    /// Directory scanned for hardware-addon manifests
    pub addons_dir: Option<PathBuf>,
}

impl Default for PathConfig {
    fn default() -> Self {
        // The kernel picks overlays up from the boot partition
        Self {
            output_dir: PathBuf::from("/boot"),
            base_dtb: None,
            addons_dir: None,
        }
    }
}

/// Names of the external device-tree programs this tool drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramConfig {
    /// Device-tree compiler invoked to build overlays
    pub dtc: String,
    /// Overlay-merge tool invoked to build a full DTB
    pub fdtoverlay: String,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            dtc: "dtc".to_string(),
            fdtoverlay: "fdtoverlay".to_string(),
        }
    }
}

/// UI preferences configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Theme mode preference (Auto, Dark, Light)
    #[serde(default)]
    pub theme_mode: ThemeMode,
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/headerio/config.toml`
/// - macOS: `~/Library/Application Support/headerio/config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// External program names
    #[serde(default)]
    pub programs: ProgramConfig,
    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("headerio");

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::new());
        }

        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to the config file, creating the directory if needed.
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).context(format!(
            "Failed to create config directory: {}",
            config_dir.display()
        ))?;

        let config_path = Self::config_file_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, content).context(format!(
            "Failed to write config file: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values that can be checked without touching hardware.
    pub fn validate(&self) -> Result<()> {
        if self.programs.dtc.trim().is_empty() {
            anyhow::bail!("programs.dtc must not be empty");
        }
        if self.programs.fdtoverlay.trim().is_empty() {
            anyhow::bail!("programs.fdtoverlay must not be empty");
        }
        if let Some(base_dtb) = &self.paths.base_dtb {
            if !base_dtb.exists() {
                anyhow::bail!("Base DTB not found: {}", base_dtb.display());
            }
        }
        Ok(())
    }
}
