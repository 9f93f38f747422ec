//! Configuration for pixwire.
//!
//! TOML file with defaults for every value; the file is optional and the
//! CLI works with zero config.
//!
//! # Config file locations
//!
//! Priority order:
//! 1. `$PIXWIRE_CONFIG` environment variable
//! 2. Platform config dir (`directories::ProjectDirs`), e.g.
//!    `~/Library/Application Support/pixwire/config.toml` on macOS
//! 3. `~/.config/pixwire/config.toml`
//!
//! # Example
//!
//! ```toml
//! [encode]
//! pixel_format = "argb"
//! quiet = true
//!
//! [limits]
//! max_image_bytes = 16777216
//! ```

use std::path::{Path, PathBuf};

use pixwire_graphics::{FrameKind, PixelFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound accepted for `limits.max_image_bytes` (1 GiB).
const MAX_IMAGE_BYTES_CEILING: usize = 1024 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct PixwireConfig {
    pub encode: EncodeConfig,
    pub limits: LimitsConfig,
}

impl PixwireConfig {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        log::info!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PixwireConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the config file path based on environment and platform.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PIXWIRE_CONFIG") {
            return PathBuf::from(path);
        }

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pixwire") {
            return proj_dirs.config_dir().join("config.toml");
        }

        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/pixwire/config.toml")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        let max = self.limits.max_image_bytes;
        if max == 0 || max > MAX_IMAGE_BYTES_CEILING {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_image_bytes must be between 1 and {MAX_IMAGE_BYTES_CEILING}, got {max}"
            )));
        }

        Ok(())
    }
}

/// Defaults for how images are encoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct EncodeConfig {
    /// Channel order of input pixel words.
    pub pixel_format: PixelFormat,
    /// Emit `q=2` on the first frame so the terminal sends no responses.
    pub quiet: bool,
}

impl EncodeConfig {
    pub fn frame_kind(&self) -> FrameKind {
        FrameKind::from_quiet(self.quiet)
    }
}

/// Input size limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct LimitsConfig {
    /// Largest pixel buffer the CLI will encode, in bytes.
    pub max_image_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 64 * 1024 * 1024,
        }
    }
}
