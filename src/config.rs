//! Build configuration
//!
//! Stored as JSON, by default in ~/.config/sprite-dataset/config.json.
//! Every field is optional; missing fields take their defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Canvas geometry and foreground detection for the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Output canvas width in pixels
    #[serde(default = "default_canvas")]
    pub target_width: u32,

    /// Output canvas height in pixels
    #[serde(default = "default_canvas")]
    pub target_height: u32,

    /// Minimum white border around the content
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// Pixels with luma below this value are foreground
    #[serde(default = "default_white_threshold")]
    pub white_threshold: u8,
}

fn default_canvas() -> u32 {
    96
}

fn default_padding() -> u32 {
    1
}

fn default_white_threshold() -> u8 {
    255
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            target_width: default_canvas(),
            target_height: default_canvas(),
            padding: default_padding(),
            white_threshold: default_white_threshold(),
        }
    }
}

impl NormalizeConfig {
    /// Validate the canvas geometry
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.target_width,
                height: self.target_height,
            });
        }

        let inner = self.target_width.min(self.target_height);
        if self.padding.saturating_mul(2) >= inner {
            return Err(ConfigError::PaddingTooLarge {
                padding: self.padding,
                width: self.target_width,
                height: self.target_height,
            });
        }

        if self.white_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }

        Ok(())
    }
}

/// A sprite set/entity pair whose sprite sits on a pure black background
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlackBackground {
    pub sprite_set: String,
    pub entity: u32,
}

/// Configuration for a dataset build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Downloads, unpack roots and flat sprite set folders
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Final `{index}/{sprite_set}...png` tree
    #[serde(default = "default_repository_dir")]
    pub repository_dir: PathBuf,

    /// Download archives even when a cached copy exists
    #[serde(default)]
    pub force_download: bool,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// (sprite set, entity) pairs whose black background is whitened before
    /// normalizing. Empty by default since no shipped sprite set needs it.
    #[serde(default)]
    pub black_background: Vec<BlackBackground>,
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_repository_dir() -> PathBuf {
    PathBuf::from("repository")
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            repository_dir: default_repository_dir(),
            force_download: false,
            normalize: NormalizeConfig::default(),
            black_background: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Get the default config file path (~/.config/sprite-dataset/config.json)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("sprite-dataset");

        Ok(config_dir.join("config.json"))
    }

    /// Load from `path`, or the default path when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::NotFound(path).into());
            }
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.normalize.validate()?;

        if self.scratch_dir == self.repository_dir {
            return Err(ConfigError::SharedDirectory(self.scratch_dir.clone()));
        }

        Ok(())
    }

    /// Check whether a file needs the black background workaround
    pub fn has_black_background(&self, sprite_set: &str, entity: u32) -> bool {
        self.black_background
            .iter()
            .any(|b| b.entity == entity && b.sprite_set == sprite_set)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Canvas must not be empty, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },

    #[error("Padding {padding} leaves no room on a {width}x{height} canvas")]
    PaddingTooLarge { padding: u32, width: u32, height: u32 },

    #[error("White threshold must be above 0, nothing would count as foreground")]
    ZeroThreshold,

    #[error("Scratch and repository directories must differ: {0}")]
    SharedDirectory(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.normalize.target_width, 96);
        assert_eq!(config.normalize.target_height, 96);
        assert_eq!(config.normalize.padding, 1);
        assert_eq!(config.normalize.white_threshold, 255);
        assert!(config.black_background.is_empty());
        assert!(!config.has_black_background("black-white", 201));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config: BuildConfig = serde_json::from_str(
            r#"{
                "repository_dir": "out",
                "normalize": { "padding": 4 },
                "black_background": [{ "sprite_set": "black-white", "entity": 201 }]
            }"#,
        )?;
        assert_eq!(config.repository_dir, PathBuf::from("out"));
        assert_eq!(config.scratch_dir, PathBuf::from("tmp"));
        assert_eq!(config.normalize.padding, 4);
        assert_eq!(config.normalize.target_width, 96);
        assert!(config.has_black_background("black-white", 201));
        assert!(!config.has_black_background("black-white", 202));
        assert!(!config.has_black_background("gold", 201));
        Ok(())
    }

    #[test]
    fn test_validate_geometry() {
        let mut config = NormalizeConfig::default();
        config.padding = 48;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PaddingTooLarge { padding: 48, .. })
        ));

        config.padding = 0;
        config.target_height = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyCanvas { .. })));

        let threshold = NormalizeConfig {
            white_threshold: 0,
            ..NormalizeConfig::default()
        };
        assert!(matches!(threshold.validate(), Err(ConfigError::ZeroThreshold)));
    }

    #[test]
    fn test_load_written_config() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.json");

        let mut config = BuildConfig::default();
        config.scratch_dir = dir.path().join("scratch");
        config.force_download = true;
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(&path, serde_json::to_string_pretty(&config)?)?;

        assert_eq!(BuildConfig::load(Some(&path))?, config);
        Ok(())
    }

    #[test]
    fn test_load_missing_explicit_file() -> Result<()> {
        let dir = tempdir()?;
        let err = BuildConfig::load(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::NotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_geometry() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "normalize": { "target_width": 0 } }"#)?;
        assert!(BuildConfig::load(Some(&path)).is_err());
        Ok(())
    }
}
