use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_LOG_FILTER, DEFAULT_OUTPUT_ROOT};
use crate::error::{ConvertError, Result};
use crate::types::ImageSize;

/// Where converted files for an input directory end up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// `<output_root>/<input dir name>`
    #[default]
    Nested,
    /// `<input dir>/labelme_output`
    InPlace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_root: PathBuf,
    pub layout: OutputLayout,
    pub copy_images: bool,
    pub probe_image_size: bool,
    pub fail_on_error: bool,
    pub fallback_size: ImageSize,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rotated JSON log files; console only when unset
    pub dir: Option<PathBuf>,
    /// Used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            layout: OutputLayout::default(),
            copy_images: false,
            probe_image_size: false,
            fail_on_error: false,
            fallback_size: ImageSize::DEFAULT,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `isat2labelme.toml` in the
    /// working directory is used when present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_root.as_os_str().is_empty() {
            return Err(ConvertError::Config("output_root must not be empty".to_string()));
        }
        if self.fallback_size.height == 0 || self.fallback_size.width == 0 {
            return Err(ConvertError::Config(format!(
                "fallback_size must be non-zero, got {}x{}",
                self.fallback_size.width, self.fallback_size.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_root, PathBuf::from("results"));
        assert_eq!(config.fallback_size, ImageSize { height: 1080, width: 1920 });
        assert_eq!(config.layout, OutputLayout::Nested);
        assert!(!config.copy_images);
    }

    #[test]
    fn test_parses_all_fields() {
        let config = Config::from_toml(
            r#"
            output_root = "/data/labelme"
            layout = "in-place"
            copy_images = true
            probe_image_size = true
            fail_on_error = true

            [fallback_size]
            height = 480
            width = 640

            [logging]
            dir = "logs"
            filter = "isat2labelme=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_root, PathBuf::from("/data/labelme"));
        assert_eq!(config.layout, OutputLayout::InPlace);
        assert!(config.copy_images);
        assert!(config.probe_image_size);
        assert!(config.fail_on_error);
        assert_eq!(config.fallback_size, ImageSize { height: 480, width: 640 });
        assert_eq!(config.logging.dir, Some(PathBuf::from("logs")));
        assert_eq!(config.logging.filter, "isat2labelme=debug");
    }

    #[test]
    fn test_rejects_zero_fallback() {
        let err = Config::from_toml("[fallback_size]\nheight = 0\nwidth = 10\n").unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_layout() {
        let err = Config::from_toml("layout = \"flat\"").unwrap_err();
        assert!(matches!(err, ConvertError::Toml(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&temp.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
