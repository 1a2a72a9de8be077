use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::exif::{Endian, IfdKind, ParseOptions};

/// Top-level configuration for the exif-codec tools.
///
/// Controls which directories are decoded when metadata is displayed and how
/// rewritten files are produced (dry run, backups, byte order of new models).
///
/// # Loading
///
/// ```rust,no_run
/// use exif_codec::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.decode.thumbnail = false;
/// config.output.backup_originals = false;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Which directories the decoder reports.
    #[serde(default)]
    pub decode: DecodeConfig,
    /// Output behavior (dry run, backups, byte order).
    #[serde(default)]
    pub output: OutputConfig,
}

/// Directory selection for the decoder.
///
/// # Example
///
/// ```rust
/// use exif_codec::config::DecodeConfig;
///
/// let decode = DecodeConfig {
///     ifd0: true,
///     gps: true,
///     ..DecodeConfig::none()
/// };
/// assert!(!decode.exif);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    pub ifd0: bool,
    /// Thumbnail directory tags.
    pub ifd1: bool,
    pub exif: bool,
    pub gps: bool,
    pub interoperability: bool,
    /// Compressed thumbnail bytes and uncompressed strips.
    pub thumbnail: bool,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// If `true`, report what would be written without modifying any files.
    pub dry_run: bool,
    /// If `true`, create a `.bak` backup before modifying an image.
    pub backup_originals: bool,
    /// Byte order of the model created for images without EXIF data.
    pub byte_order: Endian,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            ifd0: true,
            ifd1: true,
            exif: true,
            gps: true,
            interoperability: true,
            thumbnail: true,
        }
    }
}

impl DecodeConfig {
    /// Every directory disabled.
    pub fn none() -> Self {
        Self {
            ifd0: false,
            ifd1: false,
            exif: false,
            gps: false,
            interoperability: false,
            thumbnail: false,
        }
    }

    pub fn to_parse_options(&self) -> ParseOptions {
        let selected = [
            (self.ifd0, ParseOptions::for_ifd(IfdKind::Ifd0)),
            (self.ifd1, ParseOptions::for_ifd(IfdKind::Ifd1)),
            (self.exif, ParseOptions::for_ifd(IfdKind::Exif)),
            (self.gps, ParseOptions::for_ifd(IfdKind::Gps)),
            (
                self.interoperability,
                ParseOptions::for_ifd(IfdKind::Interoperability),
            ),
            (self.thumbnail, ParseOptions::THUMBNAIL),
        ];
        selected
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .fold(ParseOptions::empty(), |acc, (_, option)| acc | option)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup_originals: true,
            byte_order: Endian::Big,
        }
    }
}

impl Config {
    /// Resolve the config file path (same directory as the executable).
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        self.decode.to_parse_options()
    }
}
