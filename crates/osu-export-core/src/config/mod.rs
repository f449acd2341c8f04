//! Configuration
//!
//! [`Config`] is what gets persisted between runs. [`ExportConfig`] is the
//! run-time view: the same settings with the filter rules parsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::filter::Filter;

/// Compression level for exported archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompressionLevel {
    /// Store only
    Fast,
    /// Balanced compression (level 6)
    #[default]
    Normal,
    /// Best compression (level 9)
    Best,
}

impl CompressionLevel {
    /// Get the zip compression level value
    pub fn to_zip_level(&self) -> u32 {
        match self {
            CompressionLevel::Fast => 0,
            CompressionLevel::Normal => 6,
            CompressionLevel::Best => 9,
        }
    }

    /// Get user-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            CompressionLevel::Fast => "Fast (no compression)",
            CompressionLevel::Normal => "Normal (balanced)",
            CompressionLevel::Best => "Best (slower, smaller)",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CompressionLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fast" | "none" | "0" => Ok(CompressionLevel::Fast),
            "normal" | "6" => Ok(CompressionLevel::Normal),
            "best" | "9" => Ok(CompressionLevel::Best),
            _ => Err(Error::Config(format!(
                "Invalid compression level '{}'. Use: fast, normal or best",
                s
            ))),
        }
    }
}

/// What an export run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    /// One .osz archive per set
    #[default]
    Beatmap,
    /// One .mp3 per distinct audio track
    Audio,
    /// One image per distinct background
    Background,
    /// One .osr per score with a replay
    Replay,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Beatmap => write!(f, "Beatmaps"),
            ExportFormat::Audio => write!(f, "Audio"),
            ExportFormat::Background => write!(f, "Backgrounds"),
            ExportFormat::Replay => write!(f, "Replays"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "beatmap" | "beatmaps" | "osz" => Ok(ExportFormat::Beatmap),
            "audio" | "mp3" => Ok(ExportFormat::Audio),
            "background" | "backgrounds" | "bg" => Ok(ExportFormat::Background),
            "replay" | "replays" | "osr" => Ok(ExportFormat::Replay),
            _ => Err(Error::Config(format!(
                "Invalid export format '{}'. Use: beatmap, audio, background or replay",
                s
            ))),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

/// Persisted configuration for osu-export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory exports are written to
    pub output_path: PathBuf,
    #[serde(default)]
    pub compression_level: CompressionLevel,
    /// Path to the ffmpeg binary; looked up on `PATH` when unset
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    /// Maximum number of audio exports running at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Filter rules applied to every run
    #[serde(default)]
    pub filters: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("osu-export"),
            compression_level: CompressionLevel::default(),
            ffmpeg_path: None,
            concurrency: default_concurrency(),
            filters: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("osu-export").join("config.json"))
    }

    /// Load config from disk, falling back to defaults if not found
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable config file: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        }
        Ok(())
    }
}

/// Settings for one export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub output_path: PathBuf,
    pub compression_level: CompressionLevel,
    /// Active filters. Raw collection filters are replaced in place when the
    /// selection is refreshed.
    pub filters: Vec<Filter>,
}

impl ExportConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            compression_level: CompressionLevel::default(),
            filters: Vec::new(),
        }
    }

    /// Build from a persisted config, parsing its filter rules
    pub fn from_config(config: &Config) -> Result<Self> {
        let filters = config
            .filters
            .iter()
            .map(|rule| Filter::parse(rule))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            output_path: config.output_path.clone(),
            compression_level: config.compression_level,
            filters,
        })
    }

    pub fn with_compression(mut self, level: CompressionLevel) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_levels() {
        assert_eq!(CompressionLevel::Fast.to_zip_level(), 0);
        assert_eq!(CompressionLevel::default().to_zip_level(), 6);
        assert_eq!("BEST".parse::<CompressionLevel>().unwrap(), CompressionLevel::Best);
        assert!("ultra".parse::<CompressionLevel>().is_err());
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("osz".parse::<ExportFormat>().unwrap(), ExportFormat::Beatmap);
        assert_eq!("Audio".parse::<ExportFormat>().unwrap(), ExportFormat::Audio);
        assert_eq!("bg".parse::<ExportFormat>().unwrap(), ExportFormat::Background);
        assert_eq!("replays".parse::<ExportFormat>().unwrap(), ExportFormat::Replay);
        assert!("video".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: Config = serde_json::from_str(r#"{ "output_path": "out" }"#).unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.compression_level, CompressionLevel::Normal);
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_export_config_parses_filters() {
        let config = Config {
            filters: vec!["stars 5+".into(), "!collection #1".into()],
            ..Default::default()
        };
        let export = ExportConfig::from_config(&config).unwrap();
        assert_eq!(export.filters.len(), 2);
        assert!(export.filters[1].is_collection_reference());
        assert!(export.filters[1].negated);

        let export = export.with_compression(CompressionLevel::Fast);
        assert_eq!(export.compression_level, CompressionLevel::Fast);
        assert_eq!(export.filters.len(), 2);

        let config = Config {
            filters: vec!["nonsense".into()],
            ..Default::default()
        };
        assert!(matches!(
            ExportConfig::from_config(&config),
            Err(Error::InvalidFilter { .. })
        ));
    }
}
