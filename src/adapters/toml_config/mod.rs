// TOML config adapter - Configuration file loading

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{AnifetchError, AnifetchResult};

/// Config files probed when `--config` is not given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["anifetch.toml", "config/anifetch.toml"];

/// Values of the `[anifetch]` table. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub framerate: Option<u32>,
    pub playback_rate: Option<f64>,
    pub chafa_arguments: Option<String>,
    pub chroma: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub ffmpeg_path: Option<String>,
    pub ffprobe_path: Option<String>,
    pub chafa_path: Option<String>,
    pub ffplay_path: Option<String>,
    pub fastfetch_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    anifetch: FileConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Create new TOML config adapter
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TomlConfigAdapter {
    /// Parse a TOML document
    pub fn parse(&self, content: &str) -> AnifetchResult<FileConfig> {
        let document: ConfigDocument =
            toml::from_str(content).map_err(|e| AnifetchError::ConfigError {
                message: format!("Failed to parse TOML config: {}", e),
            })?;
        Ok(document.anifetch)
    }

    /// Load a specific config file
    pub fn load(&self, path: &Path) -> AnifetchResult<FileConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| AnifetchError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        debug!("Loaded config file {}", path.display());
        self.parse(&content)
    }

    /// First existing default config file below `base_dir`
    pub fn find_default(&self, base_dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(|p| base_dir.join(p))
            .find(|p| p.is_file())
    }
}
