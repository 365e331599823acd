//! Configuration initialization and hierarchy management
//!
//! Precedence: CLI > Env > File > Defaults.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::adapters::toml_config::{FileConfig, TomlConfigAdapter};
use crate::cli::Cli;
use crate::domain::model::validate_chroma;
use crate::error::{AnifetchError, AnifetchResult};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::utils::path::PathUtils;

pub const DEFAULT_WIDTH: u32 = 40;
pub const DEFAULT_HEIGHT: u32 = 20;
pub const DEFAULT_FRAMERATE: u32 = 10;
pub const DEFAULT_PLAYBACK_RATE: f64 = 10.0;
pub const DEFAULT_CHAFA_ARGUMENTS: &str = "--symbols ascii --fg-only";
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Effective application configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub framerate: u32,
    pub playback_rate: f64,
    pub chafa_arguments: String,
    pub chroma: Option<String>,
    pub cache_dir: PathBuf,
    pub logging: LoggingConfig,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub chafa_path: String,
    pub ffplay_path: String,
    pub fastfetch_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            framerate: DEFAULT_FRAMERATE,
            playback_rate: DEFAULT_PLAYBACK_RATE,
            chafa_arguments: DEFAULT_CHAFA_ARGUMENTS.to_string(),
            chroma: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            logging: LoggingConfig::default(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            chafa_path: "chafa".to_string(),
            ffplay_path: "ffplay".to_string(),
            fastfetch_path: "fastfetch".to_string(),
        }
    }
}

impl AppConfig {
    /// Reject values no layer may produce
    pub fn validate(&self) -> AnifetchResult<()> {
        if self.width == 0 {
            return Err(AnifetchError::invalid("width", "must be positive"));
        }
        if self.height == 0 {
            return Err(AnifetchError::invalid("height", "must be positive"));
        }
        if self.framerate == 0 {
            return Err(AnifetchError::invalid("framerate", "must be positive"));
        }
        if !self.playback_rate.is_finite() || self.playback_rate <= 0.0 {
            return Err(AnifetchError::invalid("playback_rate", "must be positive"));
        }
        if let Some(chroma) = &self.chroma {
            validate_chroma(chroma)?;
        }
        Ok(())
    }
}

/// Resolved configuration plus notes describing where values came from.
/// The notes are logged once logging is up.
#[derive(Debug, Clone)]
pub struct ConfigResolution {
    pub config: AppConfig,
    pub notes: Vec<String>,
}

/// Initialize configuration hierarchy from the process environment and the
/// current directory
pub fn initialize_configuration_hierarchy(cli: &Cli) -> AnifetchResult<ConfigResolution> {
    let base_dir = std::env::current_dir()?;
    resolve_configuration(cli, &base_dir, |key| std::env::var(key).ok())
}

/// Resolve configuration with an explicit base directory and environment
pub fn resolve_configuration<F>(cli: &Cli, base_dir: &Path, env: F) -> AnifetchResult<ConfigResolution>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::default();
    let mut notes = Vec::new();

    // Step 1: File
    let file_path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => TomlConfigAdapter::new().find_default(base_dir),
    };
    if let Some(path) = file_path {
        let file = TomlConfigAdapter::new().load(&path)?;
        apply_file(&mut config, file)?;
        notes.push(format!("Loaded configuration from {}", path.display()));
    }

    // Step 2: Environment
    let env_overrides = apply_environment(&mut config, &env)?;
    if env_overrides > 0 {
        notes.push(format!("Applied {} environment variable overrides", env_overrides));
    }

    // Step 3: CLI
    let cli_overrides = apply_cli(&mut config, cli)?;
    if cli_overrides > 0 {
        notes.push(format!("Applied {} CLI configuration overrides", cli_overrides));
    }

    config.cache_dir = PathUtils::new().absolute(&config.cache_dir)?;
    config.validate()?;
    Ok(ConfigResolution { config, notes })
}

fn apply_file(config: &mut AppConfig, file: FileConfig) -> AnifetchResult<()> {
    if let Some(v) = file.width {
        config.width = v;
    }
    if let Some(v) = file.height {
        config.height = v;
    }
    if let Some(v) = file.framerate {
        config.framerate = v;
    }
    if let Some(v) = file.playback_rate {
        config.playback_rate = v;
    }
    if let Some(v) = file.chafa_arguments {
        config.chafa_arguments = v;
    }
    if let Some(v) = file.chroma {
        config.chroma = Some(v);
    }
    if let Some(v) = file.cache_dir {
        config.cache_dir = v;
    }
    if let Some(v) = file.log_level {
        config.logging.level = LogLevel::parse(&v)?;
    }
    if let Some(v) = file.log_format {
        config.logging.format = LogFormat::parse(&v)?;
    }
    let tools = [
        (file.ffmpeg_path, &mut config.ffmpeg_path),
        (file.ffprobe_path, &mut config.ffprobe_path),
        (file.chafa_path, &mut config.chafa_path),
        (file.ffplay_path, &mut config.ffplay_path),
        (file.fastfetch_path, &mut config.fastfetch_path),
    ];
    for (value, slot) in tools {
        if let Some(v) = value {
            *slot = v;
        }
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> AnifetchResult<T> {
    value.trim().parse::<T>().map_err(|_| AnifetchError::ConfigError {
        message: format!("invalid value '{}' for {}", value, key),
    })
}

fn apply_environment<F>(config: &mut AppConfig, env: &F) -> AnifetchResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = 0;
    if let Some(v) = env("ANIFETCH_WIDTH") {
        config.width = parse_env("ANIFETCH_WIDTH", &v)?;
        overrides += 1;
    }
    if let Some(v) = env("ANIFETCH_HEIGHT") {
        config.height = parse_env("ANIFETCH_HEIGHT", &v)?;
        overrides += 1;
    }
    if let Some(v) = env("ANIFETCH_FRAMERATE") {
        config.framerate = parse_env("ANIFETCH_FRAMERATE", &v)?;
        overrides += 1;
    }
    if let Some(v) = env("ANIFETCH_PLAYBACK_RATE") {
        config.playback_rate = parse_env("ANIFETCH_PLAYBACK_RATE", &v)?;
        overrides += 1;
    }
    if let Some(v) = env("ANIFETCH_CHAFA_ARGUMENTS") {
        config.chafa_arguments = v;
        overrides += 1;
    }
    if let Some(v) = env("ANIFETCH_CACHE_DIR") {
        config.cache_dir = PathBuf::from(v);
        overrides += 1;
    }
    if let Some(v) = env("ANIFETCH_LOG_LEVEL") {
        config.logging.level = LogLevel::parse(&v)?;
        overrides += 1;
    }
    if let Some(v) = env("ANIFETCH_LOG_FORMAT") {
        config.logging.format = LogFormat::parse(&v)?;
        overrides += 1;
    }
    Ok(overrides)
}

fn apply_cli(config: &mut AppConfig, cli: &Cli) -> AnifetchResult<usize> {
    let mut overrides = 0;
    if let Some(v) = cli.horizontal {
        config.width = v;
        overrides += 1;
    }
    if let Some(v) = cli.vertical {
        config.height = v;
        overrides += 1;
    }
    if let Some(v) = cli.framerate {
        config.framerate = v;
        overrides += 1;
    }
    if let Some(v) = cli.playback_rate {
        config.playback_rate = v;
        overrides += 1;
    }
    if let Some(v) = &cli.chafa_arguments {
        config.chafa_arguments = v.clone();
        overrides += 1;
    }
    if let Some(v) = &cli.chroma {
        config.chroma = Some(v.clone());
        overrides += 1;
    }
    if cli.verbose {
        config.logging.level = LogLevel::Debug;
        overrides += 1;
    }
    if let Some(v) = &cli.log_level {
        config.logging.level = LogLevel::parse(v)?;
        overrides += 1;
    }
    if cli.log_json {
        config.logging.format = LogFormat::Json;
        overrides += 1;
    }
    Ok(overrides)
}
