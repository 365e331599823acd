//! CLI module for anifetch
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

pub mod args;
pub mod commands;

/// anifetch
///
/// Renders a video into cached terminal-art frames and plays them next to
/// your system information.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "anifetch")]
#[command(about = "Play a video as terminal art next to your system information")]
#[command(version)]
pub struct Cli {
    /// Input video file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Animation width in character cells
    #[arg(short = 'W', long, value_parser = args::positive_u32)]
    pub horizontal: Option<u32>,

    /// Requested animation height in character cells
    #[arg(short = 'H', long, value_parser = args::positive_u32)]
    pub vertical: Option<u32>,

    /// Frames extracted per second of video
    #[arg(short = 'r', long, value_parser = args::positive_u32)]
    pub framerate: Option<u32>,

    /// Playback speed in frames per second when no sound plays
    #[arg(short = 'p', long, value_parser = args::positive_rate)]
    pub playback_rate: Option<f64>,

    /// Play sound: the video's own track, or the given audio file
    #[arg(short, long, num_args = 0..=1, default_missing_value = "", value_name = "PATH")]
    pub sound: Option<String>,

    /// Ignore the cache and rebuild every asset
    #[arg(long)]
    pub force_render: bool,

    /// Extra arguments passed to chafa
    #[arg(short = 'c', long, allow_hyphen_values = true)]
    pub chafa_arguments: Option<String>,

    /// Colour made transparent, e.g. 0x00FF00
    #[arg(long, value_parser = args::chroma_color)]
    pub chroma: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Build or validate the cache, then exit without playing
    #[arg(long, conflicts_with = "inspect")]
    pub prepare_only: bool,

    /// Print the cache record as JSON and exit
    #[arg(long)]
    pub inspect: bool,
}
