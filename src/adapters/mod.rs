// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod info_fastfetch;
pub mod process;
pub mod render_chafa;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FfmpegDecoder;
pub use info_fastfetch::FastfetchInfo;
pub use render_chafa::ChafaRenderer;
pub use toml_config::TomlConfigAdapter;
