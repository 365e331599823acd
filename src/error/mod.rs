//! Error handling module for anifetch

use thiserror::Error;

/// Main error type for anifetch operations
#[derive(Error, Debug)]
pub enum AnifetchError {
    /// Input file not found or not a regular file
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// User-controlled parameter out of range or malformed
    #[error("Invalid {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Configuration file or environment could not be applied
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// External tool missing, failed to start, or exited unsuccessfully
    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    /// Media probe error
    #[error("Failed to probe media file: {message}")]
    ProbeError { message: String },

    /// Cache metadata could not be written
    #[error("Cache error: {message}")]
    CacheError { message: String },

    /// A worker raised the shared error flag
    #[error("Asset pipeline failed: {message}")]
    PipelineFailed { message: String },

    /// Pipeline finished without a single text frame
    #[error("Asset generation produced 0 frames for a video of {duration:.2}s")]
    NoFramesProduced { duration: f64 },

    /// Playback could not start or lost its terminal
    #[error("Playback error: {message}")]
    PlaybackError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AnifetchError {
    /// Shorthand for [`AnifetchError::InvalidParameter`]
    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        AnifetchError::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for [`AnifetchError::ToolFailed`]
    pub fn tool(tool: &str, message: impl Into<String>) -> Self {
        AnifetchError::ToolFailed {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for anifetch operations
pub type AnifetchResult<T> = std::result::Result<T, AnifetchError>;
