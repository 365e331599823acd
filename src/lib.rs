//! anifetch library
//!
//! Turns a video into cached terminal-art frames and plays them next to the
//! output of a system information tool.

pub mod adapters;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod playback;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::model::{CacheKey, CacheRecord, ParameterSet, SoundRequest};
pub use error::{AnifetchError, AnifetchResult};
