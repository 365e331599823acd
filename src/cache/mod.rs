//! Content-addressed cache of generated assets
//!
//! Every parameter set owns one directory,
//! `<cache_root>/<input basename>/<key>/`, holding the metadata record, the
//! text frames and the audio artifact. Decoder output lives in transient
//! subdirectories that are removed once the text frames exist.

pub mod fingerprint;
pub mod store;
pub mod validator;

pub use store::*;
pub use validator::*;

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::domain::model::CacheKey;
use crate::error::{AnifetchError, AnifetchResult};

/// Metadata file name inside a key directory
pub const METADATA_FILE: &str = "cache.txt";
/// Directory holding `<index:09>.txt` text frames
pub const ASCII_DIR: &str = "ascii_art";
/// Directory holding renumbered images while rendering
pub const MERGED_PNG_DIR: &str = "final_pngs";
/// Parent of the per-segment decoder directories
pub const SEGMENTS_DIR: &str = "temp_png_segments";
/// Static info panel, shared by every key of one input
pub const TEMPLATE_FILE: &str = "template.txt";

/// Paths of one cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    input_dir: PathBuf,
    key_dir: PathBuf,
}

impl CacheLayout {
    /// Layout for `key` of the input named `basename` under `cache_root`
    pub fn new(cache_root: &Path, basename: &str, key: &CacheKey) -> Self {
        let input_dir = cache_root.join(basename);
        let key_dir = input_dir.join(key.as_str());
        Self { input_dir, key_dir }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn key_dir(&self) -> &Path {
        &self.key_dir
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.key_dir.join(METADATA_FILE)
    }

    pub fn ascii_dir(&self) -> PathBuf {
        self.key_dir.join(ASCII_DIR)
    }

    pub fn merged_png_dir(&self) -> PathBuf {
        self.key_dir.join(MERGED_PNG_DIR)
    }

    pub fn segments_root(&self) -> PathBuf {
        self.key_dir.join(SEGMENTS_DIR)
    }

    pub fn template_file(&self) -> PathBuf {
        self.input_dir.join(TEMPLATE_FILE)
    }

    /// Wipe the key directory and recreate the empty working tree
    pub fn prepare_fresh(&self) -> AnifetchResult<()> {
        self.discard();
        for dir in [
            self.key_dir.clone(),
            self.ascii_dir(),
            self.merged_png_dir(),
            self.segments_root(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| AnifetchError::CacheError {
                message: format!("Failed to create {}: {}", dir.display(), e),
            })?;
        }
        debug!("Prepared cache directory {}", self.key_dir.display());
        Ok(())
    }

    /// Delete the whole key directory. Failures are only logged.
    pub fn discard(&self) {
        if !self.key_dir.exists() {
            return;
        }
        match std::fs::remove_dir_all(&self.key_dir) {
            Ok(()) => debug!("Removed cache directory {}", self.key_dir.display()),
            Err(e) => warn!(
                "Failed to remove cache directory {}: {}",
                self.key_dir.display(),
                e
            ),
        }
    }

    /// Remove decoder scratch directories after a successful run
    pub fn remove_transient(&self) {
        for dir in [self.merged_png_dir(), self.segments_root()] {
            if dir.exists() {
                if let Err(e) = std::fs::remove_dir_all(&dir) {
                    warn!("Failed to remove {}: {}", dir.display(), e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let key = CacheKey::from_hex("abc123");
        let layout = CacheLayout::new(Path::new("/cache"), "clip.mp4", &key);

        assert_eq!(layout.key_dir(), Path::new("/cache/clip.mp4/abc123"));
        assert_eq!(
            layout.metadata_file(),
            PathBuf::from("/cache/clip.mp4/abc123/cache.txt")
        );
        assert_eq!(
            layout.template_file(),
            PathBuf::from("/cache/clip.mp4/template.txt")
        );
    }

    #[test]
    fn test_prepare_fresh_clears_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(temp_dir.path(), "clip.mp4", &CacheKey::from_hex("k"));

        layout.prepare_fresh().unwrap();
        std::fs::write(layout.ascii_dir().join("000000001.txt"), "old").unwrap();

        layout.prepare_fresh().unwrap();
        assert!(layout.ascii_dir().is_dir());
        assert!(layout.segments_root().is_dir());
        assert!(!layout.ascii_dir().join("000000001.txt").exists());
    }

    #[test]
    fn test_remove_transient_keeps_text_frames() {
        let temp_dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(temp_dir.path(), "clip.mp4", &CacheKey::from_hex("k"));
        layout.prepare_fresh().unwrap();

        layout.remove_transient();
        assert!(layout.ascii_dir().is_dir());
        assert!(!layout.merged_png_dir().exists());
        assert!(!layout.segments_root().exists());

        layout.discard();
        assert!(!layout.key_dir().exists());
    }
}
