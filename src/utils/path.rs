//! Path utilities for frame artifacts and input files

use crate::error::{AnifetchError, AnifetchResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Path utilities shared by the cache and the engine
pub struct PathUtils;

impl PathUtils {
    /// Create a new path utils instance
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PathUtils {
    fn default() -> Self {
        Self::new()
    }
}

impl PathUtils {
    /// Zero-padded frame file name, e.g. `000000042.txt`
    pub fn frame_file_name(&self, index: usize, extension: &str) -> String {
        format!("{:09}.{}", index, extension)
    }

    /// Resolve a path against the current directory without touching the
    /// filesystem beyond `current_dir`
    pub fn absolute(&self, path: &Path) -> AnifetchResult<PathBuf> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        let cwd = std::env::current_dir().map_err(AnifetchError::IoError)?;
        Ok(cwd.join(path))
    }

    /// Files directly inside `dir` with the given extension, sorted by name
    pub fn list_with_extension(&self, dir: &Path, extension: &str) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    }

    /// Number of files directly inside `dir` with the given extension
    pub fn count_with_extension(&self, dir: &Path, extension: &str) -> usize {
        self.list_with_extension(dir, extension).len()
    }
}
