//! Input identity and cache key derivation

use std::collections::BTreeMap;
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::debug;

use crate::domain::model::{CacheKey, InputIdentity, ParameterSet};

/// Bytes of the BLAKE3 digest kept in the key
const KEY_BYTES: usize = 16;

impl InputIdentity {
    /// Stat `path` and describe it. Never fails: unreadable or missing
    /// files produce a sentinel identity.
    pub fn compute(path: &Path) -> InputIdentity {
        let path_buf = path.to_path_buf();
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                let modified_secs = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or(0);
                InputIdentity::Present {
                    path: path_buf,
                    size: meta.len(),
                    modified_secs,
                }
            }
            Ok(_) => InputIdentity::Missing { path: path_buf },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                InputIdentity::Missing { path: path_buf }
            }
            Err(e) => {
                debug!("Failed to stat {}: {}", path.display(), e);
                InputIdentity::StatError { path: path_buf }
            }
        }
    }
}

impl CacheKey {
    /// Key of a full parameter set
    pub fn compute(params: &ParameterSet) -> CacheKey {
        Self::from_fields(&params.to_fields())
    }

    /// Hash `name=value;` pairs in lexicographic name order
    pub fn from_fields(fields: &BTreeMap<String, String>) -> CacheKey {
        let mut hasher = blake3::Hasher::new();
        for (name, value) in fields {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b";");
        }
        let digest = hasher.finalize();
        CacheKey::from_hex(hex::encode(&digest.as_bytes()[..KEY_BYTES]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SoundRequest;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn params() -> ParameterSet {
        ParameterSet {
            input_path: PathBuf::from("/videos/clip.mp4"),
            identity: InputIdentity::Present {
                path: PathBuf::from("/videos/clip.mp4"),
                size: 10,
                modified_secs: 5,
            },
            width: 40,
            height: 20,
            framerate: 10,
            renderer_args: "--symbols ascii".to_string(),
            chroma: None,
            sound: SoundRequest::None,
        }
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = CacheKey::compute(&params());
        let b = CacheKey::compute(&params());
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), KEY_BYTES * 2);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_independent_of_insertion_order() {
        let mut forward = BTreeMap::new();
        forward.insert("a".to_string(), "1".to_string());
        forward.insert("b".to_string(), "2".to_string());

        let mut backward = BTreeMap::new();
        backward.insert("b".to_string(), "2".to_string());
        backward.insert("a".to_string(), "1".to_string());

        assert_eq!(CacheKey::from_fields(&forward), CacheKey::from_fields(&backward));
    }

    #[test]
    fn test_key_changes_with_any_field() {
        let base = CacheKey::compute(&params());
        let variants: [(&str, fn(&mut ParameterSet)); 10] = [
            ("basename", |p: &mut ParameterSet| {
                p.input_path = PathBuf::from("/videos/other.mp4");
                p.identity = InputIdentity::Present {
                    path: PathBuf::from("/videos/other.mp4"),
                    size: 10,
                    modified_secs: 5,
                };
            }),
            ("size", |p: &mut ParameterSet| {
                p.identity = InputIdentity::Present {
                    path: PathBuf::from("/videos/clip.mp4"),
                    size: 11,
                    modified_secs: 5,
                };
            }),
            ("mtime", |p: &mut ParameterSet| {
                p.identity = InputIdentity::Present {
                    path: PathBuf::from("/videos/clip.mp4"),
                    size: 10,
                    modified_secs: 6,
                };
            }),
            ("width", |p: &mut ParameterSet| p.width = 41),
            ("height", |p: &mut ParameterSet| p.height = 21),
            ("framerate", |p: &mut ParameterSet| p.framerate = 11),
            ("renderer_args", |p: &mut ParameterSet| p.renderer_args = "--symbols block".to_string()),
            ("chroma", |p: &mut ParameterSet| p.chroma = Some("0x00FF00".to_string())),
            ("sound extract", |p: &mut ParameterSet| p.sound = SoundRequest::Extract),
            ("sound file", |p: &mut ParameterSet| p.sound = SoundRequest::File(PathBuf::from("song.mp3"))),
        ];

        let mut seen = vec![base.clone()];
        for (name, change) in variants {
            let mut changed = params();
            change(&mut changed);
            let key = CacheKey::compute(&changed);
            assert_ne!(base, key, "changing {} kept the key", name);
            assert!(!seen.contains(&key), "changing {} collided", name);
            seen.push(key);
        }
    }

    #[test]
    fn test_key_ignores_renderer_whitespace() {
        let mut padded = params();
        padded.renderer_args = "  --symbols\n ascii ".to_string();
        assert_eq!(CacheKey::compute(&params()), CacheKey::compute(&padded));
    }

    #[test]
    fn test_identity_of_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("clip.mp4");
        std::fs::write(&file, b"12345").unwrap();

        match InputIdentity::compute(&file) {
            InputIdentity::Present { size, .. } => assert_eq!(size, 5),
            other => panic!("unexpected identity {:?}", other),
        }
    }

    #[test]
    fn test_identity_of_missing_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.mp4");

        assert!(matches!(
            InputIdentity::compute(&missing),
            InputIdentity::Missing { .. }
        ));
        assert!(matches!(
            InputIdentity::compute(temp_dir.path()),
            InputIdentity::Missing { .. }
        ));
    }
}
