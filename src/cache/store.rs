//! Flat `key=value` metadata persistence

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{AnifetchError, AnifetchResult};

/// Reads and writes cache metadata files
pub struct MetadataStore;

impl MetadataStore {
    /// Create a new metadata store
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore {
    /// Parse `key=value` lines. Blank lines, `#` comments, lines without
    /// `=` and empty keys are skipped. Values are unescaped after trimming.
    pub fn parse(&self, content: &str) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for (number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("Skipping malformed metadata line {}: {}", number + 1, line);
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                warn!("Skipping metadata line {} with empty key", number + 1);
                continue;
            }
            map.insert(key.to_string(), unescape_value(value.trim()));
        }
        map
    }

    /// Serialize as sorted `key=value` lines. Values are escaped so that
    /// `parse` returns them unchanged.
    pub fn serialize(&self, map: &BTreeMap<String, String>) -> String {
        let mut out = String::new();
        for (key, value) in map {
            out.push_str(key);
            out.push('=');
            out.push_str(&escape_value(value));
            out.push('\n');
        }
        out
    }

    /// Load a metadata file; `Ok(None)` when it does not exist
    pub fn read(&self, path: &Path) -> AnifetchResult<Option<BTreeMap<String, String>>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(self.parse(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AnifetchError::CacheError {
                message: format!("Failed to read {}: {}", path.display(), e),
            }),
        }
    }

    /// Write atomically through a temporary file in the same directory
    pub fn write(&self, path: &Path, map: &BTreeMap<String, String>) -> AnifetchResult<()> {
        let dir = path.parent().ok_or_else(|| AnifetchError::CacheError {
            message: format!("Metadata path has no parent: {}", path.display()),
        })?;
        let cache_err = |e: std::io::Error| AnifetchError::CacheError {
            message: format!("Failed to write {}: {}", path.display(), e),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(cache_err)?;
        temp.write_all(self.serialize(map).as_bytes())
            .map_err(cache_err)?;
        temp.as_file().sync_all().map_err(cache_err)?;
        temp.persist(path).map_err(|e| cache_err(e.error))?;

        debug!("Wrote metadata file {}", path.display());
        Ok(())
    }
}

/// Escape line breaks, tabs, backslashes and whitespace at either end
fn escape_value(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        let at_edge = i == 0 || i == last;
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' if at_edge => out.push_str("\\s"),
            c if c.is_control() || (at_edge && c.is_whitespace()) => {
                out.push_str(&format!("\\u{{{:x}}}", c as u32))
            }
            c => out.push(c),
        }
    }
    out
}

/// Inverse of `escape_value`. Unknown sequences are kept verbatim.
fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some('u') if chars.peek() == Some(&'{') => {
                chars.next();
                let hex: String = chars.by_ref().take_while(|&h| h != '}').collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u{");
                        out.push_str(&hex);
                        out.push('}');
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
