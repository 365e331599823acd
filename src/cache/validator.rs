//! Cache validity check

use tracing::{debug, info};

use crate::cache::{CacheLayout, MetadataStore};
use crate::domain::model::{CacheRecord, MissReason, ParameterSet};
use crate::error::AnifetchResult;
use crate::utils::path::PathUtils;

/// Outcome of a cache lookup
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Record matches the parameters and every artifact is in place
    Hit(CacheRecord),
    /// Assets must be rebuilt
    Miss(MissReason),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

/// Decides whether a cache entry can be reused
pub struct CacheValidator {
    store: MetadataStore,
    paths: PathUtils,
}

impl CacheValidator {
    /// Create a new cache validator
    pub fn new() -> Self {
        Self {
            store: MetadataStore::new(),
            paths: PathUtils::new(),
        }
    }
}

impl Default for CacheValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheValidator {
    /// Check the entry described by `layout` against `params`
    pub fn check(
        &self,
        params: &ParameterSet,
        layout: &CacheLayout,
        force_render: bool,
    ) -> AnifetchResult<CacheLookup> {
        let lookup = self.lookup(params, layout, force_render)?;
        match &lookup {
            CacheLookup::Hit(record) => info!(
                "Cache hit: {} frames at height {}",
                record.num_frames, record.resolved_height
            ),
            CacheLookup::Miss(reason) => info!("Cache miss: {}", reason),
        }
        Ok(lookup)
    }

    fn lookup(
        &self,
        params: &ParameterSet,
        layout: &CacheLayout,
        force_render: bool,
    ) -> AnifetchResult<CacheLookup> {
        if force_render {
            return Ok(CacheLookup::Miss(MissReason::ForcedRender));
        }

        let Some(stored) = self.store.read(&layout.metadata_file())? else {
            return Ok(CacheLookup::Miss(MissReason::NoRecord));
        };

        let expected = params.to_fields();
        for (field, current) in &expected {
            let cached = stored.get(field);
            if cached != Some(current) {
                return Ok(CacheLookup::Miss(MissReason::ParameterMismatch {
                    field: field.clone(),
                    current: current.clone(),
                    cached: cached.cloned(),
                }));
            }
        }

        let record = match CacheRecord::from_map(&stored, &expected) {
            Ok(record) => record,
            Err(reason) => return Ok(CacheLookup::Miss(reason)),
        };

        let ascii_dir = layout.ascii_dir();
        if !ascii_dir.is_dir() {
            return Ok(CacheLookup::Miss(MissReason::ArtifactDirMissing));
        }
        let on_disk = self.paths.count_with_extension(&ascii_dir, "txt");
        debug!(
            "Recorded {} frames, found {} on disk",
            record.num_frames, on_disk
        );
        if on_disk != record.num_frames {
            return Ok(CacheLookup::Miss(MissReason::FrameCountMismatch {
                recorded: record.num_frames,
                on_disk,
            }));
        }
        if record.num_frames == 0 {
            return Ok(CacheLookup::Miss(MissReason::EmptyRecord));
        }

        if let Some(audio) = &record.sound_saved_path {
            if !audio.exists() {
                return Ok(CacheLookup::Miss(MissReason::AudioMissing(audio.clone())));
            }
        }

        Ok(CacheLookup::Hit(record))
    }
}
