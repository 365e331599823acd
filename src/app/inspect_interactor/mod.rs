// Inspect interactor - Reports the cache state of a parameter set

use std::path::PathBuf;

use serde::Serialize;

use crate::cache::{CacheLayout, CacheLookup, CacheValidator};
use crate::domain::model::{CacheKey, CacheRecord, ParameterSet};
use crate::error::{AnifetchError, AnifetchResult};

/// Cache state of one parameter set
#[derive(Debug, Clone, Serialize)]
pub struct InspectResponse {
    pub key: CacheKey,
    pub cache_dir: PathBuf,
    pub cache_hit: bool,
    /// Why the entry is unusable, on a miss
    pub reason: Option<String>,
    pub parameters: ParameterSet,
    pub record: Option<CacheRecord>,
}

/// Interactor for cache inspection
pub struct InspectInteractor {
    validator: CacheValidator,
}

impl InspectInteractor {
    pub fn new() -> Self {
        Self {
            validator: CacheValidator::new(),
        }
    }
}

impl Default for InspectInteractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectInteractor {
    /// Look up the entry without touching it
    pub fn execute(
        &self,
        params: &ParameterSet,
        cache_root: &std::path::Path,
    ) -> AnifetchResult<InspectResponse> {
        let key = CacheKey::compute(params);
        let layout = CacheLayout::new(cache_root, &params.basename(), &key);
        let lookup = self.validator.check(params, &layout, false)?;

        let (cache_hit, reason, record) = match lookup {
            CacheLookup::Hit(record) => (true, None, Some(record)),
            CacheLookup::Miss(reason) => (false, Some(reason.to_string()), None),
        };
        Ok(InspectResponse {
            key,
            cache_dir: layout.key_dir().to_path_buf(),
            cache_hit,
            reason,
            parameters: params.clone(),
            record,
        })
    }

    /// Pretty JSON rendition of a response
    pub fn format_as_json(&self, response: &InspectResponse) -> AnifetchResult<String> {
        serde_json::to_string_pretty(response).map_err(|e| AnifetchError::CacheError {
            message: format!("Failed to serialize cache record: {}", e),
        })
    }
}
