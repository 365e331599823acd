// Prepare interactor - Orchestrates the cached asset generation use case

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cache::{CacheLayout, CacheLookup, CacheValidator, MetadataStore};
use crate::domain::model::{CacheKey, CacheRecord, ParameterSet, SizeSpec};
use crate::engine::sequencer::DEFAULT_POLL_INTERVAL;
use crate::engine::{AssetPipeline, AudioPreparer, HeightResolver, PipelineReport};
use crate::error::{AnifetchError, AnifetchResult};
use crate::planner::SegmentPlanner;
use crate::ports::{DecoderPort, RendererPort};

/// Durations at or below this are treated as unreadable media
const MIN_MEDIA_DURATION: f64 = 0.01;

/// Request to make the assets of one parameter set available
#[derive(Debug, Clone)]
pub struct PrepareRequest {
    pub params: ParameterSet,
    pub cache_root: PathBuf,
    pub playback_rate: f64,
    pub force_render: bool,
}

/// Prepared assets
#[derive(Debug, Clone)]
pub struct PrepareResponse {
    pub key: CacheKey,
    pub layout: CacheLayout,
    pub record: CacheRecord,
    /// Whether the assets came from the cache
    pub cache_hit: bool,
    /// Pipeline statistics of a rebuild
    pub report: Option<PipelineReport>,
}

/// Interactor for the asset preparation use case
pub struct PrepareInteractor {
    decoder: Arc<dyn DecoderPort>,
    renderer: Arc<dyn RendererPort>,
    planner: SegmentPlanner,
    validator: CacheValidator,
    store: MetadataStore,
    poll_interval: Duration,
}

impl PrepareInteractor {
    /// Create new prepare interactor with injected ports
    pub fn new(
        decoder: Arc<dyn DecoderPort>,
        renderer: Arc<dyn RendererPort>,
        planner: SegmentPlanner,
    ) -> Self {
        Self {
            decoder,
            renderer,
            planner,
            validator: CacheValidator::new(),
            store: MetadataStore::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the sequencer polling interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Reuse cached assets or rebuild them
    pub fn execute(&self, request: &PrepareRequest) -> AnifetchResult<PrepareResponse> {
        let params = &request.params;
        params.validate()?;
        if !params.identity.is_present() {
            return Err(AnifetchError::InputFileNotFound {
                path: params.input_path.display().to_string(),
            });
        }

        let key = CacheKey::compute(params);
        let layout = CacheLayout::new(&request.cache_root, &params.basename(), &key);
        info!("Cache key {} at {}", key, layout.key_dir().display());

        if let CacheLookup::Hit(record) =
            self.validator.check(params, &layout, request.force_render)?
        {
            return Ok(PrepareResponse {
                key,
                layout,
                record,
                cache_hit: true,
                report: None,
            });
        }

        layout.prepare_fresh()?;
        match self.rebuild(request, &layout) {
            Ok((record, report)) => Ok(PrepareResponse {
                key,
                layout,
                record,
                cache_hit: false,
                report: Some(report),
            }),
            Err(e) => {
                warn!("Rebuild failed, discarding {}", layout.key_dir().display());
                layout.discard();
                Err(e)
            }
        }
    }

    fn rebuild(
        &self,
        request: &PrepareRequest,
        layout: &CacheLayout,
    ) -> AnifetchResult<(CacheRecord, PipelineReport)> {
        let params = &request.params;
        let decoder = self.decoder.as_ref();
        let renderer = self.renderer.as_ref();

        let audio = AudioPreparer::new(decoder).prepare(
            &params.sound,
            &params.input_path,
            layout.key_dir(),
        );

        let height = HeightResolver::new(decoder, renderer).resolve(params, layout.key_dir())?;

        let duration = decoder.probe_duration(&params.input_path)?;
        if !duration.is_finite() || duration <= MIN_MEDIA_DURATION {
            return Err(AnifetchError::invalid(
                "duration",
                format!(
                    "{} reports a duration of {:.3}s",
                    params.input_path.display(),
                    duration
                ),
            ));
        }
        info!("Video duration: {:.3}s", duration);

        let plan = self
            .planner
            .plan(duration, params.framerate, &layout.segments_root())?;
        let report = AssetPipeline::new(decoder, renderer)
            .with_poll_interval(self.poll_interval)
            .run(
                params,
                &plan,
                layout,
                SizeSpec::new(params.width, height),
            )?;

        if report.frames == 0 {
            return Err(AnifetchError::NoFramesProduced { duration });
        }
        layout.remove_transient();

        let record = CacheRecord::from_run(
            params,
            request.playback_rate,
            height,
            audio,
            report.frames,
            duration,
        );
        self.store.write(&layout.metadata_file(), &record.to_map())?;
        info!("Cached {} frames at {}", report.frames, layout.key_dir().display());
        Ok((record, report))
    }
}
