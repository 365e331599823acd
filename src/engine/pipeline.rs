//! Asset pipeline orchestration
//!
//! Runs the extraction workers, the sequencer and the render workers of one
//! rebuild concurrently inside a thread scope, then reconciles the text
//! frames on disk.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::CacheLayout;
use crate::domain::model::{ParameterSet, SizeSpec};
use crate::engine::extract::ExtractionWorker;
use crate::engine::render::RenderWorker;
use crate::engine::sequencer::{Sequencer, DEFAULT_POLL_INTERVAL};
use crate::engine::state::PipelineState;
use crate::error::{AnifetchError, AnifetchResult};
use crate::planner::ExtractionPlan;
use crate::ports::{DecoderPort, RendererPort};
use crate::utils::path::PathUtils;

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Text frames on disk, numbered `1..=frames`
    pub frames: usize,
    /// Frames handed to the render workers
    pub frames_prepared: usize,
    /// Frames the render workers reported as written
    pub frames_rendered: usize,
    pub extraction_workers: usize,
    pub render_workers: usize,
    pub elapsed: Duration,
}

/// Extraction, sequencing and rendering for one cache entry
pub struct AssetPipeline<'a> {
    decoder: &'a dyn DecoderPort,
    renderer: &'a dyn RendererPort,
    poll_interval: Duration,
    paths: PathUtils,
}

impl<'a> AssetPipeline<'a> {
    pub fn new(decoder: &'a dyn DecoderPort, renderer: &'a dyn RendererPort) -> Self {
        Self {
            decoder,
            renderer,
            poll_interval: DEFAULT_POLL_INTERVAL,
            paths: PathUtils::new(),
        }
    }

    /// Override the sequencer polling interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the plan into `layout`, rendering every frame at `size`
    pub fn run(
        &self,
        params: &ParameterSet,
        plan: &ExtractionPlan,
        layout: &CacheLayout,
        size: SizeSpec,
    ) -> AnifetchResult<PipelineReport> {
        let started = Instant::now();
        let state = PipelineState::new(plan.segments.len());
        let filter_chain = params.filter_chain();
        let merged_dir = layout.merged_png_dir();
        let ascii_dir = layout.ascii_dir();

        info!(
            "Starting pipeline: {} extraction worker(s), {} render worker(s), size {}",
            plan.segments.len(),
            plan.render_workers,
            size
        );

        thread::scope(|s| {
            let extractors: Vec<_> = plan
                .segments
                .iter()
                .map(|segment| {
                    let worker = ExtractionWorker::new(
                        self.decoder,
                        &state,
                        &params.input_path,
                        &filter_chain,
                    );
                    s.spawn(move || worker.run(segment))
                })
                .collect();

            let sequencer = s.spawn(|| {
                Sequencer::new(&state, &plan.segments, &merged_dir)
                    .with_poll_interval(self.poll_interval)
                    .run()
            });

            let renderers: Vec<_> = (0..plan.render_workers)
                .map(|id| {
                    let worker = RenderWorker::new(id, self.renderer, &state, &ascii_dir, size);
                    s.spawn(move || worker.run())
                })
                .collect();

            for (index, handle) in extractors.into_iter().enumerate() {
                if handle.join().is_err() {
                    state.raise_error(format!("Extraction worker {} panicked", index));
                    state.mark_segment_done(index);
                }
            }
            state.mark_extraction_done();
            info!("Frame extraction finished");

            if sequencer.join().is_err() {
                state.raise_error("Sequencer panicked");
                state.finish_sequencing();
            }

            for (id, handle) in renderers.into_iter().enumerate() {
                if handle.join().is_err() {
                    state.raise_error(format!("Render worker {} panicked", id));
                }
            }
        });

        if state.has_error() {
            return Err(AnifetchError::PipelineFailed {
                message: state
                    .error_message()
                    .unwrap_or_else(|| "unknown worker failure".to_string()),
            });
        }

        let frames = self.compact(&ascii_dir)?;
        let rendered = state.frames_rendered();
        if frames != rendered {
            warn!(
                "Rendered counter ({}) differs from frames on disk ({}), using disk count",
                rendered, frames
            );
        }

        let report = PipelineReport {
            frames,
            frames_prepared: state.frames_prepared(),
            frames_rendered: rendered,
            extraction_workers: plan.segments.len(),
            render_workers: plan.render_workers,
            elapsed: started.elapsed(),
        };
        info!(
            "Pipeline finished: {} of {} frames rendered in {:.2}s",
            report.frames,
            report.frames_prepared,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Renumber text frames so they occupy `1..=n` after frames were
    /// skipped. Returns `n`.
    fn compact(&self, ascii_dir: &Path) -> AnifetchResult<usize> {
        let files = self.paths.list_with_extension(ascii_dir, "txt");
        for (position, file) in files.iter().enumerate() {
            let target = ascii_dir.join(self.paths.frame_file_name(position + 1, "txt"));
            if *file != target {
                std::fs::rename(file, &target)?;
            }
        }
        if let Some(last) = files.last() {
            if last != &ascii_dir.join(self.paths.frame_file_name(files.len(), "txt")) {
                info!("Closed gaps left by skipped frames ({} frames)", files.len());
            }
        }
        Ok(files.len())
    }
}
