//! Segment planner implementation

use std::path::Path;
use tracing::{debug, info};

use crate::domain::model::Segment;
use crate::error::{AnifetchError, AnifetchResult};
use crate::planner::ExtractionPlan;

/// Segments shorter than this are dropped unless they are the last one
const MIN_SEGMENT_SECONDS: f64 = 0.1;

/// Partitions media duration into independently decodable ranges
pub struct SegmentPlanner {
    hardware_threads: usize,
}

impl SegmentPlanner {
    /// Planner for a fixed amount of hardware parallelism
    pub fn new(hardware_threads: usize) -> Self {
        Self {
            hardware_threads: hardware_threads.max(1),
        }
    }

    /// Planner sized to the current machine
    pub fn detect() -> Self {
        Self::new(num_cpus::get())
    }

    pub fn hardware_threads(&self) -> usize {
        self.hardware_threads
    }

    /// Plan extraction of `duration` seconds at `framerate` into
    /// `segments_root/segment_<i>` directories
    pub fn plan(
        &self,
        duration: f64,
        framerate: u32,
        segments_root: &Path,
    ) -> AnifetchResult<ExtractionPlan> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(AnifetchError::invalid(
                "duration",
                format!("media duration must be positive, got {}", duration),
            ));
        }
        if framerate == 0 {
            return Err(AnifetchError::invalid("framerate", "must be positive"));
        }

        let count = self.segment_count(duration);
        let nominal = duration / count as f64;
        info!(
            "Planning {} segment(s) of {:.3}s for {:.3}s of video",
            count, nominal, duration
        );

        let mut segments = Vec::with_capacity(count);
        let mut base_offset = 0usize;
        for i in 0..count {
            let is_last = i + 1 == count;
            let start = i as f64 * nominal;
            let length = if is_last { duration - start } else { nominal };

            if length <= 0.0 || (length < MIN_SEGMENT_SECONDS && !is_last) {
                debug!("Dropping segment {} of {:.4}s", i, length);
                continue;
            }

            let index = segments.len();
            let estimated_frames = (length * framerate as f64).round() as usize;
            segments.push(Segment {
                index,
                start,
                duration: length,
                output_dir: segments_root.join(format!("segment_{}", index)),
                base_offset,
                estimated_frames,
            });
            base_offset += estimated_frames;
        }

        let render_workers = self.render_workers(segments.len());
        debug!(
            "Extraction workers: {}, render workers: {}",
            segments.len(),
            render_workers
        );

        Ok(ExtractionPlan {
            duration,
            framerate,
            segments,
            render_workers,
        })
    }

    /// Half the hardware threads, at most one segment per started second
    pub fn segment_count(&self, duration: f64) -> usize {
        let hw = self.hardware_threads;
        let wanted = if hw > 1 { hw / 2 } else { 1 }.max(1);
        let ceiling = duration.ceil().max(1.0) as usize;
        wanted.min(ceiling).max(1)
    }

    /// Render pool size given the number of extraction workers
    pub fn render_workers(&self, extraction_workers: usize) -> usize {
        let hw = self.hardware_threads;
        let spare = if hw > extraction_workers {
            hw - extraction_workers
        } else {
            1
        };
        spare.min((hw / 2).max(1)).max(1)
    }
}
