//! Render workers: turn queued images into text frames

use std::path::Path;

use tracing::{debug, warn};

use crate::domain::model::SizeSpec;
use crate::engine::state::PipelineState;
use crate::ports::RendererPort;
use crate::utils::path::PathUtils;

/// Consumes the shared queue until sequencing finishes or the run fails
pub struct RenderWorker<'a> {
    id: usize,
    renderer: &'a dyn RendererPort,
    state: &'a PipelineState,
    ascii_dir: &'a Path,
    size: SizeSpec,
    paths: PathUtils,
}

impl<'a> RenderWorker<'a> {
    pub fn new(
        id: usize,
        renderer: &'a dyn RendererPort,
        state: &'a PipelineState,
        ascii_dir: &'a Path,
        size: SizeSpec,
    ) -> Self {
        Self {
            id,
            renderer,
            state,
            ascii_dir,
            size,
            paths: PathUtils::new(),
        }
    }

    /// Returns the number of text frames this worker wrote
    pub fn run(&self) -> usize {
        let mut written = 0usize;
        while let Some(frame) = self.state.queue().pop_when(|| self.state.render_finished()) {
            if self.state.has_error() {
                break;
            }

            let text = match self.renderer.convert(&frame.image_path, self.size) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Worker {}: skipping frame {}: {}", self.id, frame.index, e);
                    continue;
                }
            };
            if text.is_empty() {
                warn!(
                    "Worker {}: renderer produced no output for frame {}",
                    self.id, frame.index
                );
                continue;
            }

            let target = self
                .ascii_dir
                .join(self.paths.frame_file_name(frame.index, "txt"));
            if let Err(e) = std::fs::write(&target, text) {
                warn!(
                    "Worker {}: skipping frame {}: failed to write {}: {}",
                    self.id,
                    frame.index,
                    target.display(),
                    e
                );
                continue;
            }
            self.state.record_rendered();
            written += 1;
        }
        debug!("Render worker {} finished after {} frames", self.id, written);
        written
    }
}
