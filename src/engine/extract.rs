//! Extraction workers: one decoder invocation per segment

use std::path::Path;

use tracing::{debug, info};

use crate::domain::model::Segment;
use crate::engine::state::PipelineState;
use crate::ports::{DecoderPort, ExtractRequest};

/// Decodes one segment into its private directory
pub struct ExtractionWorker<'a> {
    decoder: &'a dyn DecoderPort,
    state: &'a PipelineState,
    input: &'a Path,
    filter_chain: &'a str,
}

impl<'a> ExtractionWorker<'a> {
    pub fn new(
        decoder: &'a dyn DecoderPort,
        state: &'a PipelineState,
        input: &'a Path,
        filter_chain: &'a str,
    ) -> Self {
        Self {
            decoder,
            state,
            input,
            filter_chain,
        }
    }

    /// Decode `segment`. The segment is marked done whatever the outcome.
    pub fn run(&self, segment: &Segment) {
        self.extract(segment);
        self.state.mark_segment_done(segment.index);
        debug!("Segment {} marked done", segment.index);
    }

    fn extract(&self, segment: &Segment) {
        if self.state.has_error() {
            debug!("Skipping segment {}: pipeline already failed", segment.index);
            return;
        }

        if let Err(e) = std::fs::create_dir_all(&segment.output_dir) {
            self.state.raise_error(format!(
                "Failed to create {} for segment {}: {}",
                segment.output_dir.display(),
                segment.index,
                e
            ));
            return;
        }

        info!(
            "Extracting segment {}: {:.3}s - {:.3}s",
            segment.index,
            segment.start,
            segment.end()
        );
        let request = ExtractRequest {
            input: self.input.to_path_buf(),
            start: Some(segment.start),
            duration: Some(segment.duration),
            max_frames: None,
            filter_chain: self.filter_chain.to_string(),
            output_dir: segment.output_dir.clone(),
        };
        match self.decoder.extract_frames(&request) {
            Ok(()) => debug!("Segment {} extracted", segment.index),
            Err(e) => self.state.raise_error(format!(
                "Frame extraction failed for segment {}: {}",
                segment.index, e
            )),
        }
    }
}
