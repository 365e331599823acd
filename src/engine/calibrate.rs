//! Output height resolution
//!
//! The renderer keeps the image aspect ratio, so the number of lines it
//! emits for `width x height` can be smaller than the requested height.
//! One sample frame is rendered up front and its line count is used for
//! every frame of the run.

use std::path::Path;

use tracing::{debug, info};

use crate::domain::model::{ParameterSet, SizeSpec};
use crate::error::{AnifetchError, AnifetchResult};
use crate::ports::{DecoderPort, ExtractRequest, RendererPort};
use crate::utils::path::PathUtils;

/// Renders the first frame of the input to measure the output height
pub struct HeightResolver<'a> {
    decoder: &'a dyn DecoderPort,
    renderer: &'a dyn RendererPort,
}

impl<'a> HeightResolver<'a> {
    pub fn new(decoder: &'a dyn DecoderPort, renderer: &'a dyn RendererPort) -> Self {
        Self { decoder, renderer }
    }

    /// Resolve the height, using a scratch directory below `scratch_parent`
    pub fn resolve(&self, params: &ParameterSet, scratch_parent: &Path) -> AnifetchResult<u32> {
        let scratch = tempfile::Builder::new()
            .prefix("height_probe")
            .tempdir_in(scratch_parent)?;

        let request = ExtractRequest {
            input: params.input_path.clone(),
            start: None,
            duration: None,
            max_frames: Some(1),
            filter_chain: params.filter_chain(),
            output_dir: scratch.path().to_path_buf(),
        };
        self.decoder.extract_frames(&request)?;

        let sample = scratch
            .path()
            .join(PathUtils::new().frame_file_name(1, "png"));
        if !sample.is_file() {
            return Err(AnifetchError::tool(
                "ffmpeg",
                "no sample frame extracted for height resolution",
            ));
        }

        let text = self.renderer.convert(&sample, params.requested_size())?;
        if text.is_empty() {
            return Err(AnifetchError::tool(
                "chafa",
                "empty output while resolving output height",
            ));
        }

        let lines = text.lines().count() as u32;
        let height = if lines == 0 { params.height } else { lines };
        info!(
            "Resolved output size {} (requested {})",
            SizeSpec::new(params.width, height),
            params.requested_size()
        );
        debug!("Height probe scratch dir {}", scratch.path().display());
        Ok(height)
    }
}
