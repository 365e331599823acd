// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use crate::domain::model::SizeSpec;
use crate::error::AnifetchResult;

/// One decoder invocation writing `%09d.png` files numbered from 1
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub input: PathBuf,
    /// Seek offset in seconds
    pub start: Option<f64>,
    /// Length of the decoded range in seconds
    pub duration: Option<f64>,
    /// Stop after this many frames
    pub max_frames: Option<u32>,
    pub filter_chain: String,
    pub output_dir: PathBuf,
}

/// Port for the external video decoder
pub trait DecoderPort: Send + Sync {
    /// Media duration in seconds
    fn probe_duration(&self, input: &Path) -> AnifetchResult<f64>;

    /// Codec name of the first audio stream, `None` without audio
    fn probe_audio_codec(&self, input: &Path) -> AnifetchResult<Option<String>>;

    /// Stream-copy the first audio stream into `dest`
    fn extract_audio(&self, input: &Path, dest: &Path) -> AnifetchResult<()>;

    /// Decode frames into `request.output_dir`
    fn extract_frames(&self, request: &ExtractRequest) -> AnifetchResult<()>;
}

/// Port for the external image-to-text renderer
pub trait RendererPort: Send + Sync {
    /// Render one image. Empty output means the renderer produced nothing
    /// usable for this image.
    fn convert(&self, image: &Path, size: SizeSpec) -> AnifetchResult<String>;
}

/// Port for the static system information panel
pub trait SystemInfoPort: Send + Sync {
    /// Lines of the panel without trailing newlines
    fn info_lines(&self) -> AnifetchResult<Vec<String>>;
}
