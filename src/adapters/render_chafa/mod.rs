//! Chafa rendering adapter

use std::path::Path;

use crate::adapters::process::ExternalTool;
use crate::domain::model::SizeSpec;
use crate::error::AnifetchResult;
use crate::ports::RendererPort;

/// Renderer backed by the `chafa` executable
pub struct ChafaRenderer {
    chafa: ExternalTool,
    extra_args: Vec<String>,
}

impl ChafaRenderer {
    /// `extra_args` is a whitespace separated argument string
    pub fn new(program: impl Into<String>, extra_args: &str) -> Self {
        Self {
            chafa: ExternalTool::new("chafa", program),
            extra_args: extra_args.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Full argument list for one image
    pub fn args(&self, image: &Path, size: SizeSpec) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend([
            "--format".to_string(),
            "symbols".to_string(),
            format!("--size={}", size),
            image.to_string_lossy().to_string(),
        ]);
        args
    }
}

impl RendererPort for ChafaRenderer {
    fn convert(&self, image: &Path, size: SizeSpec) -> AnifetchResult<String> {
        self.chafa.run_stdout(self.args(image, size))
    }
}
