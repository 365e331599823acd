//! Shared fakes for the integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anifetch::domain::model::{InputIdentity, ParameterSet, SizeSpec, SoundRequest};
use anifetch::error::{AnifetchError, AnifetchResult};
use anifetch::ports::{DecoderPort, ExtractRequest, RendererPort, SystemInfoPort};
use anifetch::utils::path::PathUtils;

/// Decoder writing `round(duration * framerate)` placeholder images per call
pub struct FakeDecoder {
    pub duration: f64,
    pub framerate: u32,
    pub audio_codec: Option<String>,
    /// Fail the extraction starting at this offset
    pub fail_at_start: Option<f64>,
    pub frame_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
}

impl FakeDecoder {
    pub fn new(duration: f64, framerate: u32) -> Self {
        Self {
            duration,
            framerate,
            audio_codec: None,
            fail_at_start: None,
            frame_calls: AtomicUsize::new(0),
            probe_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.frame_calls.load(Ordering::SeqCst) + self.probe_calls.load(Ordering::SeqCst)
    }
}

impl DecoderPort for FakeDecoder {
    fn probe_duration(&self, _input: &Path) -> AnifetchResult<f64> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.duration)
    }

    fn probe_audio_codec(&self, _input: &Path) -> AnifetchResult<Option<String>> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.audio_codec.clone())
    }

    fn extract_audio(&self, _input: &Path, dest: &Path) -> AnifetchResult<()> {
        std::fs::write(dest, b"audio")?;
        Ok(())
    }

    fn extract_frames(&self, request: &ExtractRequest) -> AnifetchResult<()> {
        self.frame_calls.fetch_add(1, Ordering::SeqCst);
        if let (Some(fail), Some(start)) = (self.fail_at_start, request.start) {
            if (fail - start).abs() < 1e-9 {
                return Err(AnifetchError::tool("ffmpeg", "simulated decode failure"));
            }
        }

        std::fs::create_dir_all(&request.output_dir)?;
        let count = match request.max_frames {
            Some(max) => max as usize,
            None => {
                let length = request.duration.unwrap_or(self.duration);
                (length * self.framerate as f64).round() as usize
            }
        };
        let paths = PathUtils::new();
        for i in 1..=count {
            let file = request.output_dir.join(paths.frame_file_name(i, "png"));
            std::fs::write(file, format!("{:?}+{}", request.start, i))?;
        }
        Ok(())
    }
}

/// Renderer echoing the image file name on `min(lines, height)` lines
pub struct FakeRenderer {
    pub lines: usize,
    /// Image file name that renders to nothing
    pub blank_for: Option<String>,
    pub calls: AtomicUsize,
}

impl FakeRenderer {
    pub fn new(lines: usize) -> Self {
        Self {
            lines,
            blank_for: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RendererPort for FakeRenderer {
    fn convert(&self, image: &Path, size: SizeSpec) -> AnifetchResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.blank_for.as_deref() == Some(name.as_str()) {
            return Ok(String::new());
        }
        let rows = self.lines.min(size.height as usize);
        Ok((0..rows).map(|row| format!("{}:{}\n", name, row)).collect())
    }
}

/// System information panel with fixed lines
pub struct FixedInfo(pub Vec<String>);

impl SystemInfoPort for FixedInfo {
    fn info_lines(&self) -> AnifetchResult<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Write a placeholder input video and return its absolute path
pub fn create_input(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not really a video").unwrap();
    path
}

pub fn parameters(input: &Path, width: u32, height: u32, framerate: u32) -> ParameterSet {
    ParameterSet {
        input_path: input.to_path_buf(),
        identity: InputIdentity::compute(input),
        width,
        height,
        framerate,
        renderer_args: "--symbols ascii --fg-only".to_string(),
        chroma: None,
        sound: SoundRequest::None,
    }
}

/// Names of the text frames in `dir`, sorted
pub fn text_frames(dir: &Path) -> Vec<String> {
    PathUtils::new()
        .list_with_extension(dir, "txt")
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect()
}
