//! FFmpeg execution adapter
//!
//! Decodes frames and audio through the `ffmpeg` and `ffprobe` executables.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::process::ExternalTool;
use crate::error::{AnifetchError, AnifetchResult};
use crate::ports::{DecoderPort, ExtractRequest};

/// Output pattern of decoded frames, numbered from 1
pub const FRAME_PATTERN: &str = "%09d.png";

/// Builder for ffmpeg argument lists
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    input_args: Vec<String>,
    output_args: Vec<String>,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new command reading `input` and writing `output`
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Add an argument placed before `-i`
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an argument placed after `-i`
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Seek before opening the input
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.6}", seconds))
    }

    /// Limit the decoded length
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.6}", seconds))
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    pub fn max_frames(self, frames: u32) -> Self {
        self.output_arg("-vframes").output_arg(frames.to_string())
    }

    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    pub fn audio_copy(self) -> Self {
        self.output_arg("-c:a").output_arg("copy")
    }

    /// Build the command arguments
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-nostdin".to_string(),
            "-v".to_string(),
            self.log_level.clone(),
        ];
        args.extend(self.input_args.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Decoder backed by the ffmpeg command-line tools
pub struct FfmpegDecoder {
    ffmpeg: ExternalTool,
    ffprobe: ExternalTool,
}

impl FfmpegDecoder {
    /// Create a decoder using the given program names or paths
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ExternalTool::new("ffmpeg", ffmpeg),
            ffprobe: ExternalTool::new("ffprobe", ffprobe),
        }
    }

    /// Arguments for a frame extraction request
    pub fn frame_args(request: &ExtractRequest) -> Vec<String> {
        let mut command =
            FfmpegCommand::new(&request.input, request.output_dir.join(FRAME_PATTERN));
        if let Some(start) = request.start {
            command = command.seek(start);
        }
        if let Some(duration) = request.duration {
            command = command.duration(duration);
        }
        command = command.video_filter(request.filter_chain.clone()).no_audio();
        if let Some(frames) = request.max_frames {
            command = command.max_frames(frames);
        }
        command.build_args()
    }

    fn probe_entry(&self, input: &Path, selector: &[&str], entry: &str) -> AnifetchResult<String> {
        let mut args: Vec<String> = vec!["-v".to_string(), "error".to_string()];
        args.extend(selector.iter().map(|s| s.to_string()));
        args.extend([
            "-show_entries".to_string(),
            entry.to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            input.to_string_lossy().to_string(),
        ]);
        let stdout = self.ffprobe.run_stdout(&args)?;
        Ok(stdout.lines().next().unwrap_or("").trim().to_string())
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl DecoderPort for FfmpegDecoder {
    fn probe_duration(&self, input: &Path) -> AnifetchResult<f64> {
        let value = self.probe_entry(input, &[], "format=duration")?;
        let duration = value.parse::<f64>().map_err(|_| AnifetchError::ProbeError {
            message: format!(
                "unparsable duration '{}' for {}",
                value,
                input.display()
            ),
        })?;
        debug!("Probed duration of {}: {:.3}s", input.display(), duration);
        Ok(duration)
    }

    fn probe_audio_codec(&self, input: &Path) -> AnifetchResult<Option<String>> {
        let codec = self.probe_entry(input, &["-select_streams", "a:0"], "stream=codec_name")?;
        Ok(if codec.is_empty() { None } else { Some(codec) })
    }

    fn extract_audio(&self, input: &Path, dest: &Path) -> AnifetchResult<()> {
        info!("Extracting audio to {}", dest.display());
        let args = FfmpegCommand::new(input, dest)
            .no_video()
            .audio_copy()
            .build_args();
        self.ffmpeg.run(&args)?;
        Ok(())
    }

    fn extract_frames(&self, request: &ExtractRequest) -> AnifetchResult<()> {
        let args = Self::frame_args(request);
        self.ffmpeg.run(&args)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExtractRequest {
        ExtractRequest {
            input: PathBuf::from("/videos/clip.mp4"),
            start: Some(2.5),
            duration: Some(2.5),
            max_frames: None,
            filter_chain: "fps=10,format=rgb24".to_string(),
            output_dir: PathBuf::from("/tmp/segment_1"),
        }
    }

    #[test]
    fn test_segment_args() {
        let args = FfmpegDecoder::frame_args(&request());
        let joined = args.join(" ");

        assert!(joined.starts_with("-y -nostdin -v error -ss 2.500000 -i /videos/clip.mp4"));
        assert!(joined.contains("-t 2.500000 -vf fps=10,format=rgb24 -an"));
        assert!(joined.ends_with("/tmp/segment_1/%09d.png"));
        assert!(!joined.contains("-vframes"));
    }

    #[test]
    fn test_single_frame_args() {
        let mut request = request();
        request.start = None;
        request.duration = None;
        request.max_frames = Some(1);
        let args = FfmpegDecoder::frame_args(&request);

        assert!(!args.contains(&"-ss".to_string()));
        assert!(!args.contains(&"-t".to_string()));
        let pos = args.iter().position(|a| a == "-vframes").unwrap();
        assert_eq!(args[pos + 1], "1");
    }

    #[test]
    fn test_audio_copy_args() {
        let args = FfmpegCommand::new("in.mp4", "out.m4a")
            .no_video()
            .audio_copy()
            .build_args();
        assert_eq!(
            args.join(" "),
            "-y -nostdin -v error -i in.mp4 -vn -c:a copy out.m4a"
        );
    }
}
