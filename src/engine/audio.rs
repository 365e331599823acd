//! Audio track preparation

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::model::SoundRequest;
use crate::ports::DecoderPort;

/// File stem of an extracted audio stream
pub const EXTRACTED_AUDIO_STEM: &str = "output_audio";

/// Container extension for a stream-copied audio codec
pub fn codec_extension(codec: &str) -> &'static str {
    match codec {
        "aac" | "alac" => "m4a",
        "mp3" => "mp3",
        "opus" => "opus",
        "vorbis" => "ogg",
        "pcm_s16le" => "wav",
        "flac" => "flac",
        _ => "bin",
    }
}

/// Places the requested audio track into a cache directory.
///
/// Audio is optional: every failure is logged and yields `None`.
pub struct AudioPreparer<'a> {
    decoder: &'a dyn DecoderPort,
}

impl<'a> AudioPreparer<'a> {
    pub fn new(decoder: &'a dyn DecoderPort) -> Self {
        Self { decoder }
    }

    pub fn prepare(&self, request: &SoundRequest, input: &Path, key_dir: &Path) -> Option<PathBuf> {
        match request {
            SoundRequest::None => None,
            SoundRequest::File(source) => self.copy_external(source, key_dir),
            SoundRequest::Extract => self.extract(input, key_dir),
        }
    }

    fn copy_external(&self, source: &Path, key_dir: &Path) -> Option<PathBuf> {
        if !source.is_file() {
            warn!("Sound file not found: {}", source.display());
            return None;
        }
        let Some(name) = source.file_name() else {
            warn!("Sound path has no file name: {}", source.display());
            return None;
        };
        let dest = key_dir.join(name);
        match std::fs::copy(source, &dest) {
            Ok(_) => {
                info!("Copied sound file to {}", dest.display());
                Some(dest)
            }
            Err(e) => {
                warn!("Failed to copy sound file {}: {}", source.display(), e);
                None
            }
        }
    }

    fn extract(&self, input: &Path, key_dir: &Path) -> Option<PathBuf> {
        let codec = match self.decoder.probe_audio_codec(input) {
            Ok(Some(codec)) => codec,
            Ok(None) => {
                info!("No audio stream in {}", input.display());
                return None;
            }
            Err(e) => {
                warn!("Failed to probe audio codec: {}", e);
                return None;
            }
        };

        let dest = key_dir.join(format!(
            "{}.{}",
            EXTRACTED_AUDIO_STEM,
            codec_extension(&codec)
        ));
        match self.decoder.extract_audio(input, &dest) {
            Ok(()) if dest.is_file() => Some(dest),
            Ok(()) => {
                warn!("Audio extraction produced no file");
                None
            }
            Err(e) => {
                warn!("Audio extraction failed: {}", e);
                let _ = std::fs::remove_file(&dest);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnifetchError, AnifetchResult};
    use crate::ports::ExtractRequest;
    use tempfile::TempDir;

    struct AudioOnlyDecoder {
        codec: Option<&'static str>,
        fail: bool,
    }

    impl DecoderPort for AudioOnlyDecoder {
        fn probe_duration(&self, _input: &Path) -> AnifetchResult<f64> {
            Ok(1.0)
        }

        fn probe_audio_codec(&self, _input: &Path) -> AnifetchResult<Option<String>> {
            Ok(self.codec.map(str::to_string))
        }

        fn extract_audio(&self, _input: &Path, dest: &Path) -> AnifetchResult<()> {
            if self.fail {
                return Err(AnifetchError::tool("ffmpeg", "exit status 1"));
            }
            std::fs::write(dest, b"audio")?;
            Ok(())
        }

        fn extract_frames(&self, _request: &ExtractRequest) -> AnifetchResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_codec_extension() {
        assert_eq!(codec_extension("aac"), "m4a");
        assert_eq!(codec_extension("alac"), "m4a");
        assert_eq!(codec_extension("vorbis"), "ogg");
        assert_eq!(codec_extension("pcm_s16le"), "wav");
        assert_eq!(codec_extension("truehd"), "bin");
    }

    #[test]
    fn test_extract_uses_codec_extension() {
        let temp_dir = TempDir::new().unwrap();
        let decoder = AudioOnlyDecoder {
            codec: Some("opus"),
            fail: false,
        };
        let path = AudioPreparer::new(&decoder).prepare(
            &SoundRequest::Extract,
            Path::new("clip.webm"),
            temp_dir.path(),
        );
        assert_eq!(path, Some(temp_dir.path().join("output_audio.opus")));
    }

    #[test]
    fn test_no_audio_stream_or_failure_yields_none() {
        let temp_dir = TempDir::new().unwrap();
        let silent = AudioOnlyDecoder {
            codec: None,
            fail: false,
        };
        let broken = AudioOnlyDecoder {
            codec: Some("aac"),
            fail: true,
        };
        let input = Path::new("clip.mp4");

        assert_eq!(
            AudioPreparer::new(&silent).prepare(&SoundRequest::Extract, input, temp_dir.path()),
            None
        );
        assert_eq!(
            AudioPreparer::new(&broken).prepare(&SoundRequest::Extract, input, temp_dir.path()),
            None
        );
    }

    #[test]
    fn test_external_file_is_copied() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("song.mp3");
        std::fs::write(&source, b"id3").unwrap();
        let key_dir = temp_dir.path().join("key");
        std::fs::create_dir(&key_dir).unwrap();
        let decoder = AudioOnlyDecoder {
            codec: None,
            fail: false,
        };

        let preparer = AudioPreparer::new(&decoder);
        let copied = preparer.prepare(&SoundRequest::File(source), Path::new("clip.mp4"), &key_dir);
        assert_eq!(copied, Some(key_dir.join("song.mp3")));

        let missing = SoundRequest::File(temp_dir.path().join("missing.mp3"));
        assert_eq!(preparer.prepare(&missing, Path::new("clip.mp4"), &key_dir), None);
    }
}
