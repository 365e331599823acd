//! Terminal playback of cached frames
//!
//! Frames are drawn with absolute cursor addressing over a static template.
//! Timing is best effort: when drawing falls more than 1.5 frame periods
//! behind, the clock is re-anchored instead of skipping frames.

pub mod template;

use std::ffi::OsStr;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::adapters::process::ExternalTool;
use crate::error::{AnifetchError, AnifetchResult};
use crate::utils::path::PathUtils;

/// Blank rows above the template
pub const SCREEN_TOP_PADDING: usize = 2;
/// 1-based column where animation lines start
pub const ANIM_START_COL: usize = template::TEMPLATE_PAD_LEFT + 1;

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// Everything playback needs from a prepared cache entry
#[derive(Debug, Clone)]
pub struct PlaybackAssets {
    pub ascii_dir: PathBuf,
    pub template_file: PathBuf,
    pub audio: Option<PathBuf>,
    pub width: usize,
    pub height: usize,
    pub framerate: u32,
    pub playback_rate: f64,
}

/// Kills the audio player when dropped
pub struct AudioGuard {
    child: Child,
}

impl Drop for AudioGuard {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("Audio player already exited: {}", e);
        }
        let _ = self.child.wait();
    }
}

/// Loops the animation on a terminal
pub struct Player {
    ffplay: ExternalTool,
}

impl Player {
    pub fn new(ffplay: impl Into<String>) -> Self {
        Self {
            ffplay: ExternalTool::new("ffplay", ffplay),
        }
    }

    /// Read every text frame in name order
    pub fn load_frames(&self, ascii_dir: &Path) -> AnifetchResult<Vec<String>> {
        let files = PathUtils::new().list_with_extension(ascii_dir, "txt");
        let mut frames = Vec::with_capacity(files.len());
        for file in files {
            match std::fs::read_to_string(&file) {
                Ok(text) => frames.push(text),
                Err(e) => warn!("Could not load frame {}: {}", file.display(), e),
            }
        }
        if frames.is_empty() {
            return Err(AnifetchError::PlaybackError {
                message: format!(
                    "no animation frames in {}; try --force-render",
                    ascii_dir.display()
                ),
            });
        }
        debug!("Loaded {} frames", frames.len());
        Ok(frames)
    }

    /// Start looping audio playback
    pub fn start_audio(&self, audio: &Path) -> Option<AudioGuard> {
        let args = [
            OsStr::new("-nodisp"),
            OsStr::new("-autoexit"),
            OsStr::new("-loop"),
            OsStr::new("0"),
            OsStr::new("-loglevel"),
            OsStr::new("quiet"),
            audio.as_os_str(),
        ];
        match self.ffplay.spawn_detached(args) {
            Ok(child) => {
                info!("Playing audio {}", audio.display());
                Some(AudioGuard { child })
            }
            Err(e) => {
                warn!("Audio will not play: {}", e);
                None
            }
        }
    }

    /// Cursor-addressed drawing commands for one frame, padded or cut to
    /// `height` rows
    pub fn compose_frame(frame: &str, width: usize, height: usize) -> String {
        let mut out = String::new();
        let mut lines = frame.lines();
        for offset in 0..height {
            let row = SCREEN_TOP_PADDING + 1 + offset;
            out.push_str(&format!("\x1b[{};{}H", row, ANIM_START_COL));
            match lines.next() {
                Some(line) => out.push_str(line),
                None => out.push_str(&" ".repeat(width)),
            }
        }
        out
    }

    /// Play until `frame_limit` frames were drawn, forever when `None`
    pub fn play<W: Write>(
        &self,
        assets: &PlaybackAssets,
        out: &mut W,
        frame_limit: Option<u64>,
    ) -> AnifetchResult<()> {
        let frames = self.load_frames(&assets.ascii_dir)?;

        let audio = assets.audio.as_ref().filter(|p| p.is_file());
        let audio_guard = audio.and_then(|path| self.start_audio(path));
        let rate = if audio_guard.is_some() {
            assets.framerate as f64
        } else {
            assets.playback_rate
        };
        let period = 1.0 / rate;

        self.draw_template(assets, out)?;

        let mut anchor = Instant::now();
        let mut drawn: u64 = 0;
        loop {
            if frame_limit.is_some_and(|limit| drawn >= limit) {
                break;
            }
            let frame = &frames[(drawn % frames.len() as u64) as usize];
            let mut chunk = Self::compose_frame(frame, assets.width, assets.height);
            chunk.push_str(HIDE_CURSOR);
            out.write_all(chunk.as_bytes())?;
            out.flush()?;
            drawn += 1;

            let target = Duration::from_secs_f64(drawn as f64 * period);
            let elapsed = anchor.elapsed();
            if target > elapsed {
                thread::sleep(target - elapsed);
            } else if (elapsed - target).as_secs_f64() > 1.5 * period {
                anchor = Instant::now().checked_sub(target).unwrap_or(anchor);
            }
        }

        out.write_all(SHOW_CURSOR.as_bytes())?;
        out.flush()?;
        drop(audio_guard);
        Ok(())
    }

    fn draw_template<W: Write>(&self, assets: &PlaybackAssets, out: &mut W) -> AnifetchResult<()> {
        let mut screen = "\n".repeat(SCREEN_TOP_PADDING);
        match std::fs::read_to_string(&assets.template_file) {
            Ok(content) => {
                for (i, line) in content.lines().enumerate() {
                    screen.push_str(&format!("\x1b[{};1H{}", SCREEN_TOP_PADDING + 1 + i, line));
                }
            }
            Err(e) => warn!(
                "Static template {} unavailable: {}",
                assets.template_file.display(),
                e
            ),
        }
        out.write_all(screen.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
