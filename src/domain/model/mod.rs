// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{AnifetchError, AnifetchResult};

/// Names of the persisted metadata fields. These are part of the on-disk
/// format and must not change.
pub mod fields {
    pub const FILENAME_BASENAME: &str = "filename_basename";
    pub const VIDEO_FILE_IDENTITY: &str = "video_file_identity";
    pub const WIDTH: &str = "width";
    pub const HEIGHT_ARG: &str = "height_arg";
    pub const FRAMERATE: &str = "framerate";
    pub const CHAFA_ARGUMENTS: &str = "chafa_arguments";
    pub const CHROMA_ARG: &str = "chroma_arg";
    pub const SOUND_ARG: &str = "sound_arg";
    pub const SOUND_REQUESTED: &str = "sound_requested";
    pub const ORIGINAL_FULL_FILENAME: &str = "original_full_filename";
    pub const PLAYBACK_RATE: &str = "playback_rate";
    pub const ACTUAL_CHAFA_HEIGHT: &str = "actual_chafa_height";
    pub const SOUND_SAVED_PATH: &str = "sound_saved_path";
    pub const NUM_FRAMES: &str = "num_frames";
    pub const VIDEO_DURATION_CACHED: &str = "video_duration_cached";
}

/// Coarse identity of an input file used only for change detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputIdentity {
    /// Regular file with its size and modification time in whole seconds
    Present {
        path: PathBuf,
        size: u64,
        modified_secs: i64,
    },
    /// File does not exist or is not a regular file
    Missing { path: PathBuf },
    /// Metadata could not be read
    StatError { path: PathBuf },
}

impl InputIdentity {
    /// String form stored in the cache record and hashed into the key
    pub fn fingerprint(&self) -> String {
        match self {
            InputIdentity::Present {
                size,
                modified_secs,
                ..
            } => format!("s:{}_m:{}", size, modified_secs),
            InputIdentity::Missing { path } => {
                format!("file_not_found_or_not_regular_{}", path.display())
            }
            InputIdentity::StatError { path } => {
                format!("file_stat_error_or_missing_{}", path.display())
            }
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, InputIdentity::Present { .. })
    }
}

impl fmt::Display for InputIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}

/// What the user asked for regarding sound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SoundRequest {
    /// No audio track
    None,
    /// Extract the first audio stream of the input video
    Extract,
    /// Use an external audio file
    File(PathBuf),
}

impl SoundRequest {
    /// Build from the raw `--sound` flag value: absent, empty (extract) or a path
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            None => SoundRequest::None,
            Some(value) if value.trim().is_empty() => SoundRequest::Extract,
            Some(value) => SoundRequest::File(PathBuf::from(value)),
        }
    }

    pub fn is_requested(&self) -> bool {
        !matches!(self, SoundRequest::None)
    }

    /// Value stored under `sound_arg`
    pub fn arg(&self) -> String {
        match self {
            SoundRequest::File(path) => path.to_string_lossy().to_string(),
            SoundRequest::None | SoundRequest::Extract => String::new(),
        }
    }
}

/// Character-cell size handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeSpec {
    pub width: u32,
    pub height: u32,
}

impl SizeSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Every user-controlled knob that affects generated assets.
///
/// Built once per run and never mutated afterwards. Playback rate is
/// deliberately absent: it only affects playback, not the assets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    /// Absolute path of the input video
    pub input_path: PathBuf,
    /// Coarse identity of the input video
    pub identity: InputIdentity,
    /// Requested width in character cells
    pub width: u32,
    /// Requested height in character cells
    pub height: u32,
    /// Frames extracted per second of video
    pub framerate: u32,
    /// Extra renderer arguments, whitespace separated
    pub renderer_args: String,
    /// Chroma-key colour such as `0x00FF00`
    pub chroma: Option<String>,
    /// Sound handling
    pub sound: SoundRequest,
}

impl ParameterSet {
    /// Check every parameter, failing on the first invalid one
    pub fn validate(&self) -> AnifetchResult<()> {
        if self.width == 0 {
            return Err(AnifetchError::invalid("width", "must be positive"));
        }
        if self.height == 0 {
            return Err(AnifetchError::invalid("height", "must be positive"));
        }
        if self.framerate == 0 {
            return Err(AnifetchError::invalid("framerate", "must be positive"));
        }
        if let Some(chroma) = &self.chroma {
            validate_chroma(chroma)?;
        }
        Ok(())
    }

    /// File name of the input, used to scope the cache directory
    pub fn basename(&self) -> String {
        self.input_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.input_path.to_string_lossy().to_string())
    }

    /// Requested renderer size before height resolution
    pub fn requested_size(&self) -> SizeSpec {
        SizeSpec::new(self.width, self.height)
    }

    /// Decoder filter chain: framerate conversion then pixel format or chroma key
    pub fn filter_chain(&self) -> String {
        match &self.chroma {
            Some(chroma) => format!(
                "fps={},format=rgba,colorkey={}:similarity=0.01:blend=0",
                self.framerate, chroma
            ),
            None => format!("fps={},format=rgb24", self.framerate),
        }
    }

    /// Field map hashed into the cache key and compared on lookup
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(fields::FILENAME_BASENAME.to_string(), self.basename());
        map.insert(
            fields::VIDEO_FILE_IDENTITY.to_string(),
            self.identity.fingerprint(),
        );
        map.insert(fields::WIDTH.to_string(), self.width.to_string());
        map.insert(fields::HEIGHT_ARG.to_string(), self.height.to_string());
        map.insert(fields::FRAMERATE.to_string(), self.framerate.to_string());
        map.insert(
            fields::CHAFA_ARGUMENTS.to_string(),
            normalize_renderer_args(&self.renderer_args),
        );
        map.insert(
            fields::CHROMA_ARG.to_string(),
            self.chroma.as_deref().map(str::trim).unwrap_or_default().to_string(),
        );
        map.insert(fields::SOUND_ARG.to_string(), self.sound.arg());
        map.insert(
            fields::SOUND_REQUESTED.to_string(),
            self.sound.is_requested().to_string(),
        );
        map
    }
}

/// Renderer arguments are split on whitespace, so any run of whitespace
/// is one separator
pub fn normalize_renderer_args(args: &str) -> String {
    args.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Chroma keys are `0x`-prefixed hex colours
pub fn validate_chroma(chroma: &str) -> AnifetchResult<()> {
    let digits = chroma
        .strip_prefix("0x")
        .ok_or_else(|| AnifetchError::invalid("chroma", "hex colour needs a '0x' prefix (e.g. 0x00FF00)"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AnifetchError::invalid(
            "chroma",
            format!("'{}' is not a hex colour", chroma),
        ));
    }
    Ok(())
}

/// Deterministic key naming one parameter set's cache directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wrap an already computed key
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted description of a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheRecord {
    /// Parameter fields as stored (see [`ParameterSet::to_fields`])
    pub parameters: BTreeMap<String, String>,
    /// Full input path at the time of the run
    pub original_full_filename: String,
    /// Playback rate requested when the assets were built
    pub playback_rate: f64,
    /// Line count the renderer actually produces for this size
    pub resolved_height: u32,
    /// Audio artifact, if one was produced
    pub sound_saved_path: Option<PathBuf>,
    /// Number of text frames on disk
    pub num_frames: usize,
    /// Media duration in seconds, when known
    pub duration: Option<f64>,
}

impl CacheRecord {
    /// Describe a finished run
    pub fn from_run(
        params: &ParameterSet,
        playback_rate: f64,
        resolved_height: u32,
        sound_saved_path: Option<PathBuf>,
        num_frames: usize,
        duration: f64,
    ) -> Self {
        Self {
            parameters: params.to_fields(),
            original_full_filename: params.input_path.to_string_lossy().to_string(),
            playback_rate,
            resolved_height,
            sound_saved_path,
            num_frames,
            duration: Some(duration),
        }
    }

    /// Flatten into the on-disk `key=value` map
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.parameters.clone();
        map.insert(
            fields::ORIGINAL_FULL_FILENAME.to_string(),
            self.original_full_filename.clone(),
        );
        map.insert(
            fields::PLAYBACK_RATE.to_string(),
            format!("{:.6}", self.playback_rate),
        );
        map.insert(
            fields::ACTUAL_CHAFA_HEIGHT.to_string(),
            self.resolved_height.to_string(),
        );
        map.insert(
            fields::SOUND_SAVED_PATH.to_string(),
            self.sound_saved_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        map.insert(fields::NUM_FRAMES.to_string(), self.num_frames.to_string());
        if let Some(duration) = self.duration {
            map.insert(
                fields::VIDEO_DURATION_CACHED.to_string(),
                format!("{:.6}", duration),
            );
        }
        map
    }

    /// Rebuild from a loaded map, reporting the first missing or malformed
    /// derived field. Parameter fields are copied for `expected` keys only.
    pub fn from_map(
        map: &BTreeMap<String, String>,
        expected: &BTreeMap<String, String>,
    ) -> Result<Self, MissReason> {
        let parameters = expected
            .keys()
            .filter_map(|k| map.get(k).map(|v| (k.clone(), v.clone())))
            .collect();

        let resolved_height = parse_field::<i64>(map, fields::ACTUAL_CHAFA_HEIGHT)?;
        if resolved_height <= 0 {
            return Err(MissReason::InvalidHeight(resolved_height));
        }
        let num_frames = parse_field::<usize>(map, fields::NUM_FRAMES)?;

        let playback_rate = match map.get(fields::PLAYBACK_RATE) {
            Some(value) => value
                .parse::<f64>()
                .map_err(|_| MissReason::UnparsableField {
                    field: fields::PLAYBACK_RATE,
                    value: value.clone(),
                })?,
            None => 0.0,
        };
        let duration = match map.get(fields::VIDEO_DURATION_CACHED) {
            Some(value) => Some(value.parse::<f64>().map_err(|_| {
                MissReason::UnparsableField {
                    field: fields::VIDEO_DURATION_CACHED,
                    value: value.clone(),
                }
            })?),
            None => None,
        };
        let sound_saved_path = map
            .get(fields::SOUND_SAVED_PATH)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            parameters,
            original_full_filename: map
                .get(fields::ORIGINAL_FULL_FILENAME)
                .cloned()
                .unwrap_or_default(),
            playback_rate,
            resolved_height: resolved_height as u32,
            sound_saved_path,
            num_frames,
            duration,
        })
    }
}

fn parse_field<T: std::str::FromStr>(
    map: &BTreeMap<String, String>,
    field: &'static str,
) -> Result<T, MissReason> {
    let value = map.get(field).ok_or(MissReason::MissingField(field))?;
    value.parse::<T>().map_err(|_| MissReason::UnparsableField {
        field,
        value: value.clone(),
    })
}

/// Why a cache lookup did not produce a usable record
#[derive(Debug, Clone, PartialEq)]
pub enum MissReason {
    /// `--force-render` was given
    ForcedRender,
    /// No metadata file for this key
    NoRecord,
    /// A parameter field is absent or differs from the current value
    ParameterMismatch {
        field: String,
        current: String,
        cached: Option<String>,
    },
    /// A derived field is absent
    MissingField(&'static str),
    /// A derived field could not be parsed
    UnparsableField { field: &'static str, value: String },
    /// Stored output height is not positive
    InvalidHeight(i64),
    /// Text artifact directory is gone
    ArtifactDirMissing,
    /// Recorded frame count disagrees with the artifacts on disk
    FrameCountMismatch { recorded: usize, on_disk: usize },
    /// Record claims zero frames
    EmptyRecord,
    /// Recorded audio artifact no longer exists
    AudioMissing(PathBuf),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::ForcedRender => write!(f, "forced re-render"),
            MissReason::NoRecord => write!(f, "no cache record"),
            MissReason::ParameterMismatch {
                field,
                current,
                cached,
            } => write!(
                f,
                "parameter '{}' changed (current '{}', cached '{}')",
                field,
                current,
                cached.as_deref().unwrap_or("N/A")
            ),
            MissReason::MissingField(field) => write!(f, "field '{}' missing", field),
            MissReason::UnparsableField { field, value } => {
                write!(f, "field '{}' has unparsable value '{}'", field, value)
            }
            MissReason::InvalidHeight(height) => write!(f, "invalid output height {}", height),
            MissReason::ArtifactDirMissing => write!(f, "text artifact directory missing"),
            MissReason::FrameCountMismatch { recorded, on_disk } => write!(
                f,
                "frame count mismatch (recorded {}, on disk {})",
                recorded, on_disk
            ),
            MissReason::EmptyRecord => write!(f, "record holds zero frames"),
            MissReason::AudioMissing(path) => {
                write!(f, "audio artifact missing: {}", path.display())
            }
        }
    }
}

/// Contiguous time range of the input decoded by one extraction worker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Position in the plan, also the worker id
    pub index: usize,
    /// Start offset in seconds
    pub start: f64,
    /// Length in seconds
    pub duration: f64,
    /// Isolated directory the decoder writes into
    pub output_dir: PathBuf,
    /// Estimated global frame count of all earlier segments
    pub base_offset: usize,
    /// Estimated frame count of this segment
    pub estimated_frames: usize,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// One image waiting to be rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Global 1-based index
    pub index: usize,
    /// Image in the merged frame directory
    pub image_path: PathBuf,
}

impl Frame {
    pub fn new(index: usize, image_path: impl AsRef<Path>) -> Self {
        Self {
            index,
            image_path: image_path.as_ref().to_path_buf(),
        }
    }
}
