// THEORY:
// Configuration is decided once, before the first frame, and is read-only from then
// on. The driver builds these values from the command line and hands them to the
// pipeline by reference; nothing in the per-frame path mutates them.

use crate::error::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_OUTPUT_NAME: &str = "output.mp4";
pub const DEFAULT_CODEC: &str = "mp4v";

/// Which annotations are drawn onto each output frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotationOptions {
    /// Write each matched object's centroid as `"x, y"`.
    pub show_coordinates: bool,
    /// Outline each matched object's boundary.
    pub show_contours: bool,
    /// Draw colour swatches and the current/history object counts.
    pub show_info: bool,
    /// Draw each object's trail, trimmed to its most recent points.
    pub show_path: bool,
    /// Draw each object's trail without trimming or decay.
    pub show_whole_path: bool,
}

impl AnnotationOptions {
    pub fn draws_trails(&self) -> bool {
        self.show_path || self.show_whole_path
    }
}

/// A four-character video codec code such as `mp4v` or `MJPG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc([u8; 4]);

impl FourCc {
    pub fn chars(&self) -> [char; 4] {
        self.0.map(char::from)
    }
}

impl FromStr for FourCc {
    type Err = ConfigError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 4] = code
            .as_bytes()
            .try_into()
            .map_err(|_| ConfigError::InvalidCodec(code.to_string()))?;
        if !bytes.iter().all(|b| b.is_ascii_graphic()) {
            return Err(ConfigError::InvalidCodec(code.to_string()));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars().iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// Where and how the annotated video is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    pub file_name: String,
    pub codec: FourCc,
}

impl OutputSpec {
    pub fn new(file_name: &str, codec: &str) -> Result<Self, ConfigError> {
        let is_plain_name = !file_name.is_empty()
            && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name);
        if !is_plain_name {
            return Err(ConfigError::InvalidOutputName(file_name.to_string()));
        }
        Ok(Self {
            file_name: file_name.to_string(),
            codec: codec.parse()?,
        })
    }

    /// The output file sits in the same directory as `input`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        input.with_file_name(&self.file_name)
    }
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_OUTPUT_NAME.to_string(),
            codec: FourCc(*b"mp4v"),
        }
    }
}

/// Configuration for the `TrackingPipeline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    pub annotations: AnnotationOptions,
    /// Evict a track after this many consecutive unmatched frames. `None` never evicts.
    pub max_unmatched_frames: Option<u32>,
}

impl PipelineConfig {
    pub fn new(
        frame_width: u32,
        frame_height: u32,
        annotations: AnnotationOptions,
    ) -> Result<Self, ConfigError> {
        if frame_width == 0 || frame_height == 0 {
            return Err(ConfigError::EmptyFrame {
                width: frame_width,
                height: frame_height,
            });
        }
        Ok(Self {
            frame_width,
            frame_height,
            annotations,
            max_unmatched_frames: None,
        })
    }

    pub fn with_eviction(mut self, max_unmatched_frames: Option<u32>) -> Self {
        self.max_unmatched_frames = max_unmatched_frames;
        self
    }
}
