use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use shade_tracker::config::{DEFAULT_CODEC, DEFAULT_OUTPUT_NAME};
use shade_tracker::{AnnotationOptions, ConfigError, OutputSpec};
use std::path::PathBuf;

/// Detects colour blobs in a video, tracks them across frames and writes an
/// annotated copy next to the source.
///
/// Toggles take an optional value (`true`/`false`, case-insensitive); a bare flag
/// means `true`.
#[derive(Parser, Debug, Clone)]
#[command(name = "shade-tracker", version)]
pub struct Args {
    /// A path to your video source on which objects will be detected.
    #[arg(long, value_name = "PATH")]
    pub path_name: PathBuf,

    /// Write the coordinates of each detected object into every frame.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new(),
          default_value_t = false, num_args = 0..=1, default_missing_value = "true")]
    pub show_coordinates: bool,

    /// Outline each detected object in every frame.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new(),
          default_value_t = false, num_args = 0..=1, default_missing_value = "true")]
    pub show_contours: bool,

    /// Write counts of current and tracked objects into every frame.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new(),
          default_value_t = false, num_args = 0..=1, default_missing_value = "true")]
    pub show_info: bool,

    /// Draw the recent path followed by each object.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new(),
          default_value_t = false, num_args = 0..=1, default_missing_value = "true")]
    pub show_path: bool,

    /// Draw the whole path followed by each object since it was first detected.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new(),
          default_value_t = false, num_args = 0..=1, default_missing_value = "true")]
    pub show_whole_path: bool,

    /// Show every annotated frame in a window; press `q` to stop early.
    #[arg(long, action = ArgAction::Set, value_parser = BoolishValueParser::new(),
          default_value_t = false, num_args = 0..=1, default_missing_value = "true")]
    pub show_realtime: bool,

    /// File name of the output video, written into the source video's directory.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_OUTPUT_NAME)]
    pub save_as_video: String,

    /// Four-character code of the codec used for the output video.
    #[arg(long, value_name = "FOURCC", default_value = DEFAULT_CODEC)]
    pub save_as_codec: String,

    /// Forget an object after it goes unmatched for this many consecutive frames.
    /// Objects are kept forever when omitted.
    #[arg(long, value_name = "FRAMES")]
    pub max_unmatched_frames: Option<u32>,
}

impl Args {
    pub fn annotations(&self) -> AnnotationOptions {
        AnnotationOptions {
            show_coordinates: self.show_coordinates,
            show_contours: self.show_contours,
            show_info: self.show_info,
            show_path: self.show_path,
            show_whole_path: self.show_whole_path,
        }
    }

    pub fn output_spec(&self) -> Result<OutputSpec, ConfigError> {
        OutputSpec::new(&self.save_as_video, &self.save_as_codec)
    }
}
