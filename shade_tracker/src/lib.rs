// THEORY:
// This file is the main entry point for the `shade_tracker` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `shade-tracker` video
// driver).
//
// The primary goal is to export the `TrackingPipeline` and its associated data
// structures (`PipelineConfig`, `FrameReport`, `Canvas`, etc.) as the high-level
// interface for the whole engine. The individual stages live in `core_modules` and
// stay usable on their own, which is how they are tested.
//
// The library never touches video files or windows, and it never installs a logger:
// it logs through the `log` facade and leaves the choice of backend to the binary.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use config::{AnnotationOptions, FourCc, OutputSpec, PipelineConfig};
pub use error::ConfigError;
pub use pipeline::{FrameReport, TrackingPipeline};
