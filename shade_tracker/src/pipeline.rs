// THEORY:
// The `pipeline` module is the top-level API of the tracker. It strings the per-frame
// stages together in their fixed order and owns the only state that survives between
// frames: the `Tracker`'s history.
//
//   raw frame -> shade_detector -> duplicate_filter -> collision_resolver
//             -> object_describer -> tracker (mutates history)
//             -> renderer (reads history, ages trails, marks stale)
//
// Everything runs synchronously on the caller's thread; each stage consumes the
// previous stage's complete output. No stage can fail: empty frames, empty contour
// lists and zero-area shapes all flow through as empty or sentinel values.

use crate::core_modules::collision_resolver;
use crate::core_modules::duplicate_filter;
use crate::core_modules::object_describer;
use crate::core_modules::renderer::Renderer;
use crate::core_modules::shade_detector::shade_detector;
use crate::core_modules::tracker::Tracker;
use image::RgbImage;

// Re-export key data structures for the public API.
pub use crate::config::{AnnotationOptions, PipelineConfig};
pub use crate::core_modules::object_describer::DetectedObject;
pub use crate::core_modules::renderer::Canvas;
pub use crate::core_modules::tracker::{ObjectKey, TrackedObject};

/// What happened to one frame on its way through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based index of the frame.
    pub frame_index: u64,
    /// Boundaries found across all shade bands.
    pub raw_contours: usize,
    /// Contours left after the noise floor and duplicate suppression.
    pub validated_contours: usize,
    /// Contours left after fused silhouettes were removed.
    pub resolved_contours: usize,
    /// Objects detected in this frame.
    pub current_objects: usize,
    /// Objects in the tracker's history after this frame.
    pub history_objects: usize,
}

/// The detection-and-tracking engine for one video stream.
pub struct TrackingPipeline {
    config: PipelineConfig,
    tracker: Tracker,
    renderer: Renderer,
    frames_processed: u64,
}

impl TrackingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let tracker = Tracker::new(config.frame_width, config.frame_height)
            .with_eviction(config.max_unmatched_frames);
        let renderer = Renderer::new(config.annotations);
        Self {
            config,
            tracker,
            renderer,
            frames_processed: 0,
        }
    }

    /// Runs detection and tracking on one frame.
    pub fn process_frame(&mut self, frame: &RgbImage) -> FrameReport {
        // Stage 1: Shade-Banded Detection
        let raw = shade_detector::detect(frame);
        let raw_contours = raw.len();

        // Stage 2: Noise Floor & Duplicate Suppression
        let validated = duplicate_filter::validate(raw);
        let validated_contours = validated.len();

        // Stage 3: Collision Resolution
        let resolved = collision_resolver::resolve(validated);
        let resolved_contours = resolved.len();

        // Stage 4: Description
        let detected = object_describer::describe(frame, resolved);

        // Stage 5: Tracking
        self.tracker.update(detected);

        let report = FrameReport {
            frame_index: self.frames_processed,
            raw_contours,
            validated_contours,
            resolved_contours,
            current_objects: self.tracker.current_objects_count(),
            history_objects: self.tracker.len(),
        };
        self.frames_processed += 1;

        log::debug!(
            "frame {}: {} raw, {} validated, {} resolved, {} tracked",
            report.frame_index,
            report.raw_contours,
            report.validated_contours,
            report.resolved_contours,
            report.history_objects
        );
        report
    }

    /// Draws the current tracker state and ages it for the next frame.
    pub fn render<C: Canvas>(&mut self, canvas: &mut C) {
        self.renderer.render(&mut self.tracker, canvas);
    }

    /// `process_frame` followed by `render`.
    pub fn process_and_render<C: Canvas>(&mut self, frame: &RgbImage, canvas: &mut C) -> FrameReport {
        let report = self.process_frame(frame);
        self.render(canvas);
        report
    }

    pub fn tracked_objects(&self) -> &[TrackedObject] {
        self.tracker.history()
    }

    pub fn current_objects_count(&self) -> usize {
        self.tracker.current_objects_count()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
