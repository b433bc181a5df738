// THEORY:
// The `renderer` decides what is drawn for each tracked object and when, and it owns
// the trail-ageing policy. It does not rasterize anything itself: every primitive
// goes through the `Canvas` trait, which the video driver implements on top of its
// drawing backend (and which tests implement by recording calls).
//
// Per object, in history order:
// 1.  **Trail**: segments between consecutive trail points when either path mode is
//     on. Drawn before the trail is pruned.
// 2.  **Outline & Coordinates**: only for objects that are not `stale`.
// 3.  **Info Swatch**: a dot in the object's colour at a slot keyed by history index,
//     with a tick underneath (red when stale, blue when fresh).
// 4.  **Trail Ageing**: unless whole-path mode is on, the trail is cut to its last
//     50 points, and a stale object loses its oldest point as well.
// 5.  **Mark Stale**: every object leaves the pass with `stale = true`; the tracker
//     clears it again when the object is matched on the next frame. Because the flag
//     is set here and read here, what is drawn and how trails decay reflect whether
//     the object was matched since the previous pass.
//
// Once per frame, with info on, the current and historical object counts are written
// in the top-left corner.

use crate::config::AnnotationOptions;
use crate::core_modules::tracker::Tracker;
use image::Rgb;
use imageproc::point::Point;

/// Trail points kept per object unless the whole path is shown.
pub const TRAIL_LENGTH: usize = 50;

pub const OUTLINE_COLOR: Rgb<u8> = Rgb([74, 237, 17]);
pub const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const STALE_MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const FRESH_MARKER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

const TRAIL_THICKNESS: i32 = 3;
const OUTLINE_THICKNESS: i32 = 3;
const MARKER_THICKNESS: i32 = 2;
const SWATCH_RADIUS: i32 = 5;
const SWATCH_SPACING: i32 = 15;

/// Drawing primitives the renderer needs. Coordinates are pixels, colours are RGB.
pub trait Canvas {
    fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb<u8>, thickness: i32);
    fn outline(&mut self, boundary: &[Point<i32>], color: Rgb<u8>, thickness: i32);
    fn text(&mut self, text: &str, origin: (i32, i32), color: Rgb<u8>);
    fn filled_circle(&mut self, center: (i32, i32), radius: i32, color: Rgb<u8>);
}

/// Applies the annotation options to one frame's worth of tracker state.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    options: AnnotationOptions,
}

impl Renderer {
    pub fn new(options: AnnotationOptions) -> Self {
        Self { options }
    }

    /// Draws every tracked object, ages the trails and marks all objects stale.
    pub fn render<C: Canvas>(&self, tracker: &mut Tracker, canvas: &mut C) {
        let current_count = tracker.current_objects_count();
        let history_count = tracker.len();

        for (slot, tracked) in tracker.history_mut().iter_mut().enumerate() {
            let color = tracked.color();

            // --- 1. Trail ---
            if self.options.draws_trails() {
                for segment in tracked.trail.windows(2) {
                    canvas.line(segment[1], segment[0], color, TRAIL_THICKNESS);
                }
            }

            // --- 2. Outline & Coordinates ---
            if self.options.show_contours && !tracked.stale {
                canvas.outline(&tracked.latest.boundary, OUTLINE_COLOR, OUTLINE_THICKNESS);
            }
            if self.options.show_coordinates && !tracked.stale {
                canvas.text(&tracked.latest.position_label(), tracked.position(), LABEL_COLOR);
            }

            // --- 3. Info Swatch ---
            let slot_x = SWATCH_SPACING * (slot as i32 + 1);
            if self.options.show_info {
                canvas.filled_circle((slot_x, 65), SWATCH_RADIUS, color);
            }
            let marker_color = if tracked.stale {
                STALE_MARKER_COLOR
            } else {
                FRESH_MARKER_COLOR
            };

            // --- 4. Trail Ageing ---
            if !self.options.show_whole_path {
                age_trail(&mut tracked.trail, tracked.stale);
            }

            if self.options.show_info {
                canvas.line(
                    (slot_x - SWATCH_RADIUS, 75),
                    (slot_x + SWATCH_RADIUS, 80),
                    marker_color,
                    MARKER_THICKNESS,
                );
            }

            // --- 5. Mark Stale ---
            tracked.stale = true;
        }

        if self.options.show_info {
            canvas.text(
                &format!("Num of current objects: {current_count}"),
                (10, 25),
                OUTLINE_COLOR,
            );
            canvas.text(
                &format!("Num of history objects: {history_count}"),
                (10, 50),
                OUTLINE_COLOR,
            );
        }
    }
}

/// Keeps the newest `TRAIL_LENGTH` points, then drops one more from the front when stale.
pub fn age_trail(trail: &mut Vec<(i32, i32)>, stale: bool) {
    if trail.len() > TRAIL_LENGTH {
        trail.drain(..trail.len() - TRAIL_LENGTH);
    }
    if stale && !trail.is_empty() {
        trail.remove(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::object_describer::DetectedObject;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Line((i32, i32), (i32, i32), Rgb<u8>),
        Outline(usize),
        Text(String, (i32, i32)),
        Circle((i32, i32), Rgb<u8>),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        calls: Vec<Call>,
    }

    impl Canvas for RecordingCanvas {
        fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb<u8>, _: i32) {
            self.calls.push(Call::Line(from, to, color));
        }
        fn outline(&mut self, boundary: &[Point<i32>], _: Rgb<u8>, _: i32) {
            self.calls.push(Call::Outline(boundary.len()));
        }
        fn text(&mut self, text: &str, origin: (i32, i32), _: Rgb<u8>) {
            self.calls.push(Call::Text(text.to_string(), origin));
        }
        fn filled_circle(&mut self, center: (i32, i32), _: i32, color: Rgb<u8>) {
            self.calls.push(Call::Circle(center, color));
        }
    }

    fn detection(x: i32, y: i32) -> DetectedObject {
        DetectedObject {
            position: (x, y),
            color: Rgb([10, 20, 30]),
            boundary: vec![Point::new(x - 5, y - 5), Point::new(x + 5, y + 5)],
            area: 400.0,
        }
    }

    fn all_options() -> AnnotationOptions {
        AnnotationOptions {
            show_coordinates: true,
            show_contours: true,
            show_info: true,
            show_path: true,
            show_whole_path: false,
        }
    }

    #[test]
    fn fresh_object_gets_every_annotation() {
        let mut tracker = Tracker::new(640, 480);
        tracker.update(vec![detection(100, 100)]);
        tracker.update(vec![detection(102, 101)]);

        let mut canvas = RecordingCanvas::default();
        Renderer::new(all_options()).render(&mut tracker, &mut canvas);

        assert_eq!(
            canvas.calls,
            vec![
                Call::Line((102, 101), (100, 100), Rgb([10, 20, 30])),
                Call::Outline(2),
                Call::Text("102, 101".to_string(), (102, 101)),
                Call::Circle((15, 65), Rgb([10, 20, 30])),
                Call::Line((10, 75), (20, 80), FRESH_MARKER_COLOR),
                Call::Text("Num of current objects: 1".to_string(), (10, 25)),
                Call::Text("Num of history objects: 1".to_string(), (10, 50)),
            ]
        );
        assert!(tracker.history()[0].stale);
        assert_eq!(tracker.history()[0].trail.len(), 2);
    }

    #[test]
    fn stale_object_keeps_its_trail_but_loses_outline_and_label() {
        let mut tracker = Tracker::new(640, 480);
        tracker.update(vec![detection(100, 100)]);
        tracker.update(vec![detection(101, 100)]);
        let renderer = Renderer::new(all_options());
        renderer.render(&mut tracker, &mut RecordingCanvas::default());

        // Not seen this frame.
        tracker.update(Vec::new());
        let mut canvas = RecordingCanvas::default();
        renderer.render(&mut tracker, &mut canvas);

        assert!(canvas.calls.contains(&Call::Line((101, 100), (100, 100), Rgb([10, 20, 30]))));
        assert!(!canvas.calls.iter().any(|c| matches!(c, Call::Outline(_))));
        assert!(canvas.calls.contains(&Call::Line((10, 75), (20, 80), STALE_MARKER_COLOR)));
        assert!(canvas.calls.contains(&Call::Text("Num of current objects: 0".to_string(), (10, 25))));
        // Stale decay removed the oldest point.
        assert_eq!(tracker.history()[0].trail, vec![(101, 100)]);
    }

    #[test]
    fn nothing_is_drawn_with_everything_off() {
        let mut tracker = Tracker::new(640, 480);
        tracker.update(vec![detection(100, 100)]);
        let mut canvas = RecordingCanvas::default();
        Renderer::new(AnnotationOptions::default()).render(&mut tracker, &mut canvas);
        assert!(canvas.calls.is_empty());
        assert!(tracker.history()[0].stale);
    }

    #[test]
    fn swatches_are_keyed_by_history_slot() {
        let mut tracker = Tracker::new(640, 480);
        tracker.update(vec![detection(50, 50), detection(400, 400), detection(50, 400)]);
        let mut canvas = RecordingCanvas::default();
        let options = AnnotationOptions {
            show_info: true,
            ..AnnotationOptions::default()
        };
        Renderer::new(options).render(&mut tracker, &mut canvas);

        let centers: Vec<(i32, i32)> = canvas
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Circle(center, _) => Some(*center),
                _ => None,
            })
            .collect();
        assert_eq!(centers, vec![(15, 65), (30, 65), (45, 65)]);
    }

    #[test]
    fn trail_is_capped_unless_whole_path_is_shown() {
        let mut capped: Vec<(i32, i32)> = (0..80).map(|i| (i, 0)).collect();
        age_trail(&mut capped, false);
        assert_eq!(capped.len(), TRAIL_LENGTH);
        assert_eq!(capped[0], (30, 0));

        let mut tracker = Tracker::new(640, 480);
        for i in 0..80 {
            tracker.update(vec![detection(100 + i % 2, 100)]);
        }
        let options = AnnotationOptions {
            show_whole_path: true,
            ..AnnotationOptions::default()
        };
        Renderer::new(options).render(&mut tracker, &mut RecordingCanvas::default());
        assert_eq!(tracker.history()[0].trail.len(), 80);
    }

    #[test]
    fn stale_trail_decays_one_point_per_pass_until_empty() {
        let mut trail = vec![(1, 1), (2, 2)];
        age_trail(&mut trail, true);
        assert_eq!(trail, vec![(2, 2)]);
        age_trail(&mut trail, true);
        assert!(trail.is_empty());
        age_trail(&mut trail, true);
        assert!(trail.is_empty());
    }
}
