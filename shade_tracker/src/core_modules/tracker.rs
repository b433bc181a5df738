// THEORY:
// The `tracker` gives the system object permanence. It takes the stateless list of
// `DetectedObject`s from one frame and associates each of them with the objects it
// has been tracking across earlier frames.
//
// Key architectural principles:
// 1.  **Object Persistence**: A `TrackedObject` is an object's existence *over
//     time*, distinct from a `DetectedObject`, which is a snapshot in one frame. It
//     carries the latest snapshot plus a trail of past centroids and a `stale` flag.
// 2.  **Tolerance Windows**: A detection D matches a tracked object H when all of
//     these hold (every bound is exclusive):
//     - |D.x - H.x| < 10% of the frame width,
//     - |D.y - H.y| < 10% of the frame height,
//     - D.area / 10 < H.area < D.area * 10,
//     - every colour channel of H is within 50 of D's.
//     The windows are loose on purpose; fewer false splits are worth more here than
//     precise re-identification.
// 3.  **First Match Wins**: History is an insertion-ordered `Vec` and each detection
//     takes the first tracked object that matches. There is no best-match or global
//     assignment, and objects born earlier in the same frame are candidates too.
// 4.  **Lifecycle Management**:
//     - **Birth**: an unmatched detection becomes a new `TrackedObject` keyed
//       `obj_<N>`, its trail seeded with its first position.
//     - **Tracking**: a match overwrites the snapshot, appends the new position to
//       the trail and clears `stale`.
//     - **Retention**: by default nothing is ever removed, so history size never
//       decreases. Eviction after N consecutive unmatched frames is opt-in.

use crate::core_modules::object_describer::DetectedObject;
use image::Rgb;
use std::fmt;

/// Spatial window as a fraction of the frame dimension.
const SPATIAL_TOLERANCE: f64 = 0.1;
/// Allowed area ratio in either direction.
const AREA_RATIO: f64 = 10.0;
/// Allowed absolute difference per colour channel.
const COLOR_TOLERANCE: i32 = 50;

/// Stable identity of a tracked object, displayed as `obj_<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(pub u64);

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj_{}", self.0)
    }
}

/// An object that is being tracked across multiple frames.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    /// Assigned once at birth and never changed.
    pub key: ObjectKey,
    /// The most recent detection, overwritten on every match.
    pub latest: DetectedObject,
    /// Past centroids, oldest first.
    pub trail: Vec<(i32, i32)>,
    /// True once a render pass has seen this object; cleared again on the next match.
    pub stale: bool,
    /// Consecutive frames without a match.
    pub unmatched_frames: u32,
}

impl TrackedObject {
    fn new(key: ObjectKey, detected: DetectedObject) -> Self {
        Self {
            key,
            trail: vec![detected.position],
            latest: detected,
            stale: false,
            unmatched_frames: 0,
        }
    }

    /// Folds a matching detection into this track.
    fn update(&mut self, detected: DetectedObject) {
        self.latest = detected;
        self.trail.push(self.latest.position);
        self.stale = false;
        self.unmatched_frames = 0;
    }

    pub fn position(&self) -> (i32, i32) {
        self.latest.position
    }

    pub fn color(&self) -> Rgb<u8> {
        self.latest.color
    }

    pub fn area(&self) -> f64 {
        self.latest.area
    }
}

/// Owns the history of tracked objects and matches each frame's detections against it.
#[derive(Debug, Clone)]
pub struct Tracker {
    frame_width: u32,
    frame_height: u32,
    /// Insertion-ordered history.
    history: Vec<TrackedObject>,
    /// Next key number. Equals the history size while eviction is disabled.
    next_id: u64,
    current_objects_count: usize,
    max_unmatched_frames: Option<u32>,
}

impl Tracker {
    /// A tracker for frames of the given size that never forgets an object.
    pub fn new(frame_width: u32, frame_height: u32) -> Self {
        Self {
            frame_width,
            frame_height,
            history: Vec::new(),
            next_id: 0,
            current_objects_count: 0,
            max_unmatched_frames: None,
        }
    }

    /// Enables eviction of objects left unmatched for more than `max_unmatched_frames`
    /// consecutive frames. `None` keeps every object forever.
    pub fn with_eviction(mut self, max_unmatched_frames: Option<u32>) -> Self {
        self.max_unmatched_frames = max_unmatched_frames;
        self
    }

    /// Associates this frame's detections with the history and returns the updated history.
    pub fn update(&mut self, detected: Vec<DetectedObject>) -> &[TrackedObject] {
        self.current_objects_count = detected.len();

        for tracked in &mut self.history {
            tracked.unmatched_frames = tracked.unmatched_frames.saturating_add(1);
        }

        let mut created = 0usize;
        for detection in detected {
            match self.history.iter().position(|h| self.matches(&detection, h)) {
                Some(index) => self.history[index].update(detection),
                None => {
                    let key = ObjectKey(self.next_id);
                    self.next_id += 1;
                    log::trace!("new track {} at {:?}", key, detection.position);
                    self.history.push(TrackedObject::new(key, detection));
                    created += 1;
                }
            }
        }

        if let Some(limit) = self.max_unmatched_frames {
            let before = self.history.len();
            self.history.retain(|tracked| tracked.unmatched_frames <= limit);
            let evicted = before - self.history.len();
            if evicted > 0 {
                log::debug!("evicted {} tracks unmatched for over {} frames", evicted, limit);
            }
        }

        log::debug!(
            "tracker: {} detections, {} new tracks, {} in history",
            self.current_objects_count,
            created,
            self.history.len()
        );
        &self.history
    }

    /// Whether `detection` falls inside every tolerance window of `tracked`.
    pub fn matches(&self, detection: &DetectedObject, tracked: &TrackedObject) -> bool {
        let (dx, dy) = detection.position;
        let (hx, hy) = tracked.position();
        let x_window = self.frame_width as f64 * SPATIAL_TOLERANCE;
        let y_window = self.frame_height as f64 * SPATIAL_TOLERANCE;

        let close_x = dx as f64 - x_window < hx as f64 && (hx as f64) < dx as f64 + x_window;
        let close_y = dy as f64 - y_window < hy as f64 && (hy as f64) < dy as f64 + y_window;
        let similar_area = detection.area / AREA_RATIO < tracked.area()
            && tracked.area() < detection.area * AREA_RATIO;
        let similar_color = detection
            .color
            .0
            .iter()
            .zip(tracked.color().0.iter())
            .all(|(&d, &h)| (h as i32 - d as i32).abs() < COLOR_TOLERANCE);

        close_x && close_y && similar_area && similar_color
    }

    /// Number of detections handed to the last `update`.
    pub fn current_objects_count(&self) -> usize {
        self.current_objects_count
    }

    pub fn history(&self) -> &[TrackedObject] {
        &self.history
    }

    /// Mutable view for the renderer, which prunes trails and marks objects stale.
    pub fn history_mut(&mut self) -> &mut [TrackedObject] {
        &mut self.history
    }

    pub fn get(&self, key: ObjectKey) -> Option<&TrackedObject> {
        self.history.iter().find(|tracked| tracked.key == key)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
