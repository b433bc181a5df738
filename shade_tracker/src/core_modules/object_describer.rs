// THEORY:
// The `object_describer` is the last stateless stage of a frame. It turns each
// surviving contour into a `DetectedObject`: a "dumb" data container holding the
// centroid, a colour sample taken at the centroid, the boundary and the area.
//
// A `DetectedObject` is a single-frame snapshot. It has no identity and no memory
// of earlier frames; the `tracker` either folds it into an existing track or
// starts a new one with it, and it is never kept on its own.

use crate::core_modules::measurement::{Boundary, MeasuredContour};
use image::{Rgb, RgbImage};

/// One object found in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    /// Integer centroid of the boundary.
    pub position: (i32, i32),
    /// Frame colour at the centroid.
    pub color: Rgb<u8>,
    /// The compressed contour outlining the object.
    pub boundary: Boundary,
    /// Zeroth moment of the boundary.
    pub area: f64,
}

impl DetectedObject {
    /// The `"x, y"` text drawn next to an object when coordinates are shown.
    pub fn position_label(&self) -> String {
        format!("{}, {}", self.position.0, self.position.1)
    }
}

/// Builds one `DetectedObject` per contour, preserving order.
pub fn describe(frame: &RgbImage, contours: Vec<MeasuredContour>) -> Vec<DetectedObject> {
    contours
        .into_iter()
        .map(|contour| {
            let position = contour.measurement.position();
            DetectedObject {
                position,
                color: sample_color(frame, position),
                boundary: contour.boundary,
                area: contour.measurement.area,
            }
        })
        .collect()
}

/// Reads the pixel at `position`, clamped onto the frame.
fn sample_color(frame: &RgbImage, (x, y): (i32, i32)) -> Rgb<u8> {
    if frame.width() == 0 || frame.height() == 0 {
        return Rgb([0, 0, 0]);
    }
    let x = x.clamp(0, frame.width() as i32 - 1) as u32;
    let y = y.clamp(0, frame.height() as i32 - 1) as u32;
    *frame.get_pixel(x, y)
}
