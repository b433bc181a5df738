// THEORY:
// The `measurement` module is the geometric foundation of the whole tracker. Every
// later stage (duplicate suppression, collision resolution, description, tracking)
// reasons about a contour through just three numbers: the integer centroid and the
// enclosed area. This module is the single place those numbers are produced.
//
// Key architectural principles:
// 1.  **Polygon Moments**: A boundary is treated as a closed polygon. The zeroth
//     moment (area) and the first-order moments are accumulated with Green's theorem
//     over consecutive vertex pairs, so the result is independent of how densely the
//     boundary is sampled and of its winding direction.
// 2.  **Sentinel, Not Failure**: A polygon that encloses no area has no centroid. The
//     measurement reports `(-1, -1)` with an area of zero instead of failing, and
//     callers check `is_degenerate` before trusting the position.
// 3.  **Truncating Centroid**: The centroid is truncated toward zero to integer pixel
//     coordinates, which keeps every sampled position inside the frame.

use imageproc::point::Point;

/// An ordered, closed chain of integer pixel coordinates outlining one shape.
pub type Boundary = Vec<Point<i32>>;

/// Cross products smaller than this are treated as an empty polygon.
const AREA_EPSILON: f64 = f32::EPSILON as f64;

/// The centroid and area of a single boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub x: i32,
    pub y: i32,
    pub area: f64,
}

impl Measurement {
    /// The value returned for shapes that enclose no area.
    pub const DEGENERATE: Measurement = Measurement {
        x: -1,
        y: -1,
        area: 0.0,
    };

    /// True when the shape had no area and the position is the `(-1, -1)` sentinel.
    pub fn is_degenerate(&self) -> bool {
        self.area == 0.0
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Euclidean distance between this centroid and another one.
    pub fn distance_to(&self, other: &Measurement) -> f64 {
        distance((self.x, self.y), (other.x, other.y))
    }
}

/// A boundary paired with its measurement, so later stages never re-integrate it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredContour {
    pub boundary: Boundary,
    pub measurement: Measurement,
}

impl MeasuredContour {
    pub fn new(boundary: Boundary) -> Self {
        let measurement = measure(&boundary);
        Self {
            boundary,
            measurement,
        }
    }

    /// Largest distance from the centroid to any boundary point; zero for an empty boundary.
    pub fn max_inner_distance(&self) -> f64 {
        let center = self.measurement.position();
        self.boundary
            .iter()
            .map(|point| distance((point.x, point.y), center))
            .fold(0.0, f64::max)
    }
}

/// Computes the centroid and area of `boundary` from its polygon moments.
pub fn measure(boundary: &[Point<i32>]) -> Measurement {
    let Some(last) = boundary.last() else {
        return Measurement::DEGENERATE;
    };

    let mut a00 = 0.0_f64;
    let mut a10 = 0.0_f64;
    let mut a01 = 0.0_f64;

    let (mut prev_x, mut prev_y) = (last.x as f64, last.y as f64);
    for point in boundary {
        let (x, y) = (point.x as f64, point.y as f64);
        let cross = prev_x * y - x * prev_y;
        a00 += cross;
        a10 += cross * (prev_x + x);
        a01 += cross * (prev_y + y);
        prev_x = x;
        prev_y = y;
    }

    if a00.abs() <= AREA_EPSILON {
        return Measurement::DEGENERATE;
    }

    // a00 is twice the signed area; the sign cancels in the centroid ratio.
    let area = a00.abs() / 2.0;
    Measurement {
        x: (a10 / (3.0 * a00)) as i32,
        y: (a01 / (3.0 * a00)) as i32,
        area,
    }
}

/// Euclidean distance between two integer points.
pub fn distance(a: (i32, i32), b: (i32, i32)) -> f64 {
    let dx = (a.0 - b.0) as f64;
    let dy = (a.1 - b.1) as f64;
    dx.hypot(dy)
}
