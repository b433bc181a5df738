// THEORY:
// The band scan in `shade_detector` deliberately over-detects: one object shows up
// once for every band its intensity falls in, and tiny fragments of noise survive
// as small closed borders. The `duplicate_filter` reduces that raw list to one
// contour per physical object.
//
// Rules, applied in the detector's output order:
// 1.  **Noise Floor**: a contour enclosing less than `MIN_CONTOUR_AREA` is dropped.
// 2.  **Shade-Band Duplicates**: a candidate is a duplicate of an already accepted
//     contour when its area is within 10% of the accepted area AND its centroid x
//     or its centroid y is within 1% of the accepted one.
// 3.  **First Seen Wins**: the earliest contour is kept and later duplicates are
//     dropped. Accepted contours are held in an ordered `Vec`, never a hash set,
//     so the survivor is fully determined by the input order.
//
// The output is pairwise non-duplicate, which makes the filter idempotent.

use crate::core_modules::measurement::{Boundary, MeasuredContour, Measurement};

/// Contours enclosing less area than this are treated as noise.
pub const MIN_CONTOUR_AREA: f64 = 150.0;
/// Relative area window for two contours to count as the same object.
const AREA_TOLERANCE: f64 = 0.10;
/// Relative centroid window (per axis) for two contours to count as the same object.
const POSITION_TOLERANCE: f64 = 0.01;

/// Whether `candidate` is a shade-band duplicate of the already accepted contour.
pub fn is_duplicate(accepted: &Measurement, candidate: &Measurement) -> bool {
    if !within(accepted.area, candidate.area, AREA_TOLERANCE) {
        return false;
    }
    within(accepted.x as f64, candidate.x as f64, POSITION_TOLERANCE)
        || within(accepted.y as f64, candidate.y as f64, POSITION_TOLERANCE)
}

/// Open interval test `reference * (1 - tolerance) < value < reference * (1 + tolerance)`.
fn within(reference: f64, value: f64, tolerance: f64) -> bool {
    reference * (1.0 - tolerance) < value && value < reference * (1.0 + tolerance)
}

/// Measures raw boundaries, drops the ones under the noise floor and suppresses duplicates.
pub fn validate(boundaries: Vec<Boundary>) -> Vec<MeasuredContour> {
    let measured: Vec<MeasuredContour> = boundaries
        .into_iter()
        .map(MeasuredContour::new)
        .filter(|contour| contour.measurement.area >= MIN_CONTOUR_AREA)
        .collect();
    suppress_duplicates(measured)
}

/// Keeps the first contour of every duplicate group, preserving input order.
pub fn suppress_duplicates(candidates: Vec<MeasuredContour>) -> Vec<MeasuredContour> {
    let mut accepted: Vec<MeasuredContour> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let already_in = accepted
            .iter()
            .any(|kept| is_duplicate(&kept.measurement, &candidate.measurement));
        if !already_in {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::point::Point;

    fn contour(x: i32, y: i32, area: f64) -> MeasuredContour {
        MeasuredContour {
            boundary: Vec::new(),
            measurement: Measurement { x, y, area },
        }
    }

    fn rectangle(x: i32, y: i32, w: i32, h: i32) -> Boundary {
        vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    }

    #[test]
    fn near_identical_contours_collapse_to_the_first() {
        let first = contour(100, 100, 1000.0);
        let second = contour(100, 100, 1050.0);
        let kept = suppress_duplicates(vec![first.clone(), second]);
        assert_eq!(kept, vec![first]);
    }

    #[test]
    fn different_sizes_at_the_same_place_both_survive() {
        let kept = suppress_duplicates(vec![contour(100, 100, 1000.0), contour(100, 100, 2000.0)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn one_matching_axis_is_enough() {
        // Same row, far apart horizontally.
        assert!(is_duplicate(
            &Measurement { x: 10, y: 300, area: 500.0 },
            &Measurement { x: 400, y: 300, area: 510.0 }
        ));
        // Neither axis within 1%.
        assert!(!is_duplicate(
            &Measurement { x: 10, y: 300, area: 500.0 },
            &Measurement { x: 400, y: 200, area: 510.0 }
        ));
    }

    #[test]
    fn candidates_outside_the_windows_are_distinct() {
        let accepted = Measurement { x: 100, y: 100, area: 1000.0 };
        assert!(!is_duplicate(&accepted, &Measurement { x: 100, y: 100, area: 1101.0 }));
        assert!(!is_duplicate(&accepted, &Measurement { x: 100, y: 100, area: 899.0 }));
        assert!(!is_duplicate(&accepted, &Measurement { x: 102, y: 102, area: 1000.0 }));
        assert!(is_duplicate(&accepted, &Measurement { x: 100, y: 50, area: 1099.0 }));
    }

    #[test]
    fn noise_floor_drops_small_contours_even_when_unique() {
        let kept = validate(vec![
            rectangle(0, 0, 10, 14),   // area 140
            rectangle(50, 50, 10, 15), // area 150
            rectangle(120, 5, 30, 30), // area 900
        ]);
        let areas: Vec<f64> = kept.iter().map(|c| c.measurement.area).collect();
        assert_eq!(areas, vec![150.0, 900.0]);
    }

    #[test]
    fn degenerate_boundaries_never_survive() {
        let line = vec![Point::new(0, 0), Point::new(40, 0)];
        assert!(validate(vec![line, Vec::new()]).is_empty());
    }

    #[test]
    fn filtering_its_own_output_is_a_no_op() {
        let input = vec![
            rectangle(10, 10, 40, 40),
            rectangle(10, 10, 40, 41),
            rectangle(200, 10, 20, 20),
            rectangle(300, 300, 60, 20),
            rectangle(300, 300, 60, 21),
            rectangle(12, 180, 40, 40),
        ];
        let once = validate(input);
        let twice = suppress_duplicates(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(validate(Vec::new()).is_empty());
    }
}
