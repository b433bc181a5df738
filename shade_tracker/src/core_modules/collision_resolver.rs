// THEORY:
// When two objects touch, the band scan can return both the individual objects and
// their merged silhouette as separate contours. The `collision_resolver` finds the
// merged silhouettes and removes them, preferring the un-merged components.
//
// The test for a contour C:
// 1.  **Reach**: C's reach is the largest distance from its centroid to any of its
//     own boundary points.
// 2.  **Partners**: other contours A and B (distinct from C and from each other)
//     whose centroids lie within that reach.
// 3.  **Area Check**: C is a fused silhouette when `(area(A) + area(B)) * 0.9 < area(C)`.
//
// Search order is part of the behaviour. Candidates for A are scanned in list order;
// each A is paired only with the first B in list order that is also in reach, and
// the first such (A, B) pair passing the area check condemns C. There is no search
// for a best pair, so some fusions slip through and some real objects are dropped.
// Every contour is judged against the full input list, including contours that are
// themselves about to be dropped.

use crate::core_modules::measurement::MeasuredContour;

/// Fraction of the partners' combined area that must still fall short of C's area.
const FUSED_AREA_RATIO: f64 = 0.9;

/// Drops every contour judged to be the fused silhouette of two others.
pub fn resolve(contours: Vec<MeasuredContour>) -> Vec<MeasuredContour> {
    let fused: Vec<bool> = (0..contours.len())
        .map(|index| is_fused(&contours, index))
        .collect();

    contours
        .into_iter()
        .zip(fused)
        .filter_map(|(contour, fused)| (!fused).then_some(contour))
        .collect()
}

/// Whether `contours[index]` is the merged outline of two other contours in the list.
pub fn is_fused(contours: &[MeasuredContour], index: usize) -> bool {
    let Some(outer) = contours.get(index) else {
        return false;
    };
    let reach = outer.max_inner_distance();
    let in_reach = |other: usize| {
        other != index && contours[other].measurement.distance_to(&outer.measurement) <= reach
    };

    for first in (0..contours.len()).filter(|&i| in_reach(i)) {
        let Some(second) = (0..contours.len()).find(|&j| j != first && in_reach(j)) else {
            continue;
        };

        let combined = contours[first].measurement.area + contours[second].measurement.area;
        if combined * FUSED_AREA_RATIO < outer.measurement.area {
            log::trace!(
                "contour at {:?} is fused from {:?} and {:?}",
                outer.measurement.position(),
                contours[first].measurement.position(),
                contours[second].measurement.position()
            );
            return true;
        }
    }
    false
}
