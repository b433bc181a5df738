// THEORY:
// The `ShadeDetector` is the entry point of the per-frame pipeline. It turns a raw
// colour frame into a flat list of candidate boundaries, one per connected region
// found in any of a fixed series of grayscale intensity bands.
//
// Why bands instead of a single threshold? Objects in the scene are told apart by
// colour, and after grayscale conversion each colour lands in its own intensity
// range. Scanning the frame band by band isolates those ranges, so two touching
// objects of different colours still come out as two regions in at least one band.
// The price is that the same object is usually found in several bands; that is
// expected here and cleaned up by the `duplicate_filter` stage.
//
// Algorithm steps:
// 1.  **Grayscale**: Rec. 601 luminance in 14-bit fixed point, rounded to the nearest
//     byte. Band edges are exact gray values, so the integer form is used.
// 2.  **Denoise**: grayscale opening then closing with a 3x3 square element. The
//     opening removes speckles, the closing seals hairline gaps inside objects.
// 3.  **Band Scan**: for `min_shade` = 3, 53, 103, ... (< 300) keep the pixels whose
//     value lies in `[min_shade - 15, min_shade * 50 + 65]`. When `min_shade - 15`
//     would be negative the band starts at `min_shade` instead. The range mask is
//     already binary, so thresholding it at `min_shade` keeps every masked pixel.
// 4.  **Border Following**: every border of every foreground region (outer borders
//     and hole borders alike) is traced, then straight runs of the chain are
//     collapsed to their end points.
// 5.  **Stateless Utility**: like the other detection stages, the detector has no
//     memory of previous frames.

pub mod shade_detector {
    use crate::core_modules::measurement::Boundary;
    use image::{GrayImage, ImageBuffer, Luma, RgbImage};
    use imageproc::contours::find_contours;
    use imageproc::morphology::{Mask, grayscale_close, grayscale_open};
    use imageproc::point::Point;

    /// First band threshold.
    const FIRST_SHADE: u32 = 3;
    /// Band thresholds stay strictly below this value.
    const SHADE_LIMIT: u32 = 300;
    /// Distance between consecutive band thresholds.
    const SHADE_STEP: u32 = 50;
    /// How far a band reaches past its nominal limits.
    const SHADE_OVERLAP: u32 = 15;

    /// Rec. 601 weights scaled by 2^14; they sum to exactly 2^14.
    const GRAY_R: u32 = 4899;
    const GRAY_G: u32 = 9617;
    const GRAY_B: u32 = 1868;
    const GRAY_SHIFT: u32 = 14;

    /// One intensity band of the scan.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShadeBand {
        /// Nominal shade of the band.
        pub min_shade: u32,
        /// Inclusive lower bound of the kept range.
        pub lower: u32,
        /// Inclusive upper bound of the kept range.
        pub upper: u32,
    }

    impl ShadeBand {
        pub fn new(min_shade: u32) -> Self {
            Self {
                min_shade,
                lower: min_shade.checked_sub(SHADE_OVERLAP).unwrap_or(min_shade),
                upper: min_shade * SHADE_STEP + SHADE_STEP + SHADE_OVERLAP,
            }
        }

        /// Whether a denoised gray value falls inside the band.
        pub fn keeps(&self, value: u8) -> bool {
            (self.lower..=self.upper).contains(&(value as u32))
        }
    }

    /// The fixed sequence of bands scanned on every frame.
    pub fn shade_bands() -> impl Iterator<Item = ShadeBand> {
        (FIRST_SHADE..SHADE_LIMIT)
            .step_by(SHADE_STEP as usize)
            .map(ShadeBand::new)
    }

    /// Runs the whole detector on one frame and returns every boundary from every band.
    /// Boundaries appear band by band, in border-following order within a band.
    pub fn detect(frame: &RgbImage) -> Vec<Boundary> {
        // --- 1. Grayscale & Denoise ---
        let denoised = denoise(&to_gray(frame));

        // --- 2. Band Scan ---
        let mut boundaries = Vec::new();
        for band in shade_bands() {
            let mask = band_mask(&denoised, band);
            let found = extract_boundaries(&mask);
            log::trace!(
                "band {} [{}, {}]: {} boundaries",
                band.min_shade,
                band.lower,
                band.upper,
                found.len()
            );
            boundaries.extend(found);
        }
        boundaries
    }

    /// Converts an RGB frame to 8-bit gray using fixed-point Rec. 601 luminance weights.
    pub fn to_gray(frame: &RgbImage) -> GrayImage {
        let half = 1 << (GRAY_SHIFT - 1);
        ImageBuffer::from_fn(frame.width(), frame.height(), |x, y| {
            let [r, g, b] = frame.get_pixel(x, y).0;
            let weighted = r as u32 * GRAY_R + g as u32 * GRAY_G + b as u32 * GRAY_B;
            Luma([((weighted + half) >> GRAY_SHIFT) as u8])
        })
    }

    /// Morphological opening followed by closing with a 3x3 square element.
    pub fn denoise(gray: &GrayImage) -> GrayImage {
        let kernel = Mask::square(1);
        let opened = grayscale_open(gray, &kernel);
        grayscale_close(&opened, &kernel)
    }

    /// Binary image of the pixels `band` keeps: 255 where kept, 0 elsewhere.
    pub fn band_mask(gray: &GrayImage, band: ShadeBand) -> GrayImage {
        ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            if band.keeps(gray.get_pixel(x, y).0[0]) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    /// Traces every border in a binary image and compresses each chain.
    pub fn extract_boundaries(mask: &GrayImage) -> Vec<Boundary> {
        find_contours::<i32>(mask)
            .into_iter()
            .map(|contour| compress_chain(&contour.points))
            .collect()
    }

    /// Collapses horizontal, vertical and diagonal runs of a closed chain to their
    /// end points. Removed points are collinear with their neighbours, so the
    /// polygon (and therefore its moments) is unchanged.
    pub fn compress_chain(chain: &[Point<i32>]) -> Boundary {
        let n = chain.len();
        if n < 3 {
            return chain.to_vec();
        }

        let step = |from: Point<i32>, to: Point<i32>| (to.x - from.x, to.y - from.y);
        let compressed: Boundary = (0..n)
            .filter(|&i| {
                let prev = chain[(i + n - 1) % n];
                let current = chain[i];
                let next = chain[(i + 1) % n];
                step(prev, current) != step(current, next)
            })
            .map(|i| chain[i])
            .collect();

        if compressed.is_empty() { chain.to_vec() } else { compressed }
    }
}

#[cfg(test)]
mod tests {
    use super::shade_detector::*;
    use crate::core_modules::measurement::measure;
    use crate::core_modules::{collision_resolver, duplicate_filter};
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::point::Point;
    use imageproc::rect::Rect;

    fn frame_with_square(color: [u8; 3], x: i32, y: i32, side: u32) -> RgbImage {
        let mut frame = RgbImage::new(200, 160);
        draw_filled_rect_mut(&mut frame, Rect::at(x, y).of_size(side, side), Rgb(color));
        frame
    }

    #[test]
    fn bands_follow_the_fixed_schedule() {
        let bands: Vec<ShadeBand> = shade_bands().collect();
        let shades: Vec<u32> = bands.iter().map(|b| b.min_shade).collect();
        assert_eq!(shades, vec![3, 53, 103, 153, 203, 253]);

        // 3 - 15 would be negative, so the first band starts at its own shade.
        assert_eq!(bands[0].lower, 3);
        assert_eq!(bands[0].upper, 215);
        assert_eq!(bands[1].lower, 38);
        assert_eq!(bands[1].upper, 2715);
    }

    #[test]
    fn band_keeps_its_whole_inclusive_range() {
        let first = ShadeBand::new(3);
        assert!(!first.keeps(0));
        assert!(!first.keeps(2));
        assert!(first.keeps(3));
        assert!(first.keeps(215));
        assert!(!first.keeps(216));

        // Values between `min_shade - 15` and `min_shade` belong to the band.
        let second = ShadeBand::new(53);
        assert!(!second.keeps(37));
        assert!(second.keeps(38));
        assert!(second.keeps(53));

        let bright = ShadeBand::new(253);
        assert!(!bright.keeps(237));
        assert!(bright.keeps(238));
        assert!(bright.keeps(255));
    }

    #[test]
    fn gray_uses_rec601_weights() {
        let mut frame = RgbImage::new(3, 1);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(1, 0, Rgb([0, 255, 0]));
        frame.put_pixel(2, 0, Rgb([0, 0, 255]));
        let gray = to_gray(&frame);
        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
        assert_eq!(gray.get_pixel(1, 0).0[0], 150);
        assert_eq!(gray.get_pixel(2, 0).0[0], 29);
    }

    #[test]
    fn gray_matches_fixed_point_rounding() {
        let mut frame = RgbImage::new(2, 1);
        // 0.299 * 3 + 0.114 * 93 is 11.499 in floating point, 12 in 14-bit fixed point.
        frame.put_pixel(0, 0, Rgb([3, 0, 93]));
        frame.put_pixel(1, 0, Rgb([40, 40, 40]));
        let gray = to_gray(&frame);
        assert_eq!(gray.get_pixel(0, 0).0[0], 12);
        assert_eq!(gray.get_pixel(1, 0).0[0], 40);
    }

    #[test]
    fn denoise_removes_isolated_speckles() {
        let mut frame = frame_with_square([255, 255, 255], 40, 40, 30);
        frame.put_pixel(5, 5, Rgb([255, 255, 255]));
        let denoised = denoise(&to_gray(&frame));
        assert_eq!(denoised.get_pixel(5, 5).0[0], 0);
        assert_eq!(denoised.get_pixel(55, 55).0[0], 255);
    }

    #[test]
    fn black_frame_yields_no_boundaries() {
        assert!(detect(&RgbImage::new(64, 48)).is_empty());
    }

    #[test]
    fn bright_square_is_found_once_per_matching_band() {
        let boundaries = detect(&frame_with_square([255, 255, 255], 50, 40, 46));
        // Pure white survives every band except the first, whose range tops out at 215.
        assert_eq!(boundaries.len(), 5);
        for boundary in &boundaries {
            let m = measure(boundary);
            assert_eq!(m.position(), (72, 62));
            assert_eq!(m.area, 2025.0);
        }
    }

    #[test]
    fn dark_square_is_found_in_the_band_reaching_below_it() {
        // Gray 45 lies in [3, 215] and in [38, 2715].
        let boundaries = detect(&frame_with_square([45, 45, 45], 50, 40, 46));
        assert_eq!(boundaries.len(), 2);
    }

    #[test]
    fn touching_squares_of_neighbouring_shades_form_one_object() {
        let mut frame = RgbImage::new(200, 160);
        draw_filled_rect_mut(&mut frame, Rect::at(40, 40).of_size(40, 40), Rgb([40, 40, 40]));
        draw_filled_rect_mut(&mut frame, Rect::at(80, 40).of_size(40, 40), Rgb([60, 60, 60]));

        // Both shades fall in the first two bands, so every band sees the joined pair.
        let boundaries = detect(&frame);
        assert_eq!(boundaries.len(), 2);

        let objects = collision_resolver::resolve(duplicate_filter::validate(boundaries));
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].measurement.position(), (79, 59));
        assert_eq!(objects[0].measurement.area, 3081.0);
    }

    #[test]
    fn compress_chain_keeps_only_corners() {
        let chain: Vec<Point<i32>> = (0..4)
            .map(|x| Point::new(x, 0))
            .chain((1..4).map(|y| Point::new(3, y)))
            .chain((0..3).rev().map(|x| Point::new(x, 3)))
            .chain((1..3).rev().map(|y| Point::new(0, y)))
            .collect();
        let compressed = compress_chain(&chain);
        assert_eq!(
            compressed,
            vec![Point::new(0, 0), Point::new(3, 0), Point::new(3, 3), Point::new(0, 3)]
        );
        assert_eq!(measure(&compressed), measure(&chain));
    }
}
