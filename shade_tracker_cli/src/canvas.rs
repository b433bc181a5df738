use image::Rgb;
use opencv::{
    core::{self, Mat, Point, Scalar},
    imgproc,
};
use shade_tracker::pipeline::Canvas;

const FONT_SCALE: f64 = 0.5;
const FONT_THICKNESS: i32 = 2;

/// Draws annotations straight onto the BGR frame that will be written out.
pub struct MatCanvas<'a> {
    frame: &'a mut Mat,
}

impl<'a> MatCanvas<'a> {
    pub fn new(frame: &'a mut Mat) -> Self {
        Self { frame }
    }
}

fn bgr(color: Rgb<u8>) -> Scalar {
    let [r, g, b] = color.0;
    Scalar::new(b as f64, g as f64, r as f64, 0.0)
}

fn point((x, y): (i32, i32)) -> Point {
    Point::new(x, y)
}

// A failed draw only loses one annotation, so it is logged rather than propagated.
fn report(what: &str, result: opencv::Result<()>) {
    if let Err(err) = result {
        log::warn!("Failed to draw {}: {}", what, err);
    }
}

impl Canvas for MatCanvas<'_> {
    fn line(&mut self, from: (i32, i32), to: (i32, i32), color: Rgb<u8>, thickness: i32) {
        let result = imgproc::line(
            &mut *self.frame,
            point(from),
            point(to),
            bgr(color),
            thickness,
            imgproc::LINE_8,
            0,
        );
        report("line", result);
    }

    fn outline(&mut self, boundary: &[imageproc::point::Point<i32>], color: Rgb<u8>, thickness: i32) {
        let points: core::Vector<Point> = boundary.iter().map(|p| Point::new(p.x, p.y)).collect();
        let result = imgproc::polylines(
            &mut *self.frame,
            &points,
            true,
            bgr(color),
            thickness,
            imgproc::LINE_8,
            0,
        );
        report("contour", result);
    }

    fn text(&mut self, text: &str, origin: (i32, i32), color: Rgb<u8>) {
        let result = imgproc::put_text(
            &mut *self.frame,
            text,
            point(origin),
            imgproc::FONT_HERSHEY_SIMPLEX,
            FONT_SCALE,
            bgr(color),
            FONT_THICKNESS,
            imgproc::LINE_8,
            false,
        );
        report("text", result);
    }

    fn filled_circle(&mut self, center: (i32, i32), radius: i32, color: Rgb<u8>) {
        let result = imgproc::circle(
            &mut *self.frame,
            point(center),
            radius,
            bgr(color),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        );
        report("marker", result);
    }
}
