//! Naive contour-based object counting.
//!
//! Grayscale, smooth, binarize at a fixed threshold, clean the mask with
//! morphological close/dilate/erode, extract external contours, discard
//! anything outside the configured area band, then draw the survivors and
//! render their count on the frame.

use ab_glyph::{FontVec, PxScale};
use image::{GrayImage, Rgba, RgbaImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_text_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, dilate, erode};
use imageproc::point::Point;

use super::detect::Region;

const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 255, 60, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 40, 40, 255]);
const SMOOTH_SIGMA: f32 = 1.0;

/// What the counting step drew: one bounding box per counted contour.
/// `count == boxes.len()` by construction.
#[derive(Clone, Debug, Default)]
pub struct SegmentReport {
    pub count: usize,
    pub boxes: Vec<Region>,
}

/// Polygon area of a closed contour via the shoelace formula. imageproc
/// extracts contours but leaves area to the caller.
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        doubled += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (doubled.abs() as f64) / 2.0
}

/// Binarized, morphologically cleaned mask used for contour extraction.
fn object_mask(frame: &RgbaImage, thresh: u8) -> GrayImage {
    let gray = image::imageops::grayscale(frame);
    let smoothed = gaussian_blur_f32(&gray, SMOOTH_SIGMA);
    let binary = threshold(&smoothed, thresh, ThresholdType::Binary);
    // Merge speckle noise into solid blobs before tracing contours.
    let closed = close(&binary, Norm::LInf, 2);
    let grown = dilate(&closed, Norm::LInf, 1);
    erode(&grown, Norm::LInf, 1)
}

fn bounding_box(points: &[Point<i32>]) -> Option<Region> {
    let first = points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in points {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some(Region::new(x0, y0, (x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32))
}

/// Count objects in the frame and draw the surviving contour outlines and
/// the count text. Contours with area outside `[min_area, max_area]` are
/// never drawn and never counted.
pub fn segment_and_count(
    frame: &mut RgbaImage,
    thresh: u8,
    min_area: f64,
    max_area: f64,
    font: Option<&FontVec>,
) -> SegmentReport {
    let mask = object_mask(frame, thresh);
    let contours: Vec<Contour<i32>> = find_contours(&mask);

    let mut report = SegmentReport::default();
    for contour in &contours {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let area = contour_area(&contour.points);
        if area < min_area || area > max_area {
            continue;
        }
        for p in &contour.points {
            if (p.x as u32) < frame.width() && (p.y as u32) < frame.height() {
                frame.put_pixel(p.x as u32, p.y as u32, OUTLINE_COLOR);
            }
        }
        if let Some(bb) = bounding_box(&contour.points) {
            report.boxes.push(bb);
        }
        report.count += 1;
    }

    if let Some(font) = font {
        let label = format!("Objects: {}", report.count);
        draw_text_mut(frame, TEXT_COLOR, 10, 10, PxScale::from(28.0), font, &label);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> RgbaImage {
        // Black canvas with one large white square and one small dot.
        let mut frame = RgbaImage::from_pixel(96, 96, Rgba([0, 0, 0, 255]));
        for y in 20..44 {
            for x in 16..40 {
                frame.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        for y in 70..73 {
            for x in 70..73 {
                frame.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        frame
    }

    #[test]
    fn shoelace_matches_known_shapes() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(contour_area(&square), 100.0);

        let triangle = [Point::new(0, 0), Point::new(8, 0), Point::new(0, 6)];
        assert_eq!(contour_area(&triangle), 24.0);

        assert_eq!(contour_area(&[Point::new(1, 1)]), 0.0);
    }

    #[test]
    fn small_contours_are_neither_counted_nor_drawn() {
        let mut frame = scene();
        let report = segment_and_count(&mut frame, 128, 120.0, 500_000.0, None);
        assert_eq!(report.count, 1, "only the large square clears min_area");
        assert_eq!(report.count, report.boxes.len());
        // The surviving box is the square's, not the dot's.
        let Region { x, y, .. } = report.boxes[0];
        assert!(x < 45 && y < 50, "unexpected box {:?}", report.boxes[0]);
    }

    #[test]
    fn area_band_upper_bound_applies() {
        let mut frame = scene();
        let report = segment_and_count(&mut frame, 128, 120.0, 200.0, None);
        assert_eq!(report.count, 0);
        assert!(report.boxes.is_empty());
    }

    #[test]
    fn count_equals_drawn_contours_for_multiple_objects() {
        let mut frame = RgbaImage::from_pixel(128, 64, Rgba([0, 0, 0, 255]));
        for (ox, oy) in [(10u32, 10u32), (60, 10), (95, 30)] {
            for y in oy..oy + 16 {
                for x in ox..ox + 16 {
                    frame.put_pixel(x, y, Rgba([255, 255, 255, 255]));
                }
            }
        }
        let report = segment_and_count(&mut frame, 128, 60.0, 500_000.0, None);
        assert_eq!(report.count, 3);
        assert_eq!(report.boxes.len(), report.count);
    }

    #[test]
    fn empty_frame_counts_nothing() {
        let mut frame = RgbaImage::from_pixel(48, 48, Rgba([0, 0, 0, 255]));
        let before = frame.clone();
        let report = segment_and_count(&mut frame, 128, 50.0, 500_000.0, None);
        assert_eq!(report.count, 0);
        assert_eq!(frame, before, "nothing to draw on an empty frame");
    }
}
