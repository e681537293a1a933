//! The frame pipeline: applies the enabled filters in a fixed order.
//!
//! Order is canonical and documented: grayscale, blur, sepia, edge
//! detect, face detect, segment-and-count. Each step consumes the
//! previous step's output; detection overlays are drawn on the current
//! pipeline output, not the raw capture.

use ab_glyph::FontVec;
use image::RgbaImage;

use super::detect::{annotate_faces, Region, RegionDetector};
use super::segment::segment_and_count;
use super::{color, edges, smooth, FilterKind, FilterState};

/// What the annotating steps produced for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    /// Face boxes drawn this frame
    pub faces: Vec<Region>,
    /// Eye boxes drawn this frame, each inside one of `faces`
    pub eyes: Vec<Region>,
    /// Object count from segment-and-count, if that filter ran
    pub object_count: Option<usize>,
}

/// Applies the enabled subset of filters to each captured frame.
///
/// The pipeline is a pure function of (frame, [`FilterState`]) except for
/// the injected face detector, which owns mutable detection scratch
/// state. With every filter disabled the output is pixel-identical to
/// the input.
pub struct Pipeline {
    detector: Option<Box<dyn RegionDetector>>,
    font: Option<FontVec>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Pipeline {
    pub fn new(detector: Option<Box<dyn RegionDetector>>, font: Option<FontVec>) -> Self {
        Self { detector, font }
    }

    /// Whether the face filter has a working detector behind it.
    pub fn face_detection_available(&self) -> bool {
        self.detector.is_some()
    }

    /// Whether the count overlay can render text.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Produce the display frame for one capture.
    pub fn process(&mut self, frame: &RgbaImage, state: &FilterState) -> (RgbaImage, FrameReport) {
        let mut report = FrameReport::default();
        if !state.any_enabled() {
            return (frame.clone(), report);
        }

        let params = &state.params;
        let mut current = frame.clone();

        if state.is_enabled(FilterKind::Grayscale) {
            current = color::grayscale_expand(&current);
        }
        if state.is_enabled(FilterKind::Blur) {
            current = smooth::gaussian(&current, params.blur_radius);
        }
        if state.is_enabled(FilterKind::Sepia) {
            current = color::sepia(&current);
        }
        if state.is_enabled(FilterKind::EdgeDetect) {
            current = edges::edge_detect(&current, params.edge_low, params.edge_high);
        }
        if state.is_enabled(FilterKind::FaceDetect) {
            if let Some(detector) = self.detector.as_deref_mut() {
                let (faces, eyes) = annotate_faces(&mut current, detector);
                report.faces = faces;
                report.eyes = eyes;
            }
        }
        if state.is_enabled(FilterKind::SegmentCount) {
            let seg = segment_and_count(
                &mut current,
                params.threshold,
                params.min_area,
                params.max_area,
                self.font.as_ref(),
            );
            report.object_count = Some(seg.count);
        }

        (current, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgba};

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn all_disabled_is_identity() {
        let frame = gradient(32, 24);
        let mut pipeline = Pipeline::default();
        let (out, report) = pipeline.process(&frame, &FilterState::default());
        assert_eq!(out, frame);
        assert!(report.faces.is_empty());
        assert!(report.object_count.is_none());
    }

    #[test]
    fn filters_compose_rather_than_override() {
        let frame = gradient(32, 24);
        let mut pipeline = Pipeline::default();

        let mut state = FilterState::default();
        state.toggle(FilterKind::Grayscale);
        state.toggle(FilterKind::Sepia);
        let (composed, _) = pipeline.process(&frame, &state);

        // Same as sepia applied to the expanded grayscale image...
        let expected = crate::filters::color::sepia(&crate::filters::color::grayscale_expand(&frame));
        assert_eq!(composed, expected);

        // ...and not sepia over the original color frame.
        let mut sepia_only = FilterState::default();
        sepia_only.toggle(FilterKind::Sepia);
        let (sepia_direct, _) = pipeline.process(&frame, &sepia_only);
        assert_ne!(composed, sepia_direct);
    }

    #[test]
    fn face_filter_without_detector_is_a_no_op() {
        let frame = gradient(40, 40);
        let mut pipeline = Pipeline::default();
        assert!(!pipeline.face_detection_available());

        let mut state = FilterState::default();
        state.toggle(FilterKind::FaceDetect);
        let (out, report) = pipeline.process(&frame, &state);
        assert_eq!(out, frame);
        assert!(report.faces.is_empty());
    }

    #[test]
    fn injected_detector_annotations_respect_nesting() {
        struct OneFace;
        impl crate::filters::detect::RegionDetector for OneFace {
            fn detect(&mut self, _gray: &GrayImage) -> Vec<Region> {
                vec![Region::new(8, 8, 48, 48)]
            }
        }

        let frame = gradient(96, 96);
        let mut pipeline = Pipeline::new(Some(Box::new(OneFace)), None);
        let mut state = FilterState::default();
        state.toggle(FilterKind::FaceDetect);

        let (out, report) = pipeline.process(&frame, &state);
        assert_ne!(out, frame, "boxes must be drawn");
        assert_eq!(report.faces.len(), 1);
        assert_eq!(report.eyes.len(), 2);
        for eye in &report.eyes {
            assert!(report.faces[0].contains(eye));
        }
    }

    #[test]
    fn segment_count_is_reported() {
        let mut frame = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));
        for y in 10..34 {
            for x in 10..34 {
                frame.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let mut pipeline = Pipeline::default();
        let mut state = FilterState::default();
        state.toggle(FilterKind::SegmentCount);
        let (_, report) = pipeline.process(&frame, &state);
        assert_eq!(report.object_count, Some(1));
    }

    #[test]
    fn blur_then_edges_runs_in_order() {
        // Enabling everything ahead of edge-detect must still yield the
        // binary expanded edge image as the final color transform.
        let frame = gradient(48, 48);
        let mut pipeline = Pipeline::default();
        let mut state = FilterState::default();
        state.toggle(FilterKind::Grayscale);
        state.toggle(FilterKind::Blur);
        state.toggle(FilterKind::EdgeDetect);
        let (out, _) = pipeline.process(&frame, &state);
        for px in out.pixels() {
            let [r, g, b, _] = px.0;
            assert!(r == g && g == b);
            assert!(r == 0 || r == 255);
        }
    }
}
