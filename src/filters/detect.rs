//! Face detection and nested eye regions.
//!
//! Detection is an injected capability behind [`RegionDetector`] so the
//! pipeline never depends on a specific detector. The production
//! implementation wraps the pretrained rustface model, loaded from disk at
//! startup the same way the original program loaded its cascade file.
//! Eye boxes are derived geometrically inside each face box and can never
//! escape it.

use std::path::Path;

use image::{GrayImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::AppError;

const FACE_COLOR: Rgba<u8> = Rgba([0, 80, 255, 255]);
const EYE_COLOR: Rgba<u8> = Rgba([0, 220, 40, 255]);

// Eye interest regions as percentages of the face box.
const EYE_PERCENT_TOP: f32 = 0.25;
const EYE_PERCENT_SIDE: f32 = 0.13;
const EYE_PERCENT_WIDTH: f32 = 0.35;
const EYE_PERCENT_HEIGHT: f32 = 0.30;

/// An axis-aligned detection region in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Whether `other` lies entirely inside this region.
    pub fn contains(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Intersect with a `width` x `height` frame; `None` if fully outside.
    pub fn clamped(&self, width: u32, height: u32) -> Option<Region> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(width as i32);
        let y1 = self.bottom().min(height as i32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Region::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    fn to_rect(self) -> Rect {
        Rect::at(self.x, self.y).of_size(self.width.max(1), self.height.max(1))
    }
}

/// Region detection over a grayscale frame.
///
/// Implementations locate instances of a trained object class and return
/// their bounding regions; the pipeline only sequences calls.
pub trait RegionDetector {
    fn detect(&mut self, gray: &GrayImage) -> Vec<Region>;
}

/// Pretrained face detector backed by rustface.
pub struct FaceDetector {
    inner: Box<dyn rustface::Detector>,
}

impl FaceDetector {
    /// Load the detection model from disk. A missing or corrupt model is
    /// an asset error; the caller keeps running with the filter
    /// unavailable.
    pub fn from_model(path: &Path) -> Result<Self, AppError> {
        let mut inner =
            rustface::create_detector(path.to_string_lossy().as_ref()).map_err(|e| {
                AppError::AssetLoad {
                    what: "face detection model",
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
        inner.set_min_face_size(40);
        inner.set_score_thresh(2.0);
        inner.set_pyramid_scale_factor(0.8);
        inner.set_slide_window_step(4, 4);
        Ok(Self { inner })
    }
}

impl RegionDetector for FaceDetector {
    fn detect(&mut self, gray: &GrayImage) -> Vec<Region> {
        let mut image = rustface::ImageData::new(gray.as_raw(), gray.width(), gray.height());
        self.inner
            .detect(&mut image)
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Region::new(bbox.x(), bbox.y(), bbox.width(), bbox.height())
            })
            .collect()
    }
}

/// Left and right eye boxes for a face, derived from fixed percentages of
/// the face box and clipped to it, so an eye box can never extend past
/// the face that produced it.
pub fn eye_regions(face: &Region) -> [Region; 2] {
    let fw = face.width as f32;
    let fh = face.height as f32;
    let eye_w = (fw * EYE_PERCENT_WIDTH) as u32;
    let eye_h = (fw * EYE_PERCENT_HEIGHT).min(fh) as u32;
    let top = face.y + (fh * EYE_PERCENT_TOP) as i32;
    let side = (fw * EYE_PERCENT_SIDE) as i32;

    let left = Region::new(face.x + side, top, eye_w, eye_h);
    let right = Region::new(
        face.right() - side - eye_w as i32,
        top,
        eye_w,
        eye_h,
    );

    [clip_to(left, face), clip_to(right, face)]
}

fn clip_to(region: Region, bounds: &Region) -> Region {
    let x0 = region.x.max(bounds.x);
    let y0 = region.y.max(bounds.y);
    let x1 = region.right().min(bounds.right()).max(x0);
    let y1 = region.bottom().min(bounds.bottom()).max(y0);
    Region::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32)
}

/// Run the detector over the current pipeline output and draw every face
/// box with its nested eye boxes. A frame with no faces is left unchanged.
/// Returns the drawn face and eye regions.
pub fn annotate_faces(
    frame: &mut RgbaImage,
    detector: &mut dyn RegionDetector,
) -> (Vec<Region>, Vec<Region>) {
    let gray = image::imageops::grayscale(frame);
    let (width, height) = (frame.width(), frame.height());

    let mut faces = Vec::new();
    let mut eyes = Vec::new();
    for detected in detector.detect(&gray) {
        let Some(face) = detected.clamped(width, height) else {
            continue;
        };
        draw_hollow_rect_mut(frame, face.to_rect(), FACE_COLOR);
        for eye in eye_regions(&face) {
            if eye.width > 0 && eye.height > 0 {
                draw_hollow_rect_mut(frame, eye.to_rect(), EYE_COLOR);
                eyes.push(eye);
            }
        }
        faces.push(face);
    }
    (faces, eyes)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDetector(Vec<Region>);

    impl RegionDetector for FixedDetector {
        fn detect(&mut self, _gray: &GrayImage) -> Vec<Region> {
            self.0.clone()
        }
    }

    #[test]
    fn eye_boxes_stay_inside_the_face() {
        let faces = [
            Region::new(10, 10, 100, 120),
            Region::new(0, 0, 31, 40),
            Region::new(200, 50, 64, 64),
        ];
        for face in &faces {
            for eye in eye_regions(face) {
                assert!(
                    face.contains(&eye),
                    "eye {:?} escapes face {:?}",
                    eye,
                    face
                );
            }
        }
    }

    #[test]
    fn annotate_reports_drawn_regions_inside_frame() {
        let mut frame = RgbaImage::from_pixel(160, 120, Rgba([30, 30, 30, 255]));
        let mut detector = FixedDetector(vec![
            Region::new(20, 20, 60, 60),
            // Partially outside the frame: must be clipped, not dropped.
            Region::new(130, 90, 60, 60),
            // Fully outside: dropped.
            Region::new(400, 400, 10, 10),
        ]);
        let (faces, eyes) = annotate_faces(&mut frame, &mut detector);
        assert_eq!(faces.len(), 2);
        let bounds = Region::new(0, 0, 160, 120);
        for face in &faces {
            assert!(bounds.contains(face));
        }
        for eye in &eyes {
            assert!(faces.iter().any(|f| f.contains(eye)));
        }
    }

    #[test]
    fn no_faces_leaves_the_frame_unchanged() {
        let frame = RgbaImage::from_pixel(64, 48, Rgba([5, 6, 7, 255]));
        let mut copy = frame.clone();
        let mut detector = FixedDetector(Vec::new());
        let (faces, eyes) = annotate_faces(&mut copy, &mut detector);
        assert!(faces.is_empty() && eyes.is_empty());
        assert_eq!(copy, frame);
    }
}
