//! Canny edge extraction.

use image::RgbaImage;
use imageproc::edges::canny;

use super::color::expand_luma;

/// Grayscale conversion followed by dual-threshold Canny edge extraction,
/// re-expanded to three channels for display consistency.
pub fn edge_detect(frame: &RgbaImage, low: f32, high: f32) -> RgbaImage {
    let gray = image::imageops::grayscale(frame);
    // Canny requires low <= high; a crossed slider pair is reordered.
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    let edges = canny(&gray, low, high);
    expand_luma(&edges)
}
