//! Color transforms: grayscale expansion and the sepia tone matrix.

use image::{Rgba, RgbaImage};

/// Sepia tone matrix for RGB-ordered channels. Each output channel is a
/// weighted mix of the input channels, clamped to `[0, 255]`.
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Desaturate to a single intensity channel, then re-expand to three
/// channels so downstream steps that expect color still work.
pub fn grayscale_expand(frame: &RgbaImage) -> RgbaImage {
    let gray = image::imageops::grayscale(frame);
    expand_luma(&gray)
}

/// Spread a single-channel image back over R, G and B with full alpha.
pub fn expand_luma(gray: &image::GrayImage) -> RgbaImage {
    let mut out = RgbaImage::new(gray.width(), gray.height());
    for (src, dst) in gray.pixels().zip(out.pixels_mut()) {
        let l = src.0[0];
        *dst = Rgba([l, l, l, 255]);
    }
    out
}

/// Apply the sepia tone matrix. Intensities saturate at 255 rather than
/// wrapping, so bright inputs cannot produce overflow artifacts.
pub fn sepia(frame: &RgbaImage) -> RgbaImage {
    let mut out = RgbaImage::new(frame.width(), frame.height());
    for (src, dst) in frame.pixels().zip(out.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let (rf, gf, bf) = (r as f32, g as f32, b as f32);
        let mut mixed = [0u8; 4];
        for (channel, row) in SEPIA.iter().enumerate() {
            let v = row[0] * rf + row[1] * gf + row[2] * bf;
            mixed[channel] = v.clamp(0.0, 255.0) as u8;
        }
        mixed[3] = a;
        *dst = Rgba(mixed);
    }
    out
}
