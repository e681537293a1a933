//! Gaussian smoothing with a slider-derived kernel size.

use image::RgbaImage;
use imageproc::filter::gaussian_blur_f32;

/// Kernel size for a blur slider value `k`: always `2k + 1`, hence always
/// odd and at least 1.
pub fn kernel_size(radius: u32) -> u32 {
    2 * radius + 1
}

/// Sigma matching what OpenCV derives for an automatic sigma at the given
/// kernel size, so a slider value gives the same visual strength as the
/// original program.
pub fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Gaussian blur with kernel `2 * radius + 1`. A radius of 0 (kernel 1)
/// is the identity and returns a plain copy.
pub fn gaussian(frame: &RgbaImage, radius: u32) -> RgbaImage {
    let kernel = kernel_size(radius);
    if kernel <= 1 {
        return frame.clone();
    }
    gaussian_blur_f32(frame, sigma_for_kernel(kernel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn kernel_is_always_odd() {
        for radius in 0..=64 {
            let kernel = kernel_size(radius);
            assert_eq!(kernel, 2 * radius + 1);
            assert_eq!(kernel % 2, 1);
            assert!(kernel >= 1);
        }
    }

    #[test]
    fn sigma_grows_with_kernel() {
        assert!(sigma_for_kernel(3) < sigma_for_kernel(15));
        assert!(sigma_for_kernel(3) > 0.0);
    }

    #[test]
    fn zero_radius_is_identity() {
        let mut frame = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        frame.put_pixel(3, 3, Rgba([240, 10, 10, 255]));
        assert_eq!(gaussian(&frame, 0), frame);
    }

    #[test]
    fn blur_spreads_an_impulse() {
        let mut frame = RgbaImage::from_pixel(9, 9, Rgba([0, 0, 0, 255]));
        frame.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let blurred = gaussian(&frame, 3);
        // The center loses energy to its neighbours.
        assert!(blurred.get_pixel(4, 4).0[0] < 255);
        assert!(blurred.get_pixel(5, 4).0[0] > 0);
    }
}
