//! Circular alpha masks for round launcher icons.
//!
//! Mask generation and image resize are independent operations
//! combined by alpha compositing: the circle is the keep-region, the
//! source keeps only the alpha the mask grants.

use image::{GrayImage, Luma, RgbaImage};

/// Build a `size` x `size` keep-mask: an anti-aliased filled circle of
/// radius `size / 2` centered on the canvas. 255 keeps a pixel, 0
/// discards it; edge pixels get a fractional value over a one-pixel
/// feather band.
pub fn circle_mask(size: u32) -> GrayImage {
    let radius = size as f64 / 2.0;
    let center = radius - 0.5;

    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f64 - center;
        let dy = y as f64 - center;
        let distance = (dx * dx + dy * dy).sqrt();
        let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
        Luma([(coverage * 255.0).round() as u8])
    })
}

/// Multiply the image's alpha channel by the mask.
///
/// Dimensions must match; the caller resizes first.
pub fn apply_mask(img: &mut RgbaImage, mask: &GrayImage) {
    debug_assert_eq!(img.dimensions(), mask.dimensions());
    for (pixel, keep) in img.pixels_mut().zip(mask.pixels()) {
        let alpha = pixel[3] as u16 * keep[0] as u16 / 255;
        pixel[3] = alpha as u8;
    }
}
