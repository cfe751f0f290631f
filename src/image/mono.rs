//! Monochrome conversion for notification icons.
//!
//! Android status-bar icons are rendered by the OS as a silhouette, so
//! the brand icon is reduced to a binary black/white mask: greyscale,
//! then threshold at the luminance midpoint. Alpha is preserved.

use image::{Rgba, RgbaImage};

/// Default threshold: the midpoint of the 8-bit luminance range.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Reduce to a binary black/white image in place.
pub fn binarize(img: &mut RgbaImage, threshold: u8) {
    for pixel in img.pixels_mut() {
        let luma = greyscale_value(pixel);
        let value = if luma >= threshold { 255 } else { 0 };
        pixel[0] = value;
        pixel[1] = value;
        pixel[2] = value;
    }
}

#[inline]
fn greyscale_value(pixel: &Rgba<u8>) -> u8 {
    let luma =
        0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64;
    luma.round().clamp(0.0, 255.0) as u8
}
