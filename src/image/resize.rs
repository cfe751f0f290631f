//! Fit-policy resizing.
//!
//! Icons and adaptive layers use `Contain` (preserve aspect ratio, pad
//! with transparency); splash screens use `Cover` (scale to fill, crop
//! the overflow).

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};

/// How a source maps onto a fixed target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Whole source visible, centered, transparent padding
    Contain,
    /// Canvas fully covered, centered, overflow cropped
    Cover,
}

/// Resize `src` onto a `width` x `height` canvas under `mode`.
pub fn resize_fit(src: &DynamicImage, width: u32, height: u32, mode: FitMode) -> RgbaImage {
    let src = src.to_rgba8();
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 {
        return RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    }

    match mode {
        FitMode::Contain => {
            let scale = (width as f64 / sw as f64).min(height as f64 / sh as f64);
            let tw = ((sw as f64 * scale).round() as u32).max(1);
            let th = ((sh as f64 * scale).round() as u32).max(1);
            let scaled = imageops::resize(&src, tw, th, FilterType::Lanczos3);

            let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
            let dx = (width.saturating_sub(tw) / 2) as i64;
            let dy = (height.saturating_sub(th) / 2) as i64;
            imageops::overlay(&mut canvas, &scaled, dx, dy);
            canvas
        }
        FitMode::Cover => {
            let scale = (width as f64 / sw as f64).max(height as f64 / sh as f64);
            let tw = ((sw as f64 * scale).round() as u32).max(width);
            let th = ((sh as f64 * scale).round() as u32).max(height);
            let scaled = imageops::resize(&src, tw, th, FilterType::Lanczos3);

            let x = (tw - width) / 2;
            let y = (th - height) / 2;
            imageops::crop_imm(&scaled, x, y, width, height).to_image()
        }
    }
}

/// Center `src` on a larger transparent canvas with `pad` pixels of
/// margin on every side (adaptive-icon foreground layout).
pub fn pad_symmetric(src: &RgbaImage, pad: u32) -> RgbaImage {
    let (w, h) = src.dimensions();
    let mut canvas = RgbaImage::from_pixel(w + 2 * pad, h + 2 * pad, Rgba([0, 0, 0, 0]));
    imageops::overlay(&mut canvas, src, pad as i64, pad as i64);
    canvas
}

/// Scale down so both dimensions fit inside `max` x `max`; images that
/// already fit are returned unchanged.
pub fn shrink_to_fit(src: DynamicImage, max: u32) -> DynamicImage {
    let (w, h) = (src.width(), src.height());
    if w <= max && h <= max {
        return src;
    }
    let scale = (max as f64 / w as f64).min(max as f64 / h as f64);
    let tw = ((w as f64 * scale).round() as u32).max(1);
    let th = ((h as f64 * scale).round() as u32).max(1);
    src.resize_exact(tw, th, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn test_contain_pads_wide_source() {
        let out = resize_fit(&solid(100, 50), 48, 48, FitMode::Contain);
        assert_eq!(out.dimensions(), (48, 48));
        // top rows are padding
        assert_eq!(out.get_pixel(24, 0)[3], 0);
        // center is content
        assert_eq!(out.get_pixel(24, 24)[3], 255);
    }

    #[test]
    fn test_contain_square_fills_canvas() {
        let out = resize_fit(&solid(512, 512), 96, 96, FitMode::Contain);
        assert_eq!(out.dimensions(), (96, 96));
        assert_eq!(out.get_pixel(0, 0)[3], 255);
        assert_eq!(out.get_pixel(95, 95)[3], 255);
    }

    #[test]
    fn test_cover_exactly_fills() {
        let out = resize_fit(&solid(600, 400), 1080, 1920, FitMode::Cover);
        assert_eq!(out.dimensions(), (1080, 1920));
        assert_eq!(out.get_pixel(0, 0)[3], 255);
        assert_eq!(out.get_pixel(1079, 1919)[3], 255);
    }

    #[test]
    fn test_cover_upscales_small_source() {
        let out = resize_fit(&solid(10, 10), 64, 64, FitMode::Cover);
        assert_eq!(out.dimensions(), (64, 64));
        assert_eq!(out.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn test_pad_symmetric_geometry() {
        let src = RgbaImage::from_pixel(72, 72, Rgba([1, 2, 3, 255]));
        let out = pad_symmetric(&src, 18);
        assert_eq!(out.dimensions(), (108, 108));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(17, 17)[3], 0);
        assert_eq!(out.get_pixel(18, 18)[3], 255);
        assert_eq!(out.get_pixel(89, 89)[3], 255);
        assert_eq!(out.get_pixel(90, 90)[3], 0);
    }

    #[test]
    fn test_shrink_to_fit_leaves_small_images_alone() {
        let out = shrink_to_fit(solid(100, 50), 4096);
        assert_eq!((out.width(), out.height()), (100, 50));

        let out = shrink_to_fit(solid(8192, 4096), 4096);
        assert_eq!((out.width(), out.height()), (4096, 2048));
    }
}
