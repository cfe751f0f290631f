//! SVG rasterization via resvg.
//!
//! Used for partner-supplied SVG sources and for the synthesized
//! initials icon. The system font database is loaded once and shared;
//! SVG text elements render with whatever the host provides.

use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use resvg::{tiny_skia, usvg};

static FONTS: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

fn options() -> usvg::Options<'static> {
    let mut opt = usvg::Options::default();
    opt.fontdb = FONTS.clone();
    opt
}

/// Rasterize SVG data onto a `width` x `height` transparent canvas,
/// scaled to fit (contain) and centered.
pub fn rasterize(svg_data: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    let tree = usvg::Tree::from_data(svg_data, &options())
        .map_err(|e| anyhow!("failed to parse SVG: {e}"))?;

    let svg_width = tree.size().width();
    let svg_height = tree.size().height();
    if svg_width <= 0.0 || svg_height <= 0.0 {
        return Err(anyhow!("SVG has a degenerate size"));
    }

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("failed to allocate {width}x{height} pixmap"))?;

    let scale = (width as f32 / svg_width).min(height as f32 / svg_height);
    let tx = (width as f32 - svg_width * scale) / 2.0;
    let ty = (height as f32 - svg_height * scale) / 2.0;
    let transform = tiny_skia::Transform::from_scale(scale, scale).post_translate(tx, ty);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let png = pixmap
        .encode_png()
        .map_err(|e| anyhow!("failed to encode rasterized SVG: {e}"))?;
    let img = image::load_from_memory(&png).context("failed to reload rasterized SVG")?;
    Ok(img.to_rgba8())
}

/// Rasterize an SVG file from disk.
pub fn rasterize_file(path: &std::path::Path, width: u32, height: u32) -> Result<RgbaImage> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read SVG `{}`", path.display()))?;
    rasterize(&data, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterize_solid_rect() {
        let svg = br##"<svg width="10" height="10" xmlns="http://www.w3.org/2000/svg">
            <rect width="10" height="10" fill="#FF0000"/>
        </svg>"##;
        let img = rasterize(svg, 20, 20).unwrap();
        assert_eq!(img.dimensions(), (20, 20));
        let center = img.get_pixel(10, 10);
        assert_eq!(center[0], 255);
        assert_eq!(center[3], 255);
    }

    #[test]
    fn test_rasterize_contains_non_square() {
        // 2:1 SVG onto a square canvas: top and bottom bands transparent
        let svg = br##"<svg width="20" height="10" xmlns="http://www.w3.org/2000/svg">
            <rect width="20" height="10" fill="#00FF00"/>
        </svg>"##;
        let img = rasterize(svg, 40, 40).unwrap();
        assert_eq!(img.get_pixel(20, 0)[3], 0);
        assert_eq!(img.get_pixel(20, 20)[3], 255);
    }

    #[test]
    fn test_rasterize_rejects_garbage() {
        assert!(rasterize(b"not svg at all", 10, 10).is_err());
    }
}
