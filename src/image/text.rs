//! Fallback icon synthesis: app initials on a brand-colored field.
//!
//! Used when a partner uploads no logo. Initials and text-color
//! selection are pure functions of the inputs, so the same app name
//! and primary color always produce the same icon.

use anyhow::Result;
use image::RgbaImage;

use crate::image::color::Rgb;
use crate::image::svg;

/// Field shape behind the initials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconShape {
    Square,
    Round,
}

/// Renders placeholder icons from an app name and a primary color.
pub struct TextIconSynthesizer;

impl TextIconSynthesizer {
    /// First letter of up to the first two words, upper-cased.
    ///
    /// `"Acme Pay"` -> `"AP"`, `"acme"` -> `"A"`.
    pub fn initials(app_name: &str) -> String {
        app_name
            .split_whitespace()
            .take(2)
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Black or white, whichever reads better on `background`.
    pub fn text_color(background: Rgb) -> Rgb {
        background.contrast_color()
    }

    /// Build the SVG document for one icon variant.
    pub fn svg_document(text: &str, background: Rgb, size: u32, shape: IconShape) -> String {
        let font_size = size * 2 / 5;
        let fill = background.to_hex();
        let text_fill = Self::text_color(background).to_hex();
        let half = size as f64 / 2.0;

        let field = match shape {
            IconShape::Square => {
                format!(r#"<rect width="{size}" height="{size}" fill="{fill}"/>"#)
            }
            IconShape::Round => format!(
                r#"<circle cx="{half}" cy="{half}" r="{half}" fill="{fill}"/>"#
            ),
        };

        format!(
            concat!(
                r#"<svg width="{size}" height="{size}" viewBox="0 0 {size} {size}" "#,
                r#"xmlns="http://www.w3.org/2000/svg">"#,
                "{field}",
                r#"<text x="{half}" y="{half}" font-family="Arial, sans-serif" "#,
                r#"font-size="{font_size}" font-weight="bold" fill="{text_fill}" "#,
                r#"text-anchor="middle" dominant-baseline="central">{text}</text>"#,
                "</svg>"
            ),
            size = size,
            field = field,
            half = half,
            font_size = font_size,
            text_fill = text_fill,
            text = text,
        )
    }

    /// Render one icon variant as a raster image.
    pub fn synthesize(
        app_name: &str,
        background: Rgb,
        size: u32,
        shape: IconShape,
    ) -> Result<RgbaImage> {
        let text = Self::initials(app_name);
        let document = Self::svg_document(&text, background, size, shape);
        svg::rasterize(document.as_bytes(), size, size)
    }
}
