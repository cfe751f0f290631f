//! Artifact generation: one source image in, density-correct rasters
//! and XML descriptors out.
//!
//! Every operation writes exactly one artifact (or one pair, for the
//! adaptive descriptors) and returns its [`ProcessedAsset`] record.
//! The orchestrator decides which operations run and with what
//! parallelism; nothing here shares mutable state.

pub mod density;
pub mod xml;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, Rgba, RgbaImage};

use crate::asset::model::{AssetCategory, AssetRole, ProcessedAsset};
use crate::config::PipelineConfig;
use crate::image::color::Rgb;
use crate::image::mask;
use crate::image::mono;
use crate::image::resize::{self, FitMode};
use crate::image::svg;
use crate::image::text::{IconShape, TextIconSynthesizer};
use density::{
    ADAPTIVE_CANVAS, ADAPTIVE_DESCRIPTOR_DIR, ADAPTIVE_LAYER_DIR, ADAPTIVE_PADDING,
    ADAPTIVE_SAFE_AREA, DensitySpec, NOTIFICATION_SIZE, SPLASH_HEIGHT, SPLASH_WIDTH,
};

/// Pixel size at which SVG sources are rasterized before density
/// resizing; comfortably above the largest launcher density.
const SVG_RASTER_SIZE: u32 = 512;

/// Generates density-specific artifacts from partner sources.
pub struct DensityGenerator {
    max_dimension: u32,
}

impl DensityGenerator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_dimension: config.limits.max_dimension,
        }
    }

    // ------------------------------------------------------------------
    // Source loading
    // ------------------------------------------------------------------

    /// Decode a source image; SVG sources are rasterized first.
    pub fn load_source(&self, path: &Path) -> Result<DynamicImage> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if ext == "svg" {
            let raster = svg::rasterize_file(path, SVG_RASTER_SIZE, SVG_RASTER_SIZE)?;
            Ok(DynamicImage::ImageRgba8(raster))
        } else {
            image::open(path)
                .with_context(|| format!("failed to decode `{}`", path.display()))
        }
    }

    // ------------------------------------------------------------------
    // Launcher icons
    // ------------------------------------------------------------------

    /// Square launcher icon for one density.
    pub fn launcher_icon(
        &self,
        source: &DynamicImage,
        source_path: &Path,
        density: &DensitySpec,
        res_dir: &Path,
        role: AssetRole,
    ) -> Result<ProcessedAsset> {
        let icon = resize::resize_fit(source, density.size, density.size, FitMode::Contain);
        let output = res_dir.join(density.name).join("ic_launcher.png");
        write_png(&icon, &output)?;
        Ok(ProcessedAsset::written(
            AssetCategory::Icon,
            role,
            Some(source_path),
            output,
            Some(density.name),
            density.size,
            density.size,
            "png",
        ))
    }

    /// Round launcher icon: cover-resize composited under a circular
    /// keep-mask built independently of the resize.
    pub fn round_icon(
        &self,
        source: &DynamicImage,
        source_path: &Path,
        density: &DensitySpec,
        res_dir: &Path,
        role: AssetRole,
    ) -> Result<ProcessedAsset> {
        let mut icon = resize::resize_fit(source, density.size, density.size, FitMode::Cover);
        let circle = mask::circle_mask(density.size);
        mask::apply_mask(&mut icon, &circle);

        let output = res_dir.join(density.name).join("ic_launcher_round.png");
        write_png(&icon, &output)?;
        Ok(ProcessedAsset::written(
            AssetCategory::Icon,
            role,
            Some(source_path),
            output,
            Some(density.name),
            density.size,
            density.size,
            "png",
        ))
    }

    /// Synthesized launcher icon pair (no partner logo).
    pub fn fallback_icon_pair(
        &self,
        app_name: &str,
        primary: Rgb,
        density: &DensitySpec,
        res_dir: &Path,
    ) -> Result<Vec<ProcessedAsset>> {
        let mut out = Vec::with_capacity(2);
        for (shape, file) in [
            (IconShape::Square, "ic_launcher.png"),
            (IconShape::Round, "ic_launcher_round.png"),
        ] {
            let icon = TextIconSynthesizer::synthesize(app_name, primary, density.size, shape)?;
            let output = res_dir.join(density.name).join(file);
            write_png(&icon, &output)?;
            out.push(ProcessedAsset::written(
                AssetCategory::Icon,
                AssetRole::Icon,
                None,
                output,
                Some(density.name),
                density.size,
                density.size,
                "png",
            ));
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Splash screen
    // ------------------------------------------------------------------

    /// Splash layer-list drawable; always present so the injected
    /// splash style has something to reference.
    pub fn splash_xml(&self, res_dir: &Path) -> Result<ProcessedAsset> {
        let output = res_dir.join("drawable").join("splash_background.xml");
        write_text(&xml::splash_background(), &output)?;
        Ok(ProcessedAsset::written(
            AssetCategory::Splash,
            AssetRole::Splash,
            None,
            output,
            None,
            0,
            0,
            "xml",
        ))
    }

    /// Cover-cropped splash raster.
    pub fn splash_image(&self, source_path: &Path, res_dir: &Path) -> Result<ProcessedAsset> {
        let source = self.load_source(source_path)?;
        let splash = resize::resize_fit(&source, SPLASH_WIDTH, SPLASH_HEIGHT, FitMode::Cover);
        let output = res_dir.join("drawable").join("splash_image.png");
        write_png(&splash, &output)?;
        Ok(ProcessedAsset::written(
            AssetCategory::Splash,
            AssetRole::Splash,
            Some(source_path),
            output,
            None,
            SPLASH_WIDTH,
            SPLASH_HEIGHT,
            "png",
        ))
    }

    // ------------------------------------------------------------------
    // Notification icon
    // ------------------------------------------------------------------

    /// Status-bar icon: contain-resize then binary monochrome mask.
    pub fn notification_icon(&self, source_path: &Path, res_dir: &Path) -> Result<ProcessedAsset> {
        let source = self.load_source(source_path)?;
        let mut icon = resize::resize_fit(
            &source,
            NOTIFICATION_SIZE,
            NOTIFICATION_SIZE,
            FitMode::Contain,
        );
        mono::binarize(&mut icon, mono::DEFAULT_THRESHOLD);

        let output = res_dir.join("drawable").join("ic_notification.png");
        write_png(&icon, &output)?;
        Ok(ProcessedAsset::written(
            AssetCategory::Icon,
            AssetRole::Brand,
            Some(source_path),
            output,
            None,
            NOTIFICATION_SIZE,
            NOTIFICATION_SIZE,
            "png",
        ))
    }

    // ------------------------------------------------------------------
    // Adaptive icon
    // ------------------------------------------------------------------

    /// Background and foreground layer rasters.
    pub fn adaptive_layers(
        &self,
        source: &DynamicImage,
        source_path: Option<&Path>,
        primary: Rgb,
        res_dir: &Path,
    ) -> Result<Vec<ProcessedAsset>> {
        let layer_dir = res_dir.join(ADAPTIVE_LAYER_DIR);

        let background = RgbaImage::from_pixel(
            ADAPTIVE_CANVAS,
            ADAPTIVE_CANVAS,
            Rgba([primary.r, primary.g, primary.b, 255]),
        );
        let background_path = layer_dir.join("ic_launcher_background.png");
        write_png(&background, &background_path)?;

        let safe = resize::resize_fit(
            source,
            ADAPTIVE_SAFE_AREA,
            ADAPTIVE_SAFE_AREA,
            FitMode::Contain,
        );
        let foreground = resize::pad_symmetric(&safe, ADAPTIVE_PADDING);
        let foreground_path = layer_dir.join("ic_launcher_foreground.png");
        write_png(&foreground, &foreground_path)?;

        Ok(vec![
            ProcessedAsset::written(
                AssetCategory::Icon,
                AssetRole::Icon,
                None,
                background_path,
                Some(ADAPTIVE_LAYER_DIR),
                ADAPTIVE_CANVAS,
                ADAPTIVE_CANVAS,
                "png",
            ),
            ProcessedAsset::written(
                AssetCategory::Icon,
                AssetRole::Icon,
                source_path,
                foreground_path,
                Some(ADAPTIVE_LAYER_DIR),
                ADAPTIVE_CANVAS,
                ADAPTIVE_CANVAS,
                "png",
            ),
        ])
    }

    /// Density-independent descriptors; round and non-round variants
    /// reference the same layer pair.
    pub fn adaptive_descriptors(&self, res_dir: &Path) -> Result<Vec<ProcessedAsset>> {
        let dir = res_dir.join(ADAPTIVE_DESCRIPTOR_DIR);
        let mut out = Vec::with_capacity(2);
        for file in ["ic_launcher.xml", "ic_launcher_round.xml"] {
            let output = dir.join(file);
            write_text(&xml::adaptive_icon(), &output)?;
            out.push(ProcessedAsset::written(
                AssetCategory::Vector,
                AssetRole::Icon,
                None,
                output,
                None,
                0,
                0,
                "xml",
            ));
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Custom images
    // ------------------------------------------------------------------

    /// Re-encode a custom image as PNG under `drawable/`, scaled down
    /// when it exceeds the configured maximum dimension.
    pub fn custom_image(
        &self,
        name: &str,
        source_path: &Path,
        res_dir: &Path,
        role: AssetRole,
    ) -> Result<ProcessedAsset> {
        let source = self.load_source(source_path)?;
        let bounded = resize::shrink_to_fit(source, self.max_dimension);
        let raster = bounded.to_rgba8();

        let output = res_dir.join("drawable").join(format!("{name}.png"));
        write_png(&raster, &output)?;
        Ok(ProcessedAsset::written(
            AssetCategory::Image,
            role,
            Some(source_path),
            output,
            None,
            raster.width(),
            raster.height(),
            "png",
        ))
    }
}

// ----------------------------------------------------------------------
// Write helpers
// ----------------------------------------------------------------------

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    Ok(())
}

fn write_png(img: &RgbaImage, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    img.save(path)
        .with_context(|| format!("failed to write `{}`", path.display()))
}

fn write_text(content: &str, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, content).with_context(|| format!("failed to write `{}`", path.display()))
}

// ----------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------
