//! Artifact re-encoding.
//!
//! Each artifact is re-encoded to a temporary sibling file and then
//! renamed over the original, so a crash mid-write never leaves a
//! truncated image in the output tree. A re-encode that comes out
//! larger than the original is discarded; optimization never grows an
//! artifact.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType};

use crate::asset::model::ProcessedAsset;
use crate::config::PipelineConfig;

/// Size accounting for one optimize step.
#[derive(Debug, Clone, Copy)]
pub struct OptimizeOutcome {
    pub original_size: u64,
    pub final_size: u64,
}

/// Re-encodes generated artifacts at the configured quality.
pub struct FormatOptimizer {
    jpeg_quality: u8,
}

impl FormatOptimizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            jpeg_quality: config.quality.jpeg,
        }
    }

    /// Re-encode one raster artifact in place.
    ///
    /// Updates the asset's `file_size` and `optimized` fields and
    /// returns the before/after sizes. Non-raster artifacts are
    /// rejected by the caller via [`ProcessedAsset::is_raster`].
    pub fn optimize(&self, asset: &mut ProcessedAsset) -> Result<OptimizeOutcome> {
        let path = asset.output_path.clone();
        let original_size = fs::metadata(&path)
            .with_context(|| format!("failed to stat `{}`", path.display()))?
            .len();

        let img = image::open(&path)
            .with_context(|| format!("failed to decode `{}`", path.display()))?;

        let tmp = tmp_path(&path);
        self.encode(&img, &tmp, &asset.format)?;
        let candidate_size = fs::metadata(&tmp).map(|m| m.len()).unwrap_or(u64::MAX);

        let final_size = if candidate_size < original_size {
            fs::rename(&tmp, &path)
                .with_context(|| format!("failed to replace `{}`", path.display()))?;
            candidate_size
        } else {
            // keep the original, drop the failed attempt
            let _ = fs::remove_file(&tmp);
            original_size
        };

        asset.file_size = final_size;
        asset.optimized = true;
        Ok(OptimizeOutcome {
            original_size,
            final_size,
        })
    }

    /// Encode a WEBP sibling next to a PNG artifact (conversion phase).
    ///
    /// Returns the new path and its byte size.
    pub fn webp_sibling(&self, path: &Path) -> Result<(PathBuf, u64)> {
        let img = image::open(path)
            .with_context(|| format!("failed to decode `{}`", path.display()))?;
        let output = path.with_extension("webp");
        self.encode(&img, &output, "webp")?;
        let size = fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
        Ok((output, size))
    }

    fn encode(&self, img: &DynamicImage, output: &Path, format: &str) -> Result<()> {
        let file = File::create(output)
            .with_context(|| format!("failed to create `{}`", output.display()))?;
        let writer = BufWriter::new(file);

        match format {
            "png" => {
                let rgba = img.to_rgba8();
                let encoder =
                    PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
                rgba.write_with_encoder(encoder)?;
            }
            "jpg" | "jpeg" => {
                // JPEG has no alpha channel
                let rgb = img.to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(writer, self.jpeg_quality);
                encoder.encode(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )?;
            }
            "webp" => {
                let rgba = img.to_rgba8();
                let encoder = WebPEncoder::new_lossless(writer);
                rgba.write_with_encoder(encoder)?;
            }
            other => bail!("cannot re-encode format `{other}`"),
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
