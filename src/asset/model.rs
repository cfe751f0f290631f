//! Artifact records produced by the pipeline.
//!
//! `ProcessedAsset` is the generation-time record (absolute paths,
//! mutated only by optimization). `PipelineAsset` is the bookkeeping
//! wrapper handed back to the build service: relative paths only,
//! deterministic ids, serializable as JSON.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::utils::hash;

// ============================================================================
// Categories and roles
// ============================================================================

/// What an artifact is, structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Icon,
    Splash,
    Image,
    Vector,
}

/// Which partner input an artifact derives from. Drives injection-plan
/// bucket partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    /// Launcher icons derived from the partner logo
    Logo,
    /// Generated icons with no partner source (fallback, adaptive)
    Icon,
    Splash,
    Brand,
    Custom,
}

// ============================================================================
// ProcessedAsset
// ============================================================================

/// One artifact written to disk by a generator.
///
/// Never mutated after creation except for `file_size`/`optimized`,
/// which the optimizer updates in place.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedAsset {
    pub category: AssetCategory,
    pub role: AssetRole,
    /// Partner source file; `None` for synthesized artifacts
    pub source_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub density: Option<String>,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub format: String,
    pub optimized: bool,
}

impl ProcessedAsset {
    /// Record an artifact freshly written to `output_path`.
    pub fn written(
        category: AssetCategory,
        role: AssetRole,
        source_path: Option<&Path>,
        output_path: PathBuf,
        density: Option<&str>,
        width: u32,
        height: u32,
        format: &str,
    ) -> Self {
        let file_size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
        Self {
            category,
            role,
            source_path: source_path.map(Path::to_path_buf),
            output_path,
            density: density.map(str::to_string),
            width,
            height,
            file_size,
            format: format.to_string(),
            optimized: false,
        }
    }

    /// True for formats the optimizer can re-encode.
    pub fn is_raster(&self) -> bool {
        crate::config::OPTIMIZABLE_FORMATS.contains(&self.format.as_str())
    }
}

// ============================================================================
// PipelineAsset
// ============================================================================

/// Pixel dimensions of one density variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Size accounting for one artifact's optimization step.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationRecord {
    pub original_size: u64,
    pub final_size: u64,
    /// `(original - final) / original * 100`, never negative
    pub compression_ratio: f64,
    pub quality_score: f64,
}

impl OptimizationRecord {
    pub fn unoptimized(size: u64) -> Self {
        Self {
            original_size: size,
            final_size: size,
            compression_ratio: 0.0,
            quality_score: 100.0,
        }
    }

    /// Record the post-optimization size. `final_size` larger than the
    /// original is a caller bug (the optimizer discards growth), so the
    /// ratio is clamped at zero.
    pub fn record_final(&mut self, final_size: u64) {
        self.final_size = final_size;
        self.compression_ratio = if self.original_size == 0 {
            0.0
        } else {
            let saved = self.original_size.saturating_sub(final_size) as f64;
            saved / self.original_size as f64 * 100.0
        };
    }
}

/// Bookkeeping wrapper for one artifact, as reported to the service.
///
/// All paths are relative to the build target root - internal absolute
/// paths never leave the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineAsset {
    pub asset_id: String,
    pub category: AssetCategory,
    pub role: AssetRole,
    pub output_paths: Vec<PathBuf>,
    pub formats: Vec<String>,
    pub sizes: BTreeMap<String, Dimensions>,
    pub optimization: OptimizationRecord,
    pub metadata: BTreeMap<String, String>,
}

impl PipelineAsset {
    /// Wrap a processed artifact, relativizing its path against the
    /// build target root.
    pub fn from_processed(asset: &ProcessedAsset, build_id: &str, target_root: &Path) -> Self {
        let relative = asset
            .output_path
            .strip_prefix(target_root)
            .unwrap_or(&asset.output_path)
            .to_path_buf();
        let asset_id = hash::asset_id(build_id, &relative.to_string_lossy());

        let mut sizes = BTreeMap::new();
        if asset.width > 0 {
            let density = asset.density.clone().unwrap_or_else(|| "default".to_string());
            sizes.insert(
                density,
                Dimensions {
                    width: asset.width,
                    height: asset.height,
                },
            );
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("build_id".to_string(), build_id.to_string());
        if let Some(density) = &asset.density {
            metadata.insert("density".to_string(), density.clone());
        }

        Self {
            asset_id,
            category: asset.category,
            role: asset.role,
            output_paths: vec![relative],
            formats: vec![asset.format.clone()],
            sizes,
            optimization: OptimizationRecord::unoptimized(asset.file_size),
            metadata,
        }
    }

    /// Primary output format (first produced).
    pub fn primary_format(&self) -> &str {
        self.formats.first().map(String::as_str).unwrap_or("")
    }

    /// Register an additional converted output (e.g. a WEBP sibling).
    pub fn add_variant(&mut self, path: PathBuf, format: &str) {
        self.output_paths.push(path);
        self.formats.push(format.to_string());
    }
}

// ============================================================================
// PipelineResult
// ============================================================================

/// Aggregate, serializable outcome of one build's pipeline run.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    pub processed_assets: Vec<PipelineAsset>,
    /// Fatal problems; non-empty implies `success == false`
    pub errors: Vec<String>,
    /// Advisory problems; never block the build
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
    pub quality_score: f64,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self {
            success: true,
            processed_assets: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            processing_time_ms: 0,
            quality_score: 0.0,
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.success = false;
        self.errors.push(message.into());
    }

    /// Machine-readable form for the build record.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Summary statistics over the processed assets.
    pub fn stats(&self) -> PipelineStats {
        let total = self.processed_assets.len();
        let mean_compression = if total == 0 {
            0.0
        } else {
            self.processed_assets
                .iter()
                .map(|a| a.optimization.compression_ratio)
                .sum::<f64>()
                / total as f64
        };

        let mut format_distribution = BTreeMap::new();
        for asset in &self.processed_assets {
            for format in &asset.formats {
                *format_distribution.entry(format.clone()).or_insert(0) += 1;
            }
        }

        PipelineStats {
            total_assets: total,
            processing_time_ms: self.processing_time_ms,
            quality_score: self.quality_score,
            mean_compression,
            format_distribution,
        }
    }
}

impl Default for PipelineResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregated numbers for dashboards and build records.
#[derive(Debug, Serialize)]
pub struct PipelineStats {
    pub total_assets: usize,
    pub processing_time_ms: u64,
    pub quality_score: f64,
    pub mean_compression: f64,
    pub format_distribution: BTreeMap<String, usize>,
}

// ============================================================================
// Tests
// ============================================================================
