//! Advisory quality scoring.
//!
//! Scores combine compression efficiency and format compliance. They
//! inform the build record and may emit warnings; they never gate the
//! pipeline.

use crate::asset::model::PipelineAsset;
use crate::config::PipelineConfig;

/// Aggregate scoring outcome.
#[derive(Debug)]
pub struct QualityReport {
    /// Arithmetic mean of per-asset scores; 100 for an empty set
    pub average_quality: f64,
    pub warnings: Vec<String>,
}

/// Scores processed assets against the configured expectations.
pub struct QualityScorer {
    threshold: f64,
    compression_warn_ratio: f64,
    allowed_formats: Vec<String>,
}

impl QualityScorer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            threshold: config.quality.threshold,
            compression_warn_ratio: config.quality.compression_warn_ratio,
            allowed_formats: config.output.formats.clone(),
        }
    }

    /// Score every asset in place and compute the aggregate.
    ///
    /// Deductions per asset, starting from 100:
    /// - 10 when the compression ratio is below the warning threshold
    /// - 15 when the primary format is outside the allow-list
    pub fn score(&self, assets: &mut [PipelineAsset]) -> QualityReport {
        let mut warnings = Vec::new();
        let mut total = 0.0;

        for asset in assets.iter_mut() {
            let mut score: f64 = 100.0;

            if asset.optimization.compression_ratio < self.compression_warn_ratio {
                score -= 10.0;
                warnings.push(format!(
                    "asset {} has a low compression ratio ({:.1}%)",
                    asset.asset_id, asset.optimization.compression_ratio
                ));
            }

            let primary = asset.primary_format().to_string();
            if !self.allowed_formats.iter().any(|f| f == &primary) {
                score -= 15.0;
                warnings.push(format!(
                    "asset {} uses non-optimal format `{primary}`",
                    asset.asset_id
                ));
            }

            asset.optimization.quality_score = score.clamp(0.0, 100.0);
            total += asset.optimization.quality_score;
        }

        let average_quality = if assets.is_empty() {
            100.0
        } else {
            total / assets.len() as f64
        };

        if average_quality < self.threshold {
            warnings.push(format!(
                "overall quality score {average_quality:.1} below threshold {}",
                self.threshold
            ));
        }

        QualityReport {
            average_quality,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::model::{AssetCategory, AssetRole, ProcessedAsset};
    use std::path::{Path, PathBuf};

    fn asset(format: &str, ratio: f64) -> PipelineAsset {
        let processed = ProcessedAsset {
            category: AssetCategory::Icon,
            role: AssetRole::Logo,
            source_path: None,
            output_path: PathBuf::from("/root/res/icon.png"),
            density: None,
            width: 48,
            height: 48,
            file_size: 1000,
            format: format.to_string(),
            optimized: true,
        };
        let mut wrapped = PipelineAsset::from_processed(&processed, "b1", Path::new("/root"));
        wrapped.optimization.original_size = 1000;
        wrapped.optimization.record_final((1000.0 * (100.0 - ratio) / 100.0) as u64);
        wrapped
    }

    fn scorer() -> QualityScorer {
        QualityScorer::new(&PipelineConfig::default())
    }

    #[test]
    fn test_empty_set_is_vacuously_perfect() {
        let report = scorer().score(&mut []);
        assert_eq!(report.average_quality, 100.0);
        // 100 >= 85, no threshold warning
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_well_compressed_allowed_format_scores_100() {
        let mut assets = vec![asset("png", 30.0)];
        let report = scorer().score(&mut assets);
        assert_eq!(report.average_quality, 100.0);
        assert_eq!(assets[0].optimization.quality_score, 100.0);
    }

    #[test]
    fn test_low_compression_deducts_10() {
        let mut assets = vec![asset("png", 5.0)];
        let report = scorer().score(&mut assets);
        assert_eq!(report.average_quality, 90.0);
        assert!(report.warnings.iter().any(|w| w.contains("low compression")));
    }

    #[test]
    fn test_disallowed_format_deducts_15() {
        let mut assets = vec![asset("jpeg", 30.0)];
        let report = scorer().score(&mut assets);
        assert_eq!(report.average_quality, 85.0);
        assert!(report.warnings.iter().any(|w| w.contains("non-optimal format")));
    }

    #[test]
    fn test_both_deductions_and_threshold_warning() {
        let mut assets = vec![asset("jpeg", 0.0)];
        let report = scorer().score(&mut assets);
        assert_eq!(report.average_quality, 75.0);
        assert!(report.warnings.iter().any(|w| w.contains("below threshold")));
    }

    #[test]
    fn test_scores_stay_in_bounds() {
        let mut assets = vec![asset("jpeg", 0.0), asset("png", 50.0), asset("webp", 0.0)];
        let report = scorer().score(&mut assets);
        assert!(report.average_quality >= 0.0 && report.average_quality <= 100.0);
        for asset in &assets {
            let score = asset.optimization.quality_score;
            assert!((0.0..=100.0).contains(&score));
        }
    }
}
