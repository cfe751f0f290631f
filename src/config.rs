//! Pipeline configuration.
//!
//! Embedding services usually build a [`PipelineConfig`] in code, but a
//! TOML file with the same shape is accepted for parity with service
//! deployment configs:
//!
//! ```toml
//! [limits]
//! max_file_size = 10485760
//! processing_budget_secs = 120
//!
//! [quality]
//! threshold = 85.0
//!
//! [output]
//! formats = ["png", "webp"]
//! ```
//!
//! Every field has a default, so an empty file (or `Default::default()`)
//! is a complete, valid configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Formats the validator accepts as pipeline input
pub const SUPPORTED_INPUT_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "svg"];

/// Formats the optimizer can re-encode
pub const OPTIMIZABLE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

// ============================================================================
// root configuration
// ============================================================================

/// Root pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input limits and the per-build processing budget
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Encoder quality and the advisory scoring threshold
    #[serde(default)]
    pub quality: QualityConfig,

    /// Output format set and optimization toggle
    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config `{}`", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config `{}`", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges. All violations are reported in one error.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut problems = Vec::new();

        if self.limits.max_file_size == 0 {
            problems.push("limits.max_file_size must be non-zero".to_string());
        }
        if self.limits.processing_budget_secs == 0 {
            problems.push("limits.processing_budget_secs must be non-zero".to_string());
        }
        if !(0.0..=100.0).contains(&self.quality.threshold) {
            problems.push(format!(
                "quality.threshold must be within 0..=100, got {}",
                self.quality.threshold
            ));
        }
        if self.output.formats.is_empty() {
            problems.push("output.formats must name at least one format".to_string());
        }
        for format in &self.output.formats {
            if !OPTIMIZABLE_FORMATS.contains(&format.as_str()) {
                problems.push(format!("output.formats: `{format}` is not an encodable format"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Config(problems.join("; ")))
        }
    }

    /// Per-build processing budget as a [`Duration`].
    pub fn processing_budget(&self) -> Duration {
        Duration::from_secs(self.limits.processing_budget_secs)
    }
}

// ============================================================================
// [limits]
// ============================================================================

/// Input limits and the processing-time budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Maximum source dimension on either axis; larger custom images
    /// are scaled down to fit
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Wall-clock budget for one build's pipeline run, in seconds
    #[serde(default = "default_processing_budget")]
    pub processing_budget_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_dimension: default_max_dimension(),
            processing_budget_secs: default_processing_budget(),
        }
    }
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_dimension() -> u32 {
    4096
}

fn default_processing_budget() -> u64 {
    120
}

// ============================================================================
// [quality]
// ============================================================================

/// Encoder quality settings and the advisory scoring threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// JPEG re-encode quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg: u8,

    /// Aggregate score below this emits a summary warning (never fails
    /// the build)
    #[serde(default = "default_quality_threshold")]
    pub threshold: f64,

    /// Per-asset compression ratios below this percentage emit a
    /// poor-optimization warning
    #[serde(default = "default_compression_warn_ratio")]
    pub compression_warn_ratio: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            jpeg: default_jpeg_quality(),
            threshold: default_quality_threshold(),
            compression_warn_ratio: default_compression_warn_ratio(),
        }
    }
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_quality_threshold() -> f64 {
    85.0
}

fn default_compression_warn_ratio() -> f64 {
    10.0
}

// ============================================================================
// [output]
// ============================================================================

/// Output format allow-list and optimization toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Formats the build is expected to ship. The first entry is the
    /// primary encode target; extra entries trigger the conversion
    /// phase (e.g. a WEBP sibling for every PNG).
    #[serde(default = "default_output_formats")]
    pub formats: Vec<String>,

    /// Run the optimization phase (re-encode artifacts in place)
    #[serde(default = "default_true")]
    pub optimize: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: default_output_formats(),
            optimize: default_true(),
        }
    }
}

impl OutputConfig {
    /// Extra target formats beyond the primary one.
    pub fn extra_formats(&self) -> impl Iterator<Item = &str> {
        self.formats.iter().skip(1).map(String::as_str)
    }
}

fn default_output_formats() -> Vec<String> {
    vec!["png".to_string(), "webp".to_string()]
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.limits.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.limits.processing_budget_secs, 120);
        assert_eq!(config.quality.threshold, 85.0);
        assert_eq!(config.output.formats, vec!["png", "webp"]);
        assert!(config.output.optimize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_complete() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.quality.jpeg, 85);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [quality]
            threshold = 70.0

            [output]
            formats = ["png"]
            "#,
        )
        .unwrap();
        assert_eq!(config.quality.threshold, 70.0);
        assert_eq!(config.output.formats, vec!["png"]);
        // untouched sections keep their defaults
        assert_eq!(config.limits.max_dimension, 4096);
    }

    #[test]
    fn test_validate_collects_all_problems() {
        let mut config = PipelineConfig::default();
        config.quality.threshold = 150.0;
        config.output.formats = vec!["bmp".to_string()];

        let err = config.validate().unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("threshold"));
        assert!(message.contains("bmp"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("whitemark.toml");
        fs::write(&path, "[limits]\nprocessing_budget_secs = 30\n").unwrap();

        let config = PipelineConfig::from_path(&path).unwrap();
        assert_eq!(config.processing_budget(), Duration::from_secs(30));

        assert!(PipelineConfig::from_path(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_extra_formats() {
        let output = OutputConfig::default();
        let extra: Vec<&str> = output.extra_formats().collect();
        assert_eq!(extra, vec!["webp"]);
    }
}
