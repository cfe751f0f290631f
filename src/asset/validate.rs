//! Shallow validation of candidate asset files.
//!
//! Checks existence, byte size and extension only. The file is never
//! decoded here; corrupt image data surfaces later as a generation
//! error for the affected artifacts.

use std::fs;
use std::path::Path;

use crate::config::{PipelineConfig, SUPPORTED_INPUT_FORMATS};

/// Outcome of validating one candidate file.
#[derive(Debug, Clone)]
pub struct AssetCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl AssetCheck {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn failed(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validates uploads against size/format constraints.
pub struct AssetValidator {
    max_file_size: u64,
}

impl AssetValidator {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            max_file_size: config.limits.max_file_size,
        }
    }

    /// Check one candidate file.
    ///
    /// A missing file short-circuits (nothing else is checkable);
    /// all other violations accumulate so the caller can present a
    /// complete diagnostic in one pass.
    pub fn validate(&self, path: &Path) -> AssetCheck {
        let Ok(meta) = fs::metadata(path) else {
            return AssetCheck::failed(vec![format!(
                "asset file does not exist: {}",
                path.display()
            )]);
        };
        if !meta.is_file() {
            return AssetCheck::failed(vec![format!("not a regular file: {}", path.display())]);
        }

        let mut errors = Vec::new();

        if meta.len() > self.max_file_size {
            errors.push(format!(
                "file size exceeds limit: {} > {}",
                meta.len(),
                self.max_file_size
            ));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_INPUT_FORMATS.contains(&ext.as_str()) {
            errors.push(format!("unsupported file format: {ext}"));
        }

        if errors.is_empty() {
            AssetCheck::ok()
        } else {
            AssetCheck::failed(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn validator() -> AssetValidator {
        AssetValidator::new(&PipelineConfig::default())
    }

    #[test]
    fn test_missing_file() {
        let check = validator().validate(Path::new("/nonexistent/logo.png"));
        assert!(!check.valid);
        assert_eq!(check.errors.len(), 1);
        assert!(check.errors[0].contains("does not exist"));
    }

    #[test]
    fn test_valid_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"fake png").unwrap();

        let check = validator().validate(&path);
        assert!(check.valid);
        assert!(check.errors.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("invalid-image.txt");
        fs::write(&path, b"not an image").unwrap();

        let check = validator().validate(&path);
        assert!(!check.valid);
        assert!(check.errors[0].contains("unsupported file format"));
    }

    #[test]
    fn test_violations_accumulate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.txt");
        fs::write(&path, b"x").unwrap();

        let mut config = PipelineConfig::default();
        config.limits.max_file_size = 0;
        // max_file_size = 0 would not pass config validation; it is
        // convenient here to make any file oversized.
        let check = AssetValidator::new(&config).validate(&path);
        assert!(!check.valid);
        assert_eq!(check.errors.len(), 2);
        assert!(check.errors.iter().any(|e| e.contains("exceeds limit")));
        assert!(check.errors.iter().any(|e| e.contains("unsupported")));
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.PNG");
        fs::write(&path, b"fake png").unwrap();

        assert!(validator().validate(&path).valid);
    }
}
