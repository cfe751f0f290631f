//! Source asset types and validation.

pub mod model;
pub mod validate;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

// ============================================================================
// AssetKind
// ============================================================================

/// Declared type of an uploaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Logo,
    Splash,
    BrandIcon,
    Favicon,
    Custom,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssetKind::Logo => "logo",
            AssetKind::Splash => "splash",
            AssetKind::BrandIcon => "brand-icon",
            AssetKind::Favicon => "favicon",
            AssetKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SourceAsset
// ============================================================================

/// One uploaded file as handed over by the build service.
///
/// Read-only to the pipeline; the upload is deleted by the service
/// after processing, or by the validation phase when it is rejected.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub kind: AssetKind,
    /// Byte size at hand-over time (0 when the file is missing)
    pub size: u64,
    /// MIME type as declared by the uploader, not sniffed
    pub declared_mime: Option<String>,
}

impl SourceAsset {
    pub fn new(path: impl Into<PathBuf>, kind: AssetKind) -> Self {
        let path = path.into();
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self {
            path,
            kind,
            size,
            declared_mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    /// Lower-cased file extension, empty when absent.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

// ============================================================================
// PartnerAssets
// ============================================================================

/// The named asset slots of one build request.
///
/// Custom images are keyed by resource name; a `BTreeMap` keeps
/// processing order deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct PartnerAssets {
    pub logo: Option<PathBuf>,
    pub splash_background: Option<PathBuf>,
    pub brand_icon: Option<PathBuf>,
    pub favicon: Option<PathBuf>,
    pub custom_images: BTreeMap<String, PathBuf>,
}

impl PartnerAssets {
    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(path.into());
        self
    }

    pub fn with_splash(mut self, path: impl Into<PathBuf>) -> Self {
        self.splash_background = Some(path.into());
        self
    }

    pub fn with_brand_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.brand_icon = Some(path.into());
        self
    }

    pub fn with_favicon(mut self, path: impl Into<PathBuf>) -> Self {
        self.favicon = Some(path.into());
        self
    }

    pub fn with_custom_image(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.custom_images.insert(name.into(), path.into());
        self
    }

    /// Flatten the named slots into [`SourceAsset`] records for
    /// validation, in a fixed order.
    pub fn entries(&self) -> Vec<SourceAsset> {
        let mut entries = Vec::new();
        if let Some(path) = &self.logo {
            entries.push(SourceAsset::new(path, AssetKind::Logo));
        }
        if let Some(path) = &self.splash_background {
            entries.push(SourceAsset::new(path, AssetKind::Splash));
        }
        if let Some(path) = &self.brand_icon {
            entries.push(SourceAsset::new(path, AssetKind::BrandIcon));
        }
        if let Some(path) = &self.favicon {
            entries.push(SourceAsset::new(path, AssetKind::Favicon));
        }
        for path in self.custom_images.values() {
            entries.push(SourceAsset::new(path, AssetKind::Custom));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_cover_all_slots() {
        let assets = PartnerAssets::default()
            .with_logo("/u/logo.png")
            .with_splash("/u/splash.jpg")
            .with_custom_image("banner", "/u/banner.png");

        let kinds: Vec<AssetKind> = assets.entries().iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AssetKind::Logo, AssetKind::Splash, AssetKind::Custom]);
        // missing files report a zero size rather than failing
        assert_eq!(assets.entries()[0].size, 0);
    }

    #[test]
    fn test_extension_is_lowercased() {
        let asset = SourceAsset::new("/u/LOGO.PNG", AssetKind::Logo);
        assert_eq!(asset.extension(), "png");
    }
}
