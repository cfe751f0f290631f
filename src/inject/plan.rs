//! Injection planning.
//!
//! The planner partitions pipeline outputs into buckets and computes
//! the ordered list of file edits that wire them into the project
//! tree. Cross-point coupling (a style referencing a color another
//! point defines) is declared through `provides`/`requires` tags and
//! checked at plan time, so the plan is valid regardless of the order
//! the executor happens to write files in.

use std::path::PathBuf;

use serde::Serialize;

use crate::asset::model::{AssetRole, PipelineAsset, PipelineResult};
use crate::core::BuildContext;
use crate::error::PipelineError;
use crate::generate::xml;
use crate::image::color::Rgb;
use crate::log;

/// Default partner colors when no brand input carries any.
const DEFAULT_PRIMARY: &str = "#2196F3";
const DEFAULT_PRIMARY_DARK: &str = "#1976D2";

/// Lightness delta for a derived dark variant.
const DARK_VARIANT_AMOUNT: f64 = 0.12;

// ============================================================================
// Plan model
// ============================================================================

/// Which structured file class a point edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionKind {
    Resource,
    Manifest,
    Code,
    Gradle,
}

/// Edit strategy for one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionAction {
    /// Substitute the placeholder wherever it occurs; missing target
    /// files are skipped
    Replace,
    /// Append to the target, creating it (and parents) as needed
    Append,
    /// Splice before `</resources>`, synthesizing the wrapper when the
    /// target is missing
    Insert,
}

/// One declarative edit to one file in the generated tree.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionPoint {
    pub kind: InjectionKind,
    pub target_file: PathBuf,
    pub action: InjectionAction,
    pub content: String,
    pub placeholder: Option<String>,
    /// Resource names this point defines
    pub provides: Vec<String>,
    /// Resource names this point's content references
    pub requires: Vec<String>,
}

/// Pipeline outputs partitioned by their originating input.
#[derive(Debug, Default, Serialize)]
pub struct AssetBuckets {
    pub logos: Vec<PipelineAsset>,
    pub splash: Vec<PipelineAsset>,
    pub icons: Vec<PipelineAsset>,
    pub brand: Vec<PipelineAsset>,
    pub custom: Vec<PipelineAsset>,
}

/// Ordered edit list for one successful pipeline run.
#[derive(Debug, Serialize)]
pub struct AssetInjectionPlan {
    pub build_id: String,
    pub partner_id: String,
    pub target_path: PathBuf,
    pub assets: AssetBuckets,
    pub injection_points: Vec<InjectionPoint>,
}

// ============================================================================
// Planner
// ============================================================================

/// Computes the injection plan for one build.
pub struct InjectionPlanner;

impl InjectionPlanner {
    /// Build the plan from a successful pipeline result.
    ///
    /// Point order is fixed: manifest icon, splash style, partner
    /// colors. Every `requires` tag must be satisfied by some point's
    /// `provides` - anywhere in the plan, not necessarily earlier.
    pub fn plan(
        ctx: &BuildContext,
        result: &PipelineResult,
    ) -> Result<AssetInjectionPlan, PipelineError> {
        if !result.success {
            return Err(PipelineError::FailedPipeline);
        }
        log!("plan"; "creating injection plan for build {}", ctx.build_id);

        let assets = partition(&result.processed_assets);
        let mut points = Vec::new();

        if !assets.logos.is_empty() {
            points.push(InjectionPoint {
                kind: InjectionKind::Manifest,
                target_file: ctx.manifest_path(),
                action: InjectionAction::Replace,
                content: r#"android:icon="@mipmap/ic_launcher""#.to_string(),
                placeholder: Some(r#"android:icon="@mipmap/ic_launcher""#.to_string()),
                provides: vec![],
                requires: vec![],
            });
        }

        if !assets.splash.is_empty() {
            points.push(InjectionPoint {
                kind: InjectionKind::Resource,
                target_file: ctx.res_dir().join("values/styles.xml"),
                action: InjectionAction::Insert,
                content: xml::splash_theme_style(),
                placeholder: None,
                provides: vec!["style/SplashTheme".to_string()],
                requires: vec!["color/partner_primary".to_string()],
            });
        }

        let (primary, primary_dark) = partner_colors(ctx, &assets);
        points.push(InjectionPoint {
            kind: InjectionKind::Resource,
            target_file: ctx.res_dir().join("values/colors.xml"),
            action: InjectionAction::Replace,
            content: xml::partner_colors(&primary, &primary_dark),
            placeholder: Some("<!-- PARTNER_COLORS -->".to_string()),
            provides: vec![
                "color/partner_primary".to_string(),
                "color/partner_primary_dark".to_string(),
            ],
            requires: vec![],
        });

        check_requirements(&points)?;

        Ok(AssetInjectionPlan {
            build_id: ctx.build_id.clone(),
            partner_id: ctx.partner_id.clone(),
            target_path: ctx.target_path.clone(),
            assets,
            injection_points: points,
        })
    }
}

/// Split assets into the five plan buckets by originating role.
fn partition(assets: &[PipelineAsset]) -> AssetBuckets {
    let mut buckets = AssetBuckets::default();
    for asset in assets {
        let bucket = match asset.role {
            AssetRole::Logo => &mut buckets.logos,
            AssetRole::Splash => &mut buckets.splash,
            AssetRole::Icon => &mut buckets.icons,
            AssetRole::Brand => &mut buckets.brand,
            AssetRole::Custom => &mut buckets.custom,
        };
        bucket.push(asset.clone());
    }
    buckets
}

/// Resolve the injected color pair: partner branding, brand-asset
/// metadata, then the stock defaults. The dark variant is derived via
/// HSL darken when only a primary exists.
fn partner_colors(ctx: &BuildContext, assets: &AssetBuckets) -> (String, String) {
    let from_brand = |key: &str| {
        assets
            .brand
            .first()
            .and_then(|asset| asset.metadata.get(key).cloned())
    };

    let primary = from_brand("primary_color")
        .unwrap_or_else(|| ctx.branding.primary_color.clone());
    let primary = match Rgb::parse(&primary) {
        Ok(color) => color.to_hex(),
        Err(_) => {
            log!("warning"; "invalid primary color `{primary}`, using default");
            DEFAULT_PRIMARY.to_string()
        }
    };

    let dark = from_brand("primary_color_dark")
        .or_else(|| ctx.branding.primary_color_dark.clone());
    let dark = match dark {
        Some(hex) => match Rgb::parse(&hex) {
            Ok(color) => color.to_hex(),
            Err(_) => DEFAULT_PRIMARY_DARK.to_string(),
        },
        None => match Rgb::parse(&primary) {
            Ok(color) => color.darken(DARK_VARIANT_AMOUNT).to_hex(),
            Err(_) => DEFAULT_PRIMARY_DARK.to_string(),
        },
    };

    (primary, dark)
}

/// Every requirement must have a provider somewhere in the plan.
fn check_requirements(points: &[InjectionPoint]) -> Result<(), PipelineError> {
    for point in points {
        for requirement in &point.requires {
            let satisfied = points
                .iter()
                .any(|p| p.provides.iter().any(|r| r == requirement));
            if !satisfied {
                return Err(PipelineError::UnsatisfiedRequirement(requirement.clone()));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::model::{AssetCategory, ProcessedAsset};
    use crate::core::Branding;
    use std::path::Path;

    fn ctx() -> BuildContext {
        BuildContext::new(
            "b1",
            "acme",
            Branding::new("Acme Pay", "#2196F3"),
            "/builds/acme/b1",
        )
    }

    fn wrapped(role: AssetRole, path: &str) -> PipelineAsset {
        let processed = ProcessedAsset {
            category: AssetCategory::Icon,
            role,
            source_path: None,
            output_path: PathBuf::from(format!("/builds/acme/b1/{path}")),
            density: None,
            width: 48,
            height: 48,
            file_size: 100,
            format: "png".to_string(),
            optimized: false,
        };
        PipelineAsset::from_processed(&processed, "b1", Path::new("/builds/acme/b1"))
    }

    fn result_with(roles: &[AssetRole]) -> PipelineResult {
        let mut result = PipelineResult::new();
        for (i, role) in roles.iter().enumerate() {
            result
                .processed_assets
                .push(wrapped(*role, &format!("res/a{i}.png")));
        }
        result
    }

    #[test]
    fn test_partition_buckets() {
        let result = result_with(&[
            AssetRole::Logo,
            AssetRole::Logo,
            AssetRole::Splash,
            AssetRole::Brand,
            AssetRole::Custom,
            AssetRole::Icon,
        ]);
        let buckets = partition(&result.processed_assets);
        assert_eq!(buckets.logos.len(), 2);
        assert_eq!(buckets.splash.len(), 1);
        assert_eq!(buckets.brand.len(), 1);
        assert_eq!(buckets.custom.len(), 1);
        assert_eq!(buckets.icons.len(), 1);
    }

    #[test]
    fn test_plan_order_and_points() {
        let plan = InjectionPlanner::plan(
            &ctx(),
            &result_with(&[AssetRole::Logo, AssetRole::Splash]),
        )
        .unwrap();

        let kinds: Vec<InjectionKind> =
            plan.injection_points.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![InjectionKind::Manifest, InjectionKind::Resource, InjectionKind::Resource]
        );
        assert_eq!(plan.injection_points[1].action, InjectionAction::Insert);
        assert_eq!(plan.injection_points[2].action, InjectionAction::Replace);
    }

    #[test]
    fn test_color_point_always_planned() {
        let plan = InjectionPlanner::plan(&ctx(), &result_with(&[])).unwrap();
        assert_eq!(plan.injection_points.len(), 1);
        let point = &plan.injection_points[0];
        assert!(point.content.contains("partner_primary"));
        assert!(point.content.contains("#2196F3"));
    }

    #[test]
    fn test_dark_variant_derived_when_absent() {
        let plan = InjectionPlanner::plan(&ctx(), &result_with(&[])).unwrap();
        let content = &plan.injection_points[0].content;
        // derived dark variant must differ from the primary
        let dark = Rgb::parse("#2196F3").unwrap().darken(0.12).to_hex();
        assert!(content.contains(&dark));
        assert_ne!(dark, "#2196F3");
    }

    #[test]
    fn test_explicit_dark_variant_wins() {
        let ctx = BuildContext::new(
            "b1",
            "acme",
            Branding::new("Acme Pay", "#2196F3").with_dark_variant("#112233"),
            "/builds/acme/b1",
        );
        let plan = InjectionPlanner::plan(&ctx, &result_with(&[])).unwrap();
        assert!(plan.injection_points[0].content.contains("#112233"));
    }

    #[test]
    fn test_invalid_primary_falls_back_to_default() {
        let ctx = BuildContext::new(
            "b1",
            "acme",
            Branding::new("Acme Pay", "not-a-color"),
            "/builds/acme/b1",
        );
        let plan = InjectionPlanner::plan(&ctx, &result_with(&[])).unwrap();
        assert!(plan.injection_points[0].content.contains(DEFAULT_PRIMARY));
    }

    #[test]
    fn test_splash_requirement_satisfied_by_color_point() {
        let plan =
            InjectionPlanner::plan(&ctx(), &result_with(&[AssetRole::Splash])).unwrap();
        let style = &plan.injection_points[0];
        assert_eq!(style.requires, vec!["color/partner_primary"]);
        // provider exists later in the plan; plan() already checked it
        assert!(
            plan.injection_points
                .iter()
                .any(|p| p.provides.iter().any(|r| r == "color/partner_primary"))
        );
    }

    #[test]
    fn test_unsatisfied_requirement_rejected() {
        let points = vec![InjectionPoint {
            kind: InjectionKind::Resource,
            target_file: PathBuf::from("styles.xml"),
            action: InjectionAction::Insert,
            content: String::new(),
            placeholder: None,
            provides: vec![],
            requires: vec!["color/missing".to_string()],
        }];
        assert!(matches!(
            check_requirements(&points),
            Err(PipelineError::UnsatisfiedRequirement(_))
        ));
    }

    #[test]
    fn test_failed_result_cannot_be_planned() {
        let mut result = result_with(&[AssetRole::Logo]);
        result.fail("disk full");
        assert!(matches!(
            InjectionPlanner::plan(&ctx(), &result),
            Err(PipelineError::FailedPipeline)
        ));
    }

    #[test]
    fn test_manifest_point_only_with_logo_derived_icons() {
        let plan = InjectionPlanner::plan(&ctx(), &result_with(&[AssetRole::Icon])).unwrap();
        assert!(
            plan.injection_points
                .iter()
                .all(|p| p.kind != InjectionKind::Manifest)
        );
    }
}
