//! Pipeline orchestration.
//!
//! One build runs the phase sequence Validating -> Generating ->
//! Optimizing -> Scoring -> Converting; each phase consumes the prior
//! phase's full output set. Per-artifact work inside Generating and
//! Optimizing fans out on rayon and fans back in through collected
//! result vectors, so workers share no mutable state.
//!
//! Failure policy: per-asset problems degrade to warnings; only
//! structural failures - output directory creation, budget exhaustion,
//! cancellation, or a category-defining artifact that cannot be
//! produced at all - mark the run failed.


use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::asset::model::{AssetRole, PipelineAsset, PipelineResult, ProcessedAsset};
use crate::asset::validate::AssetValidator;
use crate::asset::{AssetKind, PartnerAssets};
use crate::config::PipelineConfig;
use crate::core::{BuildContext, Phase};
use crate::error::PipelineError;
use crate::generate::DensityGenerator;
use crate::generate::density::ICON_DENSITIES;
use crate::image::color::Rgb;
use crate::image::text::{IconShape, TextIconSynthesizer};
use crate::inject::execute::InjectionExecutor;
use crate::inject::plan::{AssetInjectionPlan, InjectionPlanner};
use crate::optimize::{FormatOptimizer, OptimizeOutcome};
use crate::quality::QualityScorer;
use crate::{debug, log};

/// Fallback primary when the partner color cannot be parsed.
const FALLBACK_PRIMARY: Rgb = Rgb { r: 0x21, g: 0x96, b: 0xF3 };

/// Canvas size for the synthesized adaptive-foreground source.
const FALLBACK_SOURCE_SIZE: u32 = 512;

/// One pipeline instance serves many builds; all per-build state lives
/// in the [`BuildContext`] and the returned [`PipelineResult`].
pub struct AssetPipeline {
    config: PipelineConfig,
}

/// Asset paths that survived validation.
#[derive(Default)]
struct ValidatedAssets {
    logo: Option<PathBuf>,
    splash: Option<PathBuf>,
    brand: Option<PathBuf>,
    favicon: Option<PathBuf>,
    custom: BTreeMap<String, PathBuf>,
    /// Splash was requested, valid or not (drives the always-present
    /// splash drawable)
    splash_requested: bool,
}

impl AssetPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // ==================================================================
    // process
    // ==================================================================

    /// Run the full processing pipeline for one build.
    pub fn process(&self, ctx: &BuildContext, assets: &PartnerAssets) -> PipelineResult {
        let started = Instant::now();
        let mut result = PipelineResult::new();

        log!(
            "pipeline";
            "starting asset pipeline for build {} (partner {})",
            ctx.build_id,
            ctx.partner_id
        );

        if let Err(err) = self.run_phases(ctx, assets, &mut result) {
            result.fail(err.to_string());
        }

        result.processing_time_ms = started.elapsed().as_millis() as u64;

        if result.success {
            ctx.report_phase(Phase::Completed);
            log!(
                "pipeline";
                "completed build {} in {}ms: {} assets, quality {:.1}",
                ctx.build_id,
                result.processing_time_ms,
                result.processed_assets.len(),
                result.quality_score
            );
        } else {
            ctx.report_phase(Phase::Failed);
            log!("error"; "pipeline failed for build {}: {:?}", ctx.build_id, result.errors);
        }

        result
    }

    fn run_phases(
        &self,
        ctx: &BuildContext,
        assets: &PartnerAssets,
        result: &mut PipelineResult,
    ) -> Result<(), PipelineError> {
        let res_dir = ctx.res_dir();
        fs::create_dir_all(&res_dir).map_err(|e| PipelineError::OutputDir(res_dir.clone(), e))?;

        // ---- Validating ------------------------------------------------
        ctx.report_phase(Phase::Validating);
        let validated = self.validate_assets(assets, result);
        self.checkpoint(ctx)?;

        // ---- Generating ------------------------------------------------
        ctx.report_phase(Phase::Generating);
        let mut processed = self.generate(ctx, &validated, result)?;
        self.checkpoint(ctx)?;

        // ---- Optimizing ------------------------------------------------
        ctx.report_phase(Phase::Optimizing);
        let outcomes = self.optimize(ctx, &mut processed, result);
        let mut pipeline_assets = self.wrap(ctx, &processed, &outcomes);
        self.checkpoint(ctx)?;

        // ---- Scoring ---------------------------------------------------
        ctx.report_phase(Phase::Scoring);
        let report = QualityScorer::new(&self.config).score(&mut pipeline_assets);
        result.quality_score = report.average_quality;
        result.warnings.extend(report.warnings);

        // ---- Converting ------------------------------------------------
        ctx.report_phase(Phase::Converting);
        self.convert(ctx, &mut pipeline_assets, result);
        self.checkpoint(ctx)?;

        result.processed_assets = pipeline_assets;
        Ok(())
    }

    /// Budget and cancellation gate between phases.
    fn checkpoint(&self, ctx: &BuildContext) -> Result<(), PipelineError> {
        if ctx.should_stop() {
            return Err(PipelineError::Cancelled);
        }
        ctx.check_budget(self.config.processing_budget())
    }

    // ==================================================================
    // Validating
    // ==================================================================

    /// Check every supplied source. Invalid uploads are reported as
    /// warnings, deleted, and dropped from further processing.
    fn validate_assets(
        &self,
        assets: &PartnerAssets,
        result: &mut PipelineResult,
    ) -> ValidatedAssets {
        let validator = AssetValidator::new(&self.config);
        let mut validated = ValidatedAssets {
            splash_requested: assets.splash_background.is_some(),
            ..ValidatedAssets::default()
        };

        for source in assets.entries() {
            let check = validator.validate(&source.path);
            if !check.valid {
                for error in &check.errors {
                    result.warn(format!("{} rejected: {error}", source.kind));
                }
                // the upload is useless to the build; drop it
                if source.path.exists() {
                    let _ = fs::remove_file(&source.path);
                    debug!("validate"; "deleted invalid upload {}", source.path.display());
                }
                continue;
            }

            match source.kind {
                AssetKind::Logo => validated.logo = Some(source.path),
                AssetKind::Splash => validated.splash = Some(source.path),
                AssetKind::BrandIcon => validated.brand = Some(source.path),
                AssetKind::Favicon => validated.favicon = Some(source.path),
                AssetKind::Custom => {}
            }
        }

        // custom images keep their resource names
        for (name, path) in &assets.custom_images {
            let check = validator.validate(path);
            if check.valid {
                validated.custom.insert(name.clone(), path.clone());
            }
        }

        validated
    }

    // ==================================================================
    // Generating
    // ==================================================================

    fn generate(
        &self,
        ctx: &BuildContext,
        validated: &ValidatedAssets,
        result: &mut PipelineResult,
    ) -> Result<Vec<ProcessedAsset>, PipelineError> {
        let generator = DensityGenerator::new(&self.config);
        let res_dir = ctx.res_dir();
        let primary = self.primary_color(ctx, result);
        let mut processed = Vec::new();

        // --- launcher icons (with synthesized fallback) ---
        let icon_source = self.generate_launcher_icons(
            ctx,
            &generator,
            validated,
            primary,
            &res_dir,
            &mut processed,
            result,
        )?;
        let icon_source_path = icon_source
            .as_ref()
            .and_then(|(_, path)| path.as_deref().map(Path::to_path_buf));

        // --- splash ---
        if validated.splash_requested {
            match generator.splash_xml(&res_dir) {
                Ok(asset) => processed.push(asset),
                Err(err) => result.fail(format!("splash drawable generation failed: {err:#}")),
            }
            if let Some(path) = &validated.splash {
                match generator.splash_image(path, &res_dir) {
                    Ok(asset) => processed.push(asset),
                    Err(err) => result.fail(format!("splash processing failed: {err:#}")),
                }
            }
        }

        // --- notification icon ---
        if let Some(path) = &validated.brand {
            match generator.notification_icon(path, &res_dir) {
                Ok(asset) => processed.push(asset),
                Err(err) => {
                    result.fail(format!("notification icon generation failed: {err:#}"))
                }
            }
        }

        // --- custom images + favicon ---
        let mut custom_jobs: Vec<(String, PathBuf, AssetRole)> = validated
            .custom
            .iter()
            .map(|(name, path)| (name.clone(), path.clone(), AssetRole::Custom))
            .collect();
        if let Some(path) = &validated.favicon {
            custom_jobs.push(("favicon".to_string(), path.clone(), AssetRole::Custom));
        }

        let custom_results: Vec<Result<ProcessedAsset, String>> = custom_jobs
            .par_iter()
            .map(|(name, path, role)| {
                if ctx.should_stop() {
                    return Err(format!("custom image `{name}` skipped: cancelled"));
                }
                generator
                    .custom_image(name, path, &res_dir, *role)
                    .map_err(|err| format!("custom image `{name}` failed: {err:#}"))
            })
            .collect();
        for item in custom_results {
            match item {
                Ok(asset) => processed.push(asset),
                Err(warning) => result.warn(warning),
            }
        }

        // --- adaptive icon ---
        match generator.adaptive_descriptors(&res_dir) {
            Ok(descriptors) => processed.extend(descriptors),
            Err(err) => result.warn(format!("adaptive descriptors failed: {err:#}")),
        }
        if let Some((source, _)) = &icon_source {
            match generator.adaptive_layers(
                source,
                icon_source_path.as_deref(),
                primary,
                &res_dir,
            ) {
                Ok(layers) => processed.extend(layers),
                Err(err) => result.warn(format!("adaptive layers failed: {err:#}")),
            }
        }

        log!("icons"; "generated {} artifacts for build {}", processed.len(), ctx.build_id);
        Ok(processed)
    }

    /// Generate the launcher icon set from the partner logo, or
    /// synthesize initials icons when no usable logo exists. Returns
    /// the source image reused for the adaptive foreground, with its
    /// originating path when it came from a partner file.
    #[allow(clippy::too_many_arguments)]
    fn generate_launcher_icons(
        &self,
        ctx: &BuildContext,
        generator: &DensityGenerator,
        validated: &ValidatedAssets,
        primary: Rgb,
        res_dir: &Path,
        processed: &mut Vec<ProcessedAsset>,
        result: &mut PipelineResult,
    ) -> Result<Option<(image::DynamicImage, Option<PathBuf>)>, PipelineError> {
        let decoded = match &validated.logo {
            Some(path) => match generator.load_source(path) {
                Ok(img) => Some((img, path.clone())),
                Err(err) => {
                    result.warn(format!("failed to decode logo: {err:#}"));
                    None
                }
            },
            None => None,
        };

        let icons: Vec<Result<Vec<ProcessedAsset>, String>> = match &decoded {
            Some((img, path)) => ICON_DENSITIES
                .par_iter()
                .map(|density| {
                    if ctx.should_stop() {
                        return Err(format!("{}: cancelled", density.name));
                    }
                    let square = generator
                        .launcher_icon(img, path, density, res_dir, AssetRole::Logo)
                        .map_err(|e| format!("{}: {e:#}", density.name))?;
                    let round = generator
                        .round_icon(img, path, density, res_dir, AssetRole::Logo)
                        .map_err(|e| format!("{}: {e:#}", density.name))?;
                    Ok(vec![square, round])
                })
                .collect(),
            None => {
                result.warn("no logo provided, using default icons".to_string());
                ICON_DENSITIES
                    .par_iter()
                    .map(|density| {
                        if ctx.should_stop() {
                            return Err(format!("{}: cancelled", density.name));
                        }
                        generator
                            .fallback_icon_pair(&ctx.branding.app_name, primary, density, res_dir)
                            .map_err(|e| format!("{}: {e:#}", density.name))
                    })
                    .collect()
            }
        };

        let mut produced = 0;
        for item in icons {
            match item {
                Ok(assets) => {
                    produced += assets.len();
                    processed.extend(assets);
                }
                Err(warning) => result.warn(format!("icon generation failed for {warning}")),
            }
        }
        if produced == 0 && !ctx.should_stop() {
            return Err(PipelineError::NoLauncherIcon);
        }

        // adaptive foreground source: the decoded logo, or the same
        // synthesized icon the launcher fallback used
        let source = match decoded {
            Some((img, path)) => Some((img, Some(path))),
            None => TextIconSynthesizer::synthesize(
                &ctx.branding.app_name,
                primary,
                FALLBACK_SOURCE_SIZE,
                IconShape::Square,
            )
            .map(|img| (image::DynamicImage::ImageRgba8(img), None))
            .map_err(|err| {
                result.warn(format!("fallback adaptive source failed: {err:#}"));
            })
            .ok(),
        };
        Ok(source)
    }

    fn primary_color(&self, ctx: &BuildContext, result: &mut PipelineResult) -> Rgb {
        match Rgb::parse(&ctx.branding.primary_color) {
            Ok(color) => color,
            Err(_) => {
                result.warn(format!(
                    "invalid primary color `{}`, using default",
                    ctx.branding.primary_color
                ));
                FALLBACK_PRIMARY
            }
        }
    }

    // ==================================================================
    // Optimizing
    // ==================================================================

    /// Optimize raster artifacts concurrently. Failures keep the
    /// unoptimized original and degrade to warnings.
    fn optimize(
        &self,
        ctx: &BuildContext,
        processed: &mut [ProcessedAsset],
        result: &mut PipelineResult,
    ) -> Vec<Option<OptimizeOutcome>> {
        if !self.config.output.optimize {
            return vec![None; processed.len()];
        }

        let optimizer = FormatOptimizer::new(&self.config);
        let jobs: Vec<(Option<OptimizeOutcome>, Option<String>)> = processed
            .par_iter_mut()
            .map(|asset| {
                if !asset.is_raster() || ctx.should_stop() {
                    return (None, None);
                }
                match optimizer.optimize(asset) {
                    Ok(outcome) => {
                        debug!(
                            "optimize";
                            "{}: {} -> {} bytes",
                            asset.output_path.display(),
                            outcome.original_size,
                            outcome.final_size
                        );
                        (Some(outcome), None)
                    }
                    Err(err) => (
                        None,
                        Some(format!(
                            "failed to optimize {}: {err:#}",
                            asset.output_path.display()
                        )),
                    ),
                }
            })
            .collect();

        let mut outcomes = Vec::with_capacity(jobs.len());
        for (outcome, warning) in jobs {
            if let Some(warning) = warning {
                result.warn(warning);
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Wrap processed artifacts into bookkeeping records.
    fn wrap(
        &self,
        ctx: &BuildContext,
        processed: &[ProcessedAsset],
        outcomes: &[Option<OptimizeOutcome>],
    ) -> Vec<PipelineAsset> {
        processed
            .iter()
            .zip(outcomes)
            .map(|(asset, outcome)| {
                let mut wrapped =
                    PipelineAsset::from_processed(asset, &ctx.build_id, &ctx.target_path);
                if let Some(outcome) = outcome {
                    wrapped.optimization.original_size = outcome.original_size;
                    wrapped.optimization.record_final(outcome.final_size);
                }
                if asset.role == AssetRole::Brand {
                    wrapped.metadata.insert(
                        "primary_color".to_string(),
                        ctx.branding.primary_color.clone(),
                    );
                    if let Some(dark) = &ctx.branding.primary_color_dark {
                        wrapped
                            .metadata
                            .insert("primary_color_dark".to_string(), dark.clone());
                    }
                }
                wrapped
            })
            .collect()
    }

    // ==================================================================
    // Converting
    // ==================================================================

    /// Emit extra-format siblings for PNG artifacts. A passthrough
    /// when no extra formats are configured.
    fn convert(
        &self,
        ctx: &BuildContext,
        assets: &mut [PipelineAsset],
        result: &mut PipelineResult,
    ) {
        let wants_webp = self.config.output.extra_formats().any(|f| f == "webp");
        if !wants_webp {
            return;
        }

        let optimizer = FormatOptimizer::new(&self.config);
        let conversions: Vec<(usize, Result<PathBuf, String>)> = assets
            .par_iter()
            .enumerate()
            .filter(|(_, asset)| asset.primary_format() == "png")
            .map(|(index, asset)| {
                if ctx.should_stop() {
                    return (index, Err("cancelled".to_string()));
                }
                let absolute = ctx.target_path.join(&asset.output_paths[0]);
                match optimizer.webp_sibling(&absolute) {
                    Ok((path, _)) => {
                        let relative = path
                            .strip_prefix(&ctx.target_path)
                            .unwrap_or(&path)
                            .to_path_buf();
                        (index, Ok(relative))
                    }
                    Err(err) => (index, Err(format!("{err:#}"))),
                }
            })
            .collect();

        for (index, conversion) in conversions {
            match conversion {
                Ok(path) => assets[index].add_variant(path, "webp"),
                Err(err) => result.warn(format!(
                    "webp conversion failed for {}: {err}",
                    assets[index].asset_id
                )),
            }
        }
    }

    // ==================================================================
    // plan / inject
    // ==================================================================

    /// Compute the injection plan for a successful run.
    pub fn plan(
        &self,
        ctx: &BuildContext,
        result: &PipelineResult,
    ) -> Result<AssetInjectionPlan, PipelineError> {
        InjectionPlanner::plan(ctx, result)
    }

    /// Apply an injection plan to the generated tree.
    pub fn inject(&self, plan: &AssetInjectionPlan) -> bool {
        InjectionExecutor::inject(plan)
    }
}
