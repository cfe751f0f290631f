//! Whitemark - asset processing and injection for white-label app builds.
//!
//! Partner-supplied brand assets (logos, splash images, icons) are
//! transformed into a platform-correct set of density-specific
//! artifacts, scored, and wired into a generated project tree through
//! declarative injection points.
//!
//! The crate is a library boundary: the surrounding build service owns
//! uploads, persistence, and the native build step. One build maps to
//! one [`BuildContext`], one [`AssetPipeline::process`] run, and (on
//! success) one [`AssetPipeline::plan`] + [`AssetPipeline::inject`].
//!
//! ```no_run
//! use whitemark::{AssetPipeline, Branding, BuildContext, PartnerAssets, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let branding = Branding::new("Acme Pay", "#2196F3");
//! let ctx = BuildContext::new("build-42", "acme", branding, "/tmp/builds/acme/42");
//! let assets = PartnerAssets::default().with_logo("/tmp/uploads/acme/logo.png");
//!
//! let pipeline = AssetPipeline::new(config);
//! let result = pipeline.process(&ctx, &assets);
//! if result.success {
//!     let plan = pipeline.plan(&ctx, &result).unwrap();
//!     pipeline.inject(&plan);
//! }
//! ```

mod asset;
mod config;
mod core;
mod error;
mod generate;
mod image;
mod inject;
mod logger;
mod optimize;
mod pipeline;
mod quality;
mod utils;

pub use asset::model::{
    AssetCategory, AssetRole, Dimensions, OptimizationRecord, PipelineAsset, PipelineResult,
    PipelineStats, ProcessedAsset,
};
pub use asset::validate::{AssetCheck, AssetValidator};
pub use asset::{AssetKind, PartnerAssets, SourceAsset};
pub use config::{LimitsConfig, OutputConfig, PipelineConfig, QualityConfig};
pub use core::{
    Branding, BuildContext, CancelToken, ChannelProgress, NullProgress, Phase, ProgressSink,
};
pub use error::PipelineError;
pub use generate::DensityGenerator;
pub use generate::density::{DensitySpec, ICON_DENSITIES};
pub use image::color::Rgb;
pub use image::text::{IconShape, TextIconSynthesizer};
pub use inject::execute::InjectionExecutor;
pub use inject::plan::{
    AssetBuckets, AssetInjectionPlan, InjectionAction, InjectionKind, InjectionPlanner,
    InjectionPoint,
};
pub use optimize::{FormatOptimizer, OptimizeOutcome};
pub use pipeline::AssetPipeline;
pub use quality::{QualityReport, QualityScorer};
