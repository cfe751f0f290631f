//! Structural pipeline errors.
//!
//! Per-asset validation and transform problems are collected into
//! [`PipelineResult`](crate::asset::model::PipelineResult) as strings
//! rather than raised, so one bad asset never aborts the rest. Only the
//! failures below abort a phase outright.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort the orchestrator rather than degrade to warnings
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to create output directory `{0}`")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("processing budget of {}s exceeded", .0.as_secs())]
    Timeout(Duration),

    #[error("build was cancelled")]
    Cancelled,

    #[error("no launcher icon could be produced")]
    NoLauncherIcon,

    #[error("invalid brand color `{0}`")]
    Color(String),

    #[error("injection point requires `{0}` but no point in the plan provides it")]
    UnsatisfiedRequirement(String),

    #[error("cannot plan injection for a failed pipeline result")]
    FailedPipeline,

    #[error("config validation error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PipelineError::Timeout(Duration::from_secs(120));
        assert!(format!("{err}").contains("120s"));

        let err = PipelineError::UnsatisfiedRequirement("color/partner_primary".into());
        assert!(format!("{err}").contains("color/partner_primary"));
    }
}
