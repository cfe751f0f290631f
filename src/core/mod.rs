//! Per-build context: identity, branding, paths, budget, cancellation
//! and progress observation.
//!
//! The pipeline is stateless between builds. Everything one run needs
//! lives in a [`BuildContext`] and is discarded afterwards; no
//! process-wide asset registry exists at this boundary.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::PipelineError;

// ============================================================================
// Phase
// ============================================================================

/// Pipeline phases in execution order.
///
/// Each phase consumes the prior phase's full output set, so phases
/// never overlap; per-artifact work inside Generating and Optimizing
/// runs concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Validating,
    Generating,
    Optimizing,
    Scoring,
    Converting,
    Completed,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Validating => "validating",
            Phase::Generating => "generating",
            Phase::Optimizing => "optimizing",
            Phase::Scoring => "scoring",
            Phase::Converting => "converting",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation handle.
///
/// Cancelling stops new artifact jobs from being scheduled; in-flight
/// jobs run to completion so no half-written image is left behind.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    ///
    /// Relaxed ordering: worst case a few more artifacts are scheduled
    /// before the pipeline stops, which is acceptable.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Progress observation
// ============================================================================

/// Observer for phase transitions.
///
/// Called exactly at phase boundaries. Implementations must be cheap
/// and non-blocking; the pipeline does not wait on observers.
pub trait ProgressSink: Send + Sync {
    fn on_phase(&self, phase: Phase);
}

/// Default observer: ignores everything.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_phase(&self, _phase: Phase) {}
}

/// Channel-backed observer for services that forward progress to their
/// own reporting layer (dashboards, build records).
pub struct ChannelProgress {
    tx: crossbeam::channel::Sender<Phase>,
}

impl ChannelProgress {
    /// Create a sink and the receiving end for the embedding service.
    pub fn unbounded() -> (Self, crossbeam::channel::Receiver<Phase>) {
        let (tx, rx) = crossbeam::channel::unbounded();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn on_phase(&self, phase: Phase) {
        // A disconnected receiver is not the pipeline's problem.
        let _ = self.tx.send(phase);
    }
}

// ============================================================================
// Branding
// ============================================================================

/// Partner branding inputs used by generators and the planner.
#[derive(Debug, Clone)]
pub struct Branding {
    /// Display name of the app (initials source for fallback icons)
    pub app_name: String,
    /// Primary brand color as `#RRGGBB`
    pub primary_color: String,
    /// Dark variant; derived via HSL darken when absent
    pub primary_color_dark: Option<String>,
}

impl Branding {
    pub fn new(app_name: impl Into<String>, primary_color: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            primary_color: primary_color.into(),
            primary_color_dark: None,
        }
    }

    pub fn with_dark_variant(mut self, color: impl Into<String>) -> Self {
        self.primary_color_dark = Some(color.into());
        self
    }
}

// ============================================================================
// BuildContext
// ============================================================================

/// Everything one pipeline run needs, discarded after the run.
pub struct BuildContext {
    /// Build identifier (namespaces output paths and asset ids)
    pub build_id: String,
    /// Partner identifier
    pub partner_id: String,
    /// Branding inputs
    pub branding: Branding,
    /// Root of the generated project tree being populated
    pub target_path: PathBuf,

    started: Instant,
    /// Explicit budget override; the config default applies when unset
    budget: Option<Duration>,
    cancel: CancelToken,
    progress: Arc<dyn ProgressSink>,
}

impl BuildContext {
    pub fn new(
        build_id: impl Into<String>,
        partner_id: impl Into<String>,
        branding: Branding,
        target_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            build_id: build_id.into(),
            partner_id: partner_id.into(),
            branding,
            target_path: target_path.into(),
            started: Instant::now(),
            budget: None,
            cancel: CancelToken::new(),
            progress: Arc::new(NullProgress),
        }
    }

    /// Override the per-build processing budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Attach a cancellation token shared with the embedding service.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Attach a progress observer.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Android resource root inside the generated tree.
    pub fn res_dir(&self) -> PathBuf {
        self.target_path.join("app/src/main/res")
    }

    /// Android manifest path inside the generated tree.
    pub fn manifest_path(&self) -> PathBuf {
        self.target_path.join("app/src/main/AndroidManifest.xml")
    }

    /// Wall-clock time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Effective processing budget: the explicit override, or the
    /// supplied (config-level) default.
    pub fn effective_budget(&self, default: Duration) -> Duration {
        self.budget.unwrap_or(default)
    }

    /// Fail fast when the processing budget is exhausted.
    pub fn check_budget(&self, default: Duration) -> Result<(), PipelineError> {
        let budget = self.effective_budget(default);
        if self.elapsed() > budget {
            Err(PipelineError::Timeout(budget))
        } else {
            Ok(())
        }
    }

    /// True when no further artifact jobs should be scheduled.
    pub fn should_stop(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Report a phase transition to the attached observer.
    pub fn report_phase(&self, phase: Phase) {
        self.progress.on_phase(phase);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn ctx() -> BuildContext {
        BuildContext::new("b1", "p1", Branding::new("Acme", "#2196F3"), "/tmp/b1")
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_budget_check() {
        let default = Duration::from_secs(120);

        let ctx = ctx();
        assert_eq!(ctx.effective_budget(default), default);
        assert!(ctx.check_budget(default).is_ok());

        let ctx = self::ctx().with_budget(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(
            ctx.check_budget(default),
            Err(PipelineError::Timeout(_))
        ));
    }

    #[test]
    fn test_channel_progress_delivers_phases() {
        let (sink, rx) = ChannelProgress::unbounded();
        let ctx = ctx().with_progress(Arc::new(sink));
        ctx.report_phase(Phase::Validating);
        ctx.report_phase(Phase::Completed);
        assert_eq!(rx.try_recv().unwrap(), Phase::Validating);
        assert_eq!(rx.try_recv().unwrap(), Phase::Completed);
    }

    #[test]
    fn test_paths_are_namespaced_under_target() {
        let ctx = ctx();
        assert!(ctx.res_dir().starts_with(Path::new("/tmp/b1")));
        assert!(ctx.manifest_path().ends_with("AndroidManifest.xml"));
    }
}
