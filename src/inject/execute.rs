//! Injection execution.
//!
//! Points are applied strictly in plan order; the first failure stops
//! the run and leaves the tree partially modified. Injection is not
//! transactional - a failed run means the caller regenerates the tree
//! from the template rather than retrying the same plan in place.
//!
//! Idempotency: `replace` is idempotent once the placeholder is gone
//! (as long as the replacement does not reintroduce it); `append` and
//! `insert` duplicate content when re-run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::inject::plan::{AssetInjectionPlan, InjectionAction, InjectionPoint};
use crate::{debug, log};

const RESOURCES_CLOSE: &str = "</resources>";

/// Applies injection plans to the generated tree.
pub struct InjectionExecutor;

impl InjectionExecutor {
    /// Apply every point in order. Returns `false` (after logging the
    /// cause) as soon as a point fails; earlier edits stay applied.
    pub fn inject(plan: &AssetInjectionPlan) -> bool {
        log!(
            "inject";
            "executing {} injection points for build {}",
            plan.injection_points.len(),
            plan.build_id
        );

        for point in &plan.injection_points {
            if let Err(err) = Self::apply(point) {
                log!(
                    "error";
                    "injection failed at `{}`: {err:#}",
                    point.target_file.display()
                );
                return false;
            }
        }

        log!("inject"; "asset injection completed for build {}", plan.build_id);
        true
    }

    /// Apply a single point.
    pub fn apply(point: &InjectionPoint) -> Result<()> {
        debug!(
            "inject";
            "{:?} in {}", point.action, point.target_file.display()
        );

        match point.action {
            InjectionAction::Replace => Self::replace(point),
            InjectionAction::Append => Self::append(point),
            InjectionAction::Insert => Self::insert(point),
        }
    }

    /// Substitute the placeholder wherever it occurs. A missing target
    /// is a no-op: replace targets come from the template copy step,
    /// and a template without the file has nothing to patch.
    fn replace(point: &InjectionPoint) -> Result<()> {
        let target = &point.target_file;
        if !target.exists() {
            debug!("inject"; "replace target missing, skipping: {}", target.display());
            return Ok(());
        }

        let Some(placeholder) = &point.placeholder else {
            return Ok(());
        };

        let content = read(target)?;
        let patched = content.replace(placeholder.as_str(), &point.content);
        if patched != content {
            fs::write(target, patched)
                .with_context(|| format!("failed to write `{}`", target.display()))?;
        }
        Ok(())
    }

    /// Append to the target, creating parents and the file as needed.
    fn append(point: &InjectionPoint) -> Result<()> {
        let target = &point.target_file;
        ensure_parent(target)?;

        let mut content = if target.exists() {
            read(target)?
        } else {
            String::new()
        };
        content.push('\n');
        content.push_str(&point.content);
        fs::write(target, content)
            .with_context(|| format!("failed to write `{}`", target.display()))
    }

    /// Splice before `</resources>`, or synthesize a minimal resource
    /// file around the content when the target does not exist.
    fn insert(point: &InjectionPoint) -> Result<()> {
        let target = &point.target_file;

        if target.exists() {
            let content = read(target)?;
            let patched = content.replacen(
                RESOURCES_CLOSE,
                &format!("{}\n{RESOURCES_CLOSE}", point.content),
                1,
            );
            fs::write(target, patched)
                .with_context(|| format!("failed to write `{}`", target.display()))
        } else {
            ensure_parent(target)?;
            let wrapper = format!(
                "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n{}\n</resources>",
                point.content
            );
            fs::write(target, wrapper)
                .with_context(|| format!("failed to write `{}`", target.display()))
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::plan::InjectionKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn point(
        target: PathBuf,
        action: InjectionAction,
        content: &str,
        placeholder: Option<&str>,
    ) -> InjectionPoint {
        InjectionPoint {
            kind: InjectionKind::Resource,
            target_file: target,
            action,
            content: content.to_string(),
            placeholder: placeholder.map(str::to_string),
            provides: vec![],
            requires: vec![],
        }
    }

    #[test]
    fn test_replace_substitutes_every_occurrence() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("colors.xml");
        fs::write(&target, "a <!-- X --> b <!-- X --> c").unwrap();

        let p = point(target.clone(), InjectionAction::Replace, "Y", Some("<!-- X -->"));
        InjectionExecutor::apply(&p).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "a Y b Y c");
    }

    #[test]
    fn test_replace_is_idempotent_once_placeholder_gone() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("colors.xml");
        fs::write(&target, "before <!-- MARK --> after").unwrap();

        let p = point(target.clone(), InjectionAction::Replace, "X", Some("<!-- MARK -->"));
        InjectionExecutor::apply(&p).unwrap();
        let first = fs::read_to_string(&target).unwrap();
        InjectionExecutor::apply(&p).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), first);
    }

    #[test]
    fn test_replace_missing_target_is_noop() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing.xml");
        let p = point(target.clone(), InjectionAction::Replace, "X", Some("Y"));
        InjectionExecutor::apply(&p).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn test_append_creates_parents_and_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("deep/nested/notes.gradle");
        let p = point(target.clone(), InjectionAction::Append, "line one", None);
        InjectionExecutor::apply(&p).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "\nline one");

        InjectionExecutor::apply(&p).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "\nline one\nline one");
    }

    #[test]
    fn test_insert_splices_before_closing_tag() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("styles.xml");
        fs::write(
            &target,
            "<?xml version=\"1.0\"?>\n<resources>\n    <style name=\"A\"/>\n</resources>",
        )
        .unwrap();

        let p = point(target.clone(), InjectionAction::Insert, "    <style name=\"B\"/>", None);
        InjectionExecutor::apply(&p).unwrap();

        let content = fs::read_to_string(&target).unwrap();
        let a = content.find("name=\"A\"").unwrap();
        let b = content.find("name=\"B\"").unwrap();
        let close = content.find("</resources>").unwrap();
        assert!(a < b && b < close);
    }

    #[test]
    fn test_insert_synthesizes_wrapper() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("values/styles.xml");
        let p = point(
            target.clone(),
            InjectionAction::Insert,
            "    <style name=\"SplashTheme\"/>",
            None,
        );
        InjectionExecutor::apply(&p).unwrap();

        let content = fs::read_to_string(&target).unwrap();
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(content.contains("<resources>"));
        assert!(content.contains("SplashTheme"));
        assert!(content.trim_end().ends_with("</resources>"));
    }
}
