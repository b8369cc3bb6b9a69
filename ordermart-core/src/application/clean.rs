// ordermart-core/src/application/clean.rs

use std::fs;
use std::path::Path;

use crate::domain::project::ProjectConfig;
use crate::error::OrdermartError;
use crate::infrastructure::fs::is_contained;

/// Remove the configured clean targets. Returns the targets actually removed.
pub fn clean_project(project_dir: &Path, config: &ProjectConfig) -> Result<Vec<String>, OrdermartError> {
    tracing::info!("🧹 Initializing ordermart cleanup sequence...");

    let targets = if config.clean_targets.is_empty() {
        vec![config.target_path.clone()]
    } else {
        config.clean_targets.clone()
    };

    // Zero-Trust Path Traversal Guard: all targets are checked before anything is deleted
    if let Some(bad) = targets.iter().find(|t| !is_contained(t)) {
        return Err(OrdermartError::UnsafePath(bad.clone()));
    }

    let mut removed = Vec::new();
    for target_rel_path in targets {
        let full_path = project_dir.join(&target_rel_path);
        if !full_path.exists() {
            continue;
        }
        if full_path.is_dir() {
            fs::remove_dir_all(&full_path)?;
        } else {
            fs::remove_file(&full_path)?;
        }
        println!("   🗑️  Artifact removed: {}", target_rel_path);
        removed.push(target_rel_path);
    }

    Ok(removed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    fn config(extra: &str) -> ProjectConfig {
        serde_yaml::from_str(&format!("name: shop\nversion: '1.0'\n{extra}")).unwrap()
    }

    #[test]
    fn test_removes_target_dir() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("data/processed"))?;
        fs::write(dir.path().join("data/processed/_run_meta.json"), "{}")?;
        fs::create_dir_all(dir.path().join("data/raw"))?;

        let removed = clean_project(dir.path(), &config(""))?;

        assert_eq!(removed, vec!["data/processed"]);
        assert!(!dir.path().join("data/processed").exists());
        assert!(dir.path().join("data/raw").exists());
        Ok(())
    }

    #[test]
    fn test_traversal_is_refused_before_any_deletion() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("data/processed"))?;

        let err = clean_project(
            dir.path(),
            &config("clean-targets: [data/processed, ../elsewhere]\n"),
        )
        .unwrap_err();

        assert!(matches!(err, OrdermartError::UnsafePath(ref p) if p == "../elsewhere"));
        assert!(dir.path().join("data/processed").exists());
        Ok(())
    }
}
