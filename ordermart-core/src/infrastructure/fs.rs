// ordermart-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// A fully written file parked next to its destination, not yet visible
/// there. Dropping it deletes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    temp: tempfile::NamedTempFile,
    destination: PathBuf,
}

impl StagedFile {
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Rename over the destination (same filesystem, so atomic).
    pub fn commit(self) -> Result<(), InfrastructureError> {
        self.temp
            .persist(&self.destination)
            .map_err(|e| InfrastructureError::Io(e.error))?;
        Ok(())
    }
}

/// Write `content` to a temporary file in the destination's directory.
/// Missing parent directories are created; the destination is not touched.
pub fn stage_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<StagedFile, InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.as_file().sync_all()?;

    Ok(StagedFile {
        temp: temp_file,
        destination: path.to_path_buf(),
    })
}

/// Write content to a file atomically using a temporary file.
///
/// Readers see the old file or the new one, never a truncated one.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    stage_write(path, content)?.commit()
}

/// True when `relative` stays inside whatever directory it is joined to:
/// no `..`, no root, no drive prefix.
pub fn is_contained(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_missing_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("data/processed/_run_meta.json");

        atomic_write(&file_path, "{}")?;

        assert_eq!(fs::read_to_string(file_path)?, "{}");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_and_leaves_no_temp_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("out.bin");

        atomic_write(&file_path, "first run")?;
        atomic_write(&file_path, "second")?;

        assert_eq!(fs::read_to_string(&file_path)?, "second");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_dropped_stage_leaves_destination_alone() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("users.parquet");
        atomic_write(&file_path, "previous")?;

        let staged = stage_write(&file_path, "next")?;
        assert_eq!(staged.destination(), file_path.as_path());
        assert_eq!(fs::read_to_string(&file_path)?, "previous");
        drop(staged);

        assert_eq!(fs::read_to_string(&file_path)?, "previous");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained("data/processed"));
        assert!(is_contained("./target"));
        assert!(!is_contained("../outside"));
        assert!(!is_contained("data/../../etc"));
        assert!(!is_contained("/tmp"));
    }
}
