//! Filesystem helpers for the copy and clean tasks.

use crate::error::{IoResultExt, PipelineError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    fs::write(path, contents).with_path(path)
}

/// Read a UTF-8 file, reporting a missing file as [`PipelineError::MissingInput`].
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_path(path)
}

/// Copy one file to `dest`, creating parent directories.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    fs::copy(source, dest).with_path(source)?;
    Ok(())
}

/// Remove everything inside `dir`. Missing directories are fine.
pub fn clean_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::io(dir, e)),
    }
}

/// Recursively copy the files under `source` into `dest`.
///
/// Returns the copied destination paths. A missing `source` copies nothing.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        tracing::warn!("Nothing to copy, {} does not exist", source.display());
        return Ok(Vec::new());
    }

    let mut copied = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            PipelineError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        let target = dest.join(relative);
        copy_file(entry.path(), &target)?;
        copied.push(target);
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_tree_mirrors_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("assets");
        fs::create_dir_all(source.join("img/icons")).unwrap();
        fs::write(source.join("logo.svg"), "<svg/>").unwrap();
        fs::write(source.join("img/icons/sun.png"), [0u8, 1, 2]).unwrap();

        let dest = temp.path().join("dist/assets");
        let copied = copy_tree(&source, &dest).unwrap();

        assert_eq!(copied.len(), 2);
        assert_eq!(fs::read(dest.join("img/icons/sun.png")).unwrap(), vec![0u8, 1, 2]);
        assert_eq!(fs::read_to_string(dest.join("logo.svg")).unwrap(), "<svg/>");
    }

    #[test]
    fn test_clean_then_copy_drops_stale_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("assets");
        let dest = temp.path().join("dist/assets");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("kept.txt"), "kept").unwrap();
        write_file(&dest.join("stale.txt"), "old").unwrap();

        clean_dir(&dest).unwrap();
        copy_tree(&source, &dest).unwrap();

        assert!(dest.join("kept.txt").is_file());
        assert!(!dest.join("stale.txt").exists());
    }

    #[test]
    fn test_clean_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        clean_dir(&temp.path().join("never-created")).unwrap();
        clean_dir(&temp.path().join("never-created")).unwrap();
    }

    #[test]
    fn test_read_missing_file_is_missing_input() {
        let temp = TempDir::new().unwrap();
        let err = read_file(&temp.path().join("src/js/gone.js")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(ref p) if p.ends_with("gone.js")));
    }
}
