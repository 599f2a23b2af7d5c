//! File transformations used by the pipeline tasks.
//!
//! Each transform is a plain synchronous function over strings or paths so it
//! can be exercised without a runner. Tasks call them on the blocking pool.

pub mod files;
pub mod markup;
pub mod sass;
pub mod scripts;
pub mod styles;

use std::path::{Component, Path, PathBuf};

/// An input file of a bundle: display name plus contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Name recorded in the source map (project-relative path)
    pub name: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// A concatenated, minified bundle and its source map JSON.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub code: String,
    pub map: String,
}

/// Path of `target` relative to directory `from`, with `/` separators.
///
/// Both paths must be relative to the same root (or both absolute).
///
/// ```
/// use kiln_pipeline::transforms::relative_url;
/// use std::path::Path;
///
/// assert_eq!(
///     relative_url(Path::new("dist/js"), Path::new("dist/maps/app.min.js.map")),
///     "../maps/app.min.js.map"
/// );
/// ```
pub fn relative_url(from: &Path, target: &Path) -> String {
    let from: Vec<Component<'_>> = normalized(from);
    let target: Vec<Component<'_>> = normalized(target);

    let common = from
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn normalized(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_url_sibling_directory() {
        assert_eq!(
            relative_url(Path::new("dist/css"), Path::new("dist/maps/styles.css.map")),
            "../maps/styles.css.map"
        );
    }

    #[test]
    fn test_relative_url_same_directory() {
        assert_eq!(
            relative_url(Path::new("./dist/js"), Path::new("dist/js/app.min.js.map")),
            "app.min.js.map"
        );
    }
}
