//! Sass compilation using the grass crate.
//!
//! grass is a pure Rust Sass implementation, so no external compiler is
//! needed. Partials (`_name.scss`) are only compiled through `@use`/`@import`
//! from other files.

use crate::error::{IoResultExt, PipelineError, Result};
use grass::{Options, OutputStyle};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compile one Sass file to CSS.
///
/// Imports resolve relative to the file's directory.
pub fn compile_file(path: &Path) -> Result<String> {
    let mut options = Options::default().style(OutputStyle::Expanded);
    if let Some(parent) = path.parent() {
        options = options.load_path(parent);
    }

    grass::from_path(path, &options).map_err(|e| PipelineError::Sass {
        file: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Compile every non-partial `.scss` file under `scss_dir` into `css_dir`,
/// mirroring the directory structure.
///
/// A missing `scss_dir` compiles nothing. Returns the written files in walk
/// order.
pub fn compile_tree(scss_dir: &Path, css_dir: &Path) -> Result<Vec<PathBuf>> {
    if !scss_dir.is_dir() {
        tracing::warn!("No Sass sources found in {}", scss_dir.display());
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    for entry in WalkDir::new(scss_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(scss_dir).to_path_buf();
            PipelineError::io(path, e.into())
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() || !is_compilable(path) {
            continue;
        }

        let relative = path.strip_prefix(scss_dir).unwrap_or(path);
        let output = css_dir.join(relative).with_extension("css");

        let css = compile_file(path)?;
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }
        fs::write(&output, css).with_path(&output)?;

        tracing::debug!("Compiled {} -> {}", path.display(), output.display());
        written.push(output);
    }

    Ok(written)
}

fn is_compilable(path: &Path) -> bool {
    let is_scss = path.extension().is_some_and(|ext| ext == "scss");
    let is_partial = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('_'));
    is_scss && !is_partial
}
