//! The file tasks of the pipeline and the `build` aggregate.
//!
//! Every task reads its paths from the run's [`PipelineConfig`](crate::PipelineConfig)
//! and does its file work on the blocking pool.

use crate::error::{PipelineError, Result};
use crate::graph::TaskGraphBuilder;
use crate::reload::Reload;
use crate::runner::Runner;
use crate::task::{Aggregate, Task};
use crate::transforms::{
    files, markup, relative_url, sass, scripts, styles, Bundle, SourceFile,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Register every file task plus `build` on `builder`.
pub fn register_pipeline_tasks(builder: &mut TaskGraphBuilder) -> &mut TaskGraphBuilder {
    builder
        .register(ScssTask)
        .register(CssTask)
        .register(JsTask)
        .register(HtmlTask)
        .register(ManifestTask)
        .register(CleanAssetsTask)
        .register(AssetsTask)
        .register(Aggregate::new(
            "build",
            "One-shot production build",
            ["html", "js", "css", "assets"],
        ))
}

async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))?
}

/// Read `paths` in order, naming each by its configured path.
fn read_sources(root: &Path, paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path| {
            let contents = files::read_file(&root.join(path))?;
            let name = path.to_string_lossy().replace('\\', "/");
            Ok(SourceFile::new(name, contents))
        })
        .collect()
}

/// Where a bundle and its map go, relative to the project root.
struct BundleTarget {
    dest: PathBuf,
    output: String,
    maps_dir: PathBuf,
}

impl BundleTarget {
    fn bundle_path(&self) -> PathBuf {
        self.dest.join(&self.output)
    }

    fn map_path(&self) -> PathBuf {
        self.maps_dir.join(format!("{}.map", self.output))
    }

    fn map_url(&self) -> String {
        relative_url(&self.dest, &self.map_path())
    }

    /// Write the bundle with `comment` appended, then its map.
    fn write(&self, root: &Path, bundle: Bundle, comment: String) -> Result<PathBuf> {
        let bundle_path = root.join(self.bundle_path());
        files::write_file(&bundle_path, format!("{}\n{}\n", bundle.code, comment))?;
        files::write_file(&root.join(self.map_path()), bundle.map)?;
        Ok(bundle_path)
    }
}

/// Compiles the Sass tree into the intermediate CSS directory.
pub struct ScssTask;

#[async_trait]
impl Task for ScssTask {
    fn name(&self) -> &str {
        "scss"
    }

    fn description(&self) -> &str {
        "Compile Sass sources to CSS"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let scss_dir = ctx.resolve(&ctx.config().styles.scss_dir);
        let css_dir = ctx.resolve(&ctx.config().styles.css_dir);

        let written = blocking(move || sass::compile_tree(&scss_dir, &css_dir)).await?;
        tracing::debug!("Compiled {} stylesheet(s)", written.len());
        Ok(())
    }
}

/// Bundles the ordered stylesheet list.
pub struct CssTask;

#[async_trait]
impl Task for CssTask {
    fn name(&self) -> &str {
        "css"
    }

    fn prerequisites(&self) -> &[&'static str] {
        &["scss"]
    }

    fn description(&self) -> &str {
        "Concatenate and minify stylesheets"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let config = ctx.config();
        let root = ctx.root().to_path_buf();
        let inputs = config.styles.files.clone();
        let target = BundleTarget {
            dest: config.styles.dest.clone(),
            output: config.styles.output.clone(),
            maps_dir: config.maps_dir.clone(),
        };

        let written = blocking(move || {
            let sources = read_sources(&root, &inputs)?;
            let bundle = styles::bundle_styles(&sources, &target.output)?;
            let comment = format!("/*# sourceMappingURL={} */", target.map_url());
            target.write(&root, bundle, comment)
        })
        .await?;

        ctx.reload(Reload::for_paths(&[written]));
        Ok(())
    }
}

/// Bundles the ordered script list.
pub struct JsTask;

#[async_trait]
impl Task for JsTask {
    fn name(&self) -> &str {
        "js"
    }

    fn description(&self) -> &str {
        "Concatenate and minify scripts"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let config = ctx.config();
        let root = ctx.root().to_path_buf();
        let inputs = config.scripts.files.clone();
        let target = BundleTarget {
            dest: config.scripts.dest.clone(),
            output: config.scripts.output.clone(),
            maps_dir: config.maps_dir.clone(),
        };

        blocking(move || {
            let sources = read_sources(&root, &inputs)?;
            let bundle = scripts::bundle_scripts(&sources)?;
            let comment = format!("//# sourceMappingURL={}", target.map_url());
            target.write(&root, bundle, comment)
        })
        .await?;

        ctx.reload(Reload::Full);
        Ok(())
    }
}

/// Rewrites the `build:` blocks of the markup entry point.
pub struct HtmlTask;

#[async_trait]
impl Task for HtmlTask {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Point markup at the bundled outputs"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let source = ctx.resolve(&ctx.config().markup.source);
        let dest = ctx.resolve(&ctx.config().markup.dest);
        let replacements = ctx.config().markup.replacements.clone();
        let keep_unassigned = ctx.config().markup.keep_unassigned;

        blocking(move || {
            let page = files::read_file(&source)?;
            let found = markup::block_names(&page);
            for name in replacements.keys().filter(|name| !found.contains(name)) {
                tracing::warn!("No build:{} block in {}", name, source.display());
            }

            let file_name = source.file_name().ok_or_else(|| {
                PipelineError::Config(format!("markup.source has no file name: {}", source.display()))
            })?;
            let rewritten = markup::rewrite_markup(&page, &replacements, keep_unassigned);
            files::write_file(&dest.join(file_name), rewritten)
        })
        .await?;

        ctx.reload(Reload::Full);
        Ok(())
    }
}

/// Copies the web app manifest verbatim.
pub struct ManifestTask;

#[async_trait]
impl Task for ManifestTask {
    fn name(&self) -> &str {
        "manifest"
    }

    fn description(&self) -> &str {
        "Copy the web app manifest"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let source = ctx.resolve(&ctx.config().manifest.source);
        let dest = ctx.resolve(&ctx.config().manifest.dest);

        let Some(file_name) = source.file_name().map(ToOwned::to_owned) else {
            return Err(PipelineError::Config(format!(
                "manifest.source has no file name: {}",
                source.display()
            )));
        };

        blocking(move || {
            if !source.is_file() {
                return Err(PipelineError::MissingInput(source));
            }
            files::copy_file(&source, &dest.join(file_name))
        })
        .await
    }
}

/// Empties the output assets directory.
pub struct CleanAssetsTask;

#[async_trait]
impl Task for CleanAssetsTask {
    fn name(&self) -> &str {
        "clean-assets"
    }

    fn description(&self) -> &str {
        "Remove previously copied assets"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let dest = ctx.resolve(&ctx.config().assets.dest);
        blocking(move || files::clean_dir(&dest)).await
    }
}

/// Copies the source assets tree into the output.
pub struct AssetsTask;

#[async_trait]
impl Task for AssetsTask {
    fn name(&self) -> &str {
        "assets"
    }

    fn prerequisites(&self) -> &[&'static str] {
        &["clean-assets"]
    }

    fn description(&self) -> &str {
        "Copy static assets"
    }

    async fn run(&self, runner: &Runner) -> Result<()> {
        let ctx = runner.context();
        let source = ctx.resolve(&ctx.config().assets.source);
        let dest = ctx.resolve(&ctx.config().assets.dest);

        let copied = blocking(move || files::copy_tree(&source, &dest)).await?;
        tracing::debug!("Copied {} asset(s)", copied.len());

        ctx.reload(Reload::for_paths(&copied));
        Ok(())
    }
}
