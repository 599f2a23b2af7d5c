//! Integration tests for the file tasks.
//!
//! Each test lays out a small project in a temp directory using the default
//! configuration and runs tasks through a real runner.

use kiln_pipeline::config::DEFAULT_SCRIPT_FILES;
use kiln_pipeline::{
    register_pipeline_tasks, ErrorPolicy, PipelineConfig, PipelineError, Reload, ReloadSink,
    Runner, TaskContext, TaskGraphBuilder,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use walkdir::WalkDir;

#[derive(Default)]
struct Recorder(Mutex<Vec<Reload>>);

impl ReloadSink for Recorder {
    fn reload(&self, reload: Reload) {
        self.0.lock().unwrap().push(reload);
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <!-- build:css -->
    <link rel="stylesheet" href="css/reset.css">
    <link rel="stylesheet" href="css/styles.css">
    <!-- endbuild -->
  </head>
  <body>
    <main></main>
    <!-- build:js -->
    <script src="js/helpers.js"></script>
    <script src="js/main.js"></script>
    <!-- endbuild -->
  </body>
</html>
"#;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Marker function name for the script at `index` in the declared list.
fn marker(index: usize) -> String {
    format!("kilnMarker{:02}", index)
}

fn create_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    for (index, file) in DEFAULT_SCRIPT_FILES.iter().enumerate() {
        write(
            root,
            file,
            &format!("function {}() {{ return {}; }}\n", marker(index), index),
        );
    }

    write(root, "src/css/reset.css", "html, body { margin: 0; padding: 0; }\n");
    write(root, "src/scss/_palette.scss", "$ink: #333333;\n");
    write(
        root,
        "src/scss/styles.scss",
        "@import 'palette';\n.greeting { color: $ink; .name { font-weight: bold; } }\n",
    );
    write(root, "src/index.html", INDEX_HTML);
    write(root, "src/manifest.json", r#"{"name": "Start Page"}"#);
    write(root, "src/assets/icons/sun.svg", "<svg></svg>");
    write(root, "src/assets/bg.txt", "background");

    temp
}

fn runner(root: &Path) -> (Runner, Arc<Recorder>) {
    let mut builder = TaskGraphBuilder::new();
    register_pipeline_tasks(&mut builder);
    let graph = builder.build().unwrap();

    let recorder = Arc::new(Recorder::default());
    let context = TaskContext::new(root, PipelineConfig::default()).with_reload(recorder.clone());
    (Runner::new(graph, context), recorder)
}

fn file_tree(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

#[tokio::test]
async fn test_build_writes_every_output() {
    let project = create_project();
    let root = project.path();
    let (runner, _) = runner(root);

    let report = runner.run("build", ErrorPolicy::Strict).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed.last().map(String::as_str), Some("build"));

    assert!(root.join("dist/index.html").is_file());
    assert!(root.join("dist/js/app.min.js").is_file());
    assert!(root.join("dist/css/styles.css").is_file());
    assert!(root.join("dist/maps/app.min.js.map").is_file());
    assert!(root.join("dist/maps/styles.css.map").is_file());
    assert!(root.join("dist/assets/icons/sun.svg").is_file());
    // manifest is not part of build
    assert!(!root.join("dist/manifest.json").exists());
}

#[tokio::test]
async fn test_script_bundle_follows_declared_order() {
    let project = create_project();
    let root = project.path();
    let (runner, recorder) = runner(root);

    runner.run("js", ErrorPolicy::Strict).await.unwrap();

    let bundle = fs::read_to_string(root.join("dist/js/app.min.js")).unwrap();
    let positions: Vec<usize> = (0..DEFAULT_SCRIPT_FILES.len())
        .map(|index| {
            bundle
                .find(&marker(index))
                .unwrap_or_else(|| panic!("{} missing from bundle", marker(index)))
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(bundle.trim_end().ends_with("//# sourceMappingURL=../maps/app.min.js.map"));

    let map: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("dist/maps/app.min.js.map")).unwrap())
            .unwrap();
    assert_eq!(map["sources"].as_array().unwrap().len(), DEFAULT_SCRIPT_FILES.len());
    assert_eq!(map["sources"][13], "src/js/main.js");

    assert_eq!(*recorder.0.lock().unwrap(), vec![Reload::Full]);
}

#[tokio::test]
async fn test_style_bundle_puts_reset_before_compiled_styles() {
    let project = create_project();
    let root = project.path();
    let (runner, recorder) = runner(root);

    runner.run("css", ErrorPolicy::Strict).await.unwrap();

    // scss ran first and produced the second declared stylesheet
    assert!(root.join("src/css/styles.css").is_file());
    assert!(!root.join("src/css/_palette.css").exists());

    let bundle = fs::read_to_string(root.join("dist/css/styles.css")).unwrap();
    let reset = bundle.find("padding:0").unwrap();
    let styles = bundle.find(".greeting .name").unwrap();
    assert!(reset < styles);
    assert!(bundle.contains("/*# sourceMappingURL=../maps/styles.css.map */"));

    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec![Reload::Inject {
            files: vec!["styles.css".to_string()]
        }]
    );
}

#[tokio::test]
async fn test_assets_twice_mirrors_source() {
    let project = create_project();
    let root = project.path();
    let (runner, _) = runner(root);

    write(root, "dist/assets/stale.png", "old");

    runner.run("assets", ErrorPolicy::Strict).await.unwrap();
    runner.run("assets", ErrorPolicy::Strict).await.unwrap();

    assert_eq!(
        file_tree(&root.join("dist/assets")),
        file_tree(&root.join("src/assets"))
    );
}

#[tokio::test]
async fn test_markup_rewrite_is_idempotent() {
    let project = create_project();
    let root = project.path();
    let (runner, _) = runner(root);

    runner.run("html", ErrorPolicy::Strict).await.unwrap();
    let first = fs::read(root.join("dist/index.html")).unwrap();
    runner.run("html", ErrorPolicy::Strict).await.unwrap();
    let second = fs::read(root.join("dist/index.html")).unwrap();
    assert_eq!(first, second);

    let html = String::from_utf8(first).unwrap();
    assert_eq!(html.matches(r#"<link rel="stylesheet" href="css/styles.css">"#).count(), 1);
    assert_eq!(html.matches(r#"<script src="js/app.min.js" defer></script>"#).count(), 1);
    assert_eq!(html.matches("<link").count(), 1);
    assert_eq!(html.matches("<script").count(), 1);
    assert!(html.contains("    <main></main>\n"));
}

#[tokio::test]
async fn test_manifest_is_copied_verbatim() {
    let project = create_project();
    let root = project.path();
    let (runner, _) = runner(root);

    runner.run("manifest", ErrorPolicy::Strict).await.unwrap();
    assert_eq!(
        fs::read(root.join("dist/manifest.json")).unwrap(),
        fs::read(root.join("src/manifest.json")).unwrap()
    );
}

#[tokio::test]
async fn test_build_fails_when_a_declared_script_is_missing() {
    let project = create_project();
    let root = project.path();
    fs::remove_file(root.join("src/js/components/toolbox.js")).unwrap();
    let (runner, _) = runner(root);

    let err = runner.run("build", ErrorPolicy::Strict).await.unwrap_err();
    match err {
        PipelineError::TaskFailed { task, source } => {
            assert_eq!(task, "js");
            assert!(matches!(*source, PipelineError::MissingInput(ref p) if p.ends_with("toolbox.js")));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!root.join("dist/js/app.min.js").exists());
}

#[tokio::test]
async fn test_guarded_run_reports_sass_error_and_keeps_going() {
    let project = create_project();
    let root = project.path();
    write(root, "src/scss/broken.scss", ".a { color: $nope; }\n");
    // output of an earlier successful compile
    write(root, "src/css/styles.css", ".greeting { color: #333; }\n");
    let (runner, _) = runner(root);

    let report = runner.run("css", ErrorPolicy::Guarded).await.unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].task, "scss");
    assert!(report.failed[0].error.contains("broken.scss"));
    assert_eq!(report.completed, vec!["css".to_string()]);
    assert!(root.join("dist/css/styles.css").is_file());
}
