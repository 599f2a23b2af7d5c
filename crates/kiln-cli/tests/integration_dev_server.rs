//! Integration tests for the development server and watcher.
//!
//! The server is started on an ephemeral port and driven with raw HTTP
//! requests over a TCP socket.

use kiln_cli::dev::{bind_listener, DevServer, DevServerState, FileWatcher};
use kiln_cli::tasks::WatchTask;
use kiln_pipeline::{
    register_pipeline_tasks, ErrorPolicy, PipelineConfig, Reload, ReloadSink, Runner,
    TaskContext, TaskGraphBuilder, WatchEvent,
};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};

#[derive(Default)]
struct Recorder(Mutex<Vec<Reload>>);

impl ReloadSink for Recorder {
    fn reload(&self, reload: Reload) {
        self.0.lock().unwrap().push(reload);
    }
}

impl Recorder {
    fn has_full_reload(&self) -> bool {
        self.0.lock().unwrap().iter().any(|r| *r == Reload::Full)
    }
}

const PAGE: &str = "<!DOCTYPE html>\n<html><body><h1>kiln</h1></body></html>\n";

fn create_site() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/css")).unwrap();
    fs::write(root.join("src/index.html"), PAGE).unwrap();
    fs::write(root.join("src/css/styles.css"), "body{margin:0}").unwrap();
    fs::write(root.join("secret.txt"), "top secret").unwrap();
    temp
}

async fn start_server(root: &Path, state: Arc<DevServerState>) -> SocketAddr {
    let listener = bind_listener(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let server = DevServer::new(root.join("src"), state);
    tokio::spawn(server.serve(listener));
    addr
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut response))
        .await
        .expect("response timed out")
        .unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn test_index_gets_reload_client() {
    let temp = create_site();
    let addr = start_server(temp.path(), Arc::new(DevServerState::new())).await;

    let response = get(addr, "/").await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.to_ascii_lowercase().contains("cache-control: no-cache"));
    assert!(response.contains(r#"<script src="/__kiln/reload.js"></script>"#));

    let script_pos = response.find("/__kiln/reload.js").unwrap();
    let body_pos = response.find("</body>").unwrap();
    assert!(script_pos < body_pos);
}

#[tokio::test]
async fn test_stylesheets_are_served_untouched() {
    let temp = create_site();
    let addr = start_server(temp.path(), Arc::new(DevServerState::new())).await;

    let response = get(addr, "/css/styles.css").await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.to_ascii_lowercase().contains("content-type: text/css"));
    assert!(response.ends_with("body{margin:0}"));
    assert!(!response.contains("/__kiln/reload.js"));
}

#[tokio::test]
async fn test_reload_client_is_served() {
    let temp = create_site();
    let addr = start_server(temp.path(), Arc::new(DevServerState::new())).await;

    let response = get(addr, "/__kiln/reload.js").await;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("EventSource"));
}

#[tokio::test]
async fn test_paths_outside_root_are_not_served() {
    let temp = create_site();
    let addr = start_server(temp.path(), Arc::new(DevServerState::new())).await;

    let response = get(addr, "/../secret.txt").await;
    assert!(response.starts_with("HTTP/1.1 404"));
    assert!(!response.contains("top secret"));

    let response = get(addr, "/missing.html").await;
    assert!(response.starts_with("HTTP/1.1 404"));
}

#[tokio::test]
async fn test_reload_reaches_event_stream() {
    let temp = create_site();
    let state = Arc::new(DevServerState::new());
    let addr = start_server(temp.path(), state.clone()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /__kiln/events HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    timeout(Duration::from_secs(5), async {
        while state.client_count() == 0 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client never registered");

    state.reload(Reload::Inject {
        files: vec!["styles.css".into()],
    });

    let received = timeout(Duration::from_secs(5), async {
        let mut seen = String::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "event stream closed");
            seen.push_str(&String::from_utf8_lossy(&buf[..n]));
            if seen.contains(r#"data: {"type":"inject","files":["styles.css"]}"#) {
                return seen;
            }
        }
    })
    .await
    .expect("reload event never arrived");

    assert!(received.to_ascii_lowercase().contains("text/event-stream"));
}

#[tokio::test]
async fn test_watcher_reports_new_files_relative_to_root() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src")).unwrap();

    let (_watcher, mut changes) = FileWatcher::new(root, &root.join("src"), 0).unwrap();
    sleep(Duration::from_millis(100)).await;

    fs::write(root.join("src/notes.txt"), "hello").unwrap();

    let change = timeout(Duration::from_secs(5), changes.recv())
        .await
        .expect("no file event")
        .unwrap();
    assert_eq!(change.path(), Path::new("src/notes.txt"));
    assert!(matches!(
        change.event(),
        WatchEvent::Added | WatchEvent::Changed
    ));
}

async fn wait_for(what: &str, mut done: impl FnMut() -> bool) {
    timeout(Duration::from_secs(10), async {
        while !done() {
            sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {}", what));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_task_dispatches_rules() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    fs::create_dir_all(root.join("src/scss")).unwrap();
    fs::create_dir_all(root.join("src/css")).unwrap();

    let mut builder = TaskGraphBuilder::new();
    register_pipeline_tasks(&mut builder);
    builder.register(WatchTask);
    let graph = builder.build().unwrap();

    let recorder = Arc::new(Recorder::default());
    let context = TaskContext::new(&root, PipelineConfig::default()).with_reload(recorder.clone());
    let runner = Runner::new(graph, context);
    let handle = tokio::spawn(async move { runner.run("watch", ErrorPolicy::Guarded).await });
    sleep(Duration::from_millis(200)).await;

    // Markup changes reload the browser
    fs::write(root.join("src/index.html"), PAGE).unwrap();
    wait_for("full reload", || recorder.has_full_reload()).await;

    // Sass changes re-run the scss task
    fs::write(root.join("src/scss/site.scss"), "$c: red;\nbody { color: $c; }\n").unwrap();
    let css = root.join("src/css/site.css");
    wait_for("compiled site.css", || css.is_file()).await;
    assert!(fs::read_to_string(&css).unwrap().contains("color: red"));

    // A failing run is logged and the watcher keeps going
    let broken = root.join("src/scss/broken.scss");
    fs::write(&broken, "body { color: ").unwrap();
    sleep(Duration::from_millis(500)).await;
    assert!(!handle.is_finished());

    fs::write(&broken, "body { margin: 0; }\n").unwrap();
    let fixed = root.join("src/css/broken.css");
    wait_for("compiled broken.css", || fixed.is_file()).await;
    assert!(!handle.is_finished());

    handle.abort();
}
