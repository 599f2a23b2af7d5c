//! Development server with live reload via Server-Sent Events.
//!
//! Serves the source tree straight from disk, so edits show up without a
//! build, and pushes reload events to connected browsers.

use crate::dev::SharedState;
use crate::error::{CliError, Result};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::get,
    Router,
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Route of the reload event stream.
pub const EVENTS_PATH: &str = "/__kiln/events";

/// Route of the reload client script.
pub const RELOAD_SCRIPT_PATH: &str = "/__kiln/reload.js";

/// Ports tried after the requested one before giving up.
const PORT_ATTEMPTS: u16 = 10;

const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");

/// Development server.
pub struct DevServer {
    /// Directory served over HTTP
    root: PathBuf,
    /// Shared application state
    state: SharedState,
}

impl DevServer {
    pub fn new(root: impl Into<PathBuf>, state: SharedState) -> Self {
        Self {
            root: root.into(),
            state,
        }
    }

    /// Serve on `listener` until the task is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the server stops with an I/O failure
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.router();

        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }

    /// Build the axum router.
    ///
    /// - `/__kiln/events`: SSE stream of reload events
    /// - `/__kiln/reload.js`: the reload client
    /// - everything else: files under the root, with the reload client
    ///   injected into HTML pages
    pub fn router(self) -> Router {
        Router::new()
            .route(EVENTS_PATH, get(handle_events))
            .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
            .fallback_service(ServeDir::new(self.root))
            .layer(middleware::map_response(inject_into_html))
            .layer(CorsLayer::permissive())
            .with_state(self.state)
    }
}

/// Bind `host:port`, falling back to the next free port up to +10.
///
/// # Errors
///
/// Returns error if no port in the range can be bound
pub async fn bind_listener(host: IpAddr, port: u16) -> Result<TcpListener> {
    if port != 0 && port < 1024 {
        crate::ui::warning(&format!(
            "Port {} is in privileged range, may require root access",
            port
        ));
    }

    let last = port.saturating_add(PORT_ATTEMPTS);
    let mut last_error = None;

    for candidate in port..=last {
        match TcpListener::bind(SocketAddr::new(host, candidate)).await {
            Ok(listener) => {
                if candidate != port {
                    crate::ui::warning(&format!(
                        "Port {} is in use, using {} instead",
                        port, candidate
                    ));
                }
                return Ok(listener);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(CliError::Server(format!(
        "No available port in {}..={} on {}: {}",
        port,
        last,
        host,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// URL browsers use to reach `addr`.
pub fn server_url(addr: SocketAddr) -> String {
    let host = match addr.ip() {
        ip if ip.is_loopback() => "localhost".to_string(),
        IpAddr::V6(ip) => format!("[{}]", ip),
        IpAddr::V4(ip) => ip.to_string(),
    };
    format!("http://{}:{}", host, addr.port())
}

/// Handle SSE connections for reload events.
async fn handle_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    tracing::debug!("Client {} connected", id);

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
}

/// Serve the reload client script.
async fn handle_reload_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_SCRIPT,
    )
}

/// Add `no-cache` to every response and the reload client to HTML pages.
async fn inject_into_html(response: Response) -> Response {
    let is_html = response.status() == StatusCode::OK
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/html"));

    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    if !is_html {
        return Response::from_parts(parts, body);
    }

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read HTML response: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(inject_reload_script(&bytes)))
}

/// Inject the reload client into HTML content.
///
/// The script goes before the last `</body>`, or at the end without one.
fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);
    let script_tag = format!(r#"<script src="{}"></script>"#, RELOAD_SCRIPT_PATH);

    let mut result = String::with_capacity(html.len() + script_tag.len() + 1);
    match html.rfind("</body>") {
        Some(pos) => {
            result.push_str(&html[..pos]);
            result.push_str(&script_tag);
            result.push('\n');
            result.push_str(&html[pos..]);
        }
        None => {
            result.push_str(&html);
            result.push_str(&script_tag);
        }
    }
    result.into_bytes()
}

/// Open `url` in the default browser.
pub fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => crate::ui::info(&format!("Opened browser at {}", url)),
        Err(e) => crate::ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
