//! HTTP server for `gantry dev`.
//!
//! Serves the built output tree straight from disk, injects the
//! reload client into HTML responses, and pushes rebuild events to
//! browsers over `/__gantry/events`.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Response, Sse};
use axum::routing::get;
use axum::Router;
use gantry_pipeline::emit;
use tokio::net::TcpListener;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::dev::SharedState;
use crate::error::{CliError, Result};
use crate::ui;

const RELOAD_SNIPPET: &str = r#"<script src="/__gantry/reload.js"></script>"#;
const RELOAD_CLIENT: &str = include_str!("../../assets/dev/reload-client.js");

/// How far past the configured port to probe before giving up.
const PORT_PROBE_SPAN: u16 = 10;

/// Bind the configured address, stepping to the next port when the
/// preferred one is taken.
pub async fn bind(options: &gantry_config::DevOptions) -> Result<(TcpListener, SocketAddr)> {
    let start = options.port;
    let end = start.saturating_add(PORT_PROBE_SPAN);
    for port in start..=end {
        match TcpListener::bind((options.host.as_str(), port)).await {
            Ok(listener) => {
                let addr = listener.local_addr()?;
                if port != start {
                    ui::warn(&format!("port {start} is taken, using {port}"));
                }
                return Ok((listener, addr));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(CliError::NoFreePort { start, end })
}

/// Run the server until ctrl-c.
pub async fn serve(listener: TcpListener, state: SharedState) -> Result<()> {
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;
    Ok(())
}

fn router(state: SharedState) -> Router {
    let compress = state.options.compress;
    let router = Router::new()
        .route("/__gantry/events", get(events))
        .route("/__gantry/reload.js", get(reload_client))
        .fallback(serve_static)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    if compress {
        router.layer(CompressionLayer::new())
    } else {
        router
    }
}

async fn shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}

/// SSE stream of rebuild events. Opens with a snapshot of the current
/// status so the client can baseline its generation counter.
async fn events(
    State(state): State<SharedState>,
) -> Sse<impl tokio_stream::Stream<Item = std::result::Result<Event, Infallible>>> {
    let snapshot = state.snapshot();
    let live = BroadcastStream::new(state.subscribe()).filter_map(|event| event.ok());
    let stream = tokio_stream::once(snapshot)
        .chain(live)
        .filter_map(|event| serde_json::to_string(&event).ok())
        .map(|data| Ok::<_, Infallible>(Event::default().event("reload").data(data)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

async fn reload_client() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        RELOAD_CLIENT,
    )
}

/// Serve a file from the output tree.
async fn serve_static(State(state): State<SharedState>, uri: Uri) -> Response {
    let mut path = uri.path().trim_start_matches('/').to_string();
    if path.is_empty() {
        path = "index.html".to_string();
    }

    let mut resolved = match emit::validate_output_path(&state.output_root, &path) {
        Ok(resolved) => resolved,
        Err(_) => return not_found(&path),
    };
    if resolved.is_dir() {
        resolved.push("index.html");
    }
    if !resolved.is_file()
        && state.options.spa_fallback
        && Path::new(&path).extension().is_none()
    {
        resolved = state.output_root.join("index.html");
    }

    let content = match tokio::fs::read(&resolved).await {
        Ok(content) => content,
        Err(_) if path == "favicon.ico" => return StatusCode::NO_CONTENT.into_response(),
        Err(_) => return not_found(&path),
    };

    let mime = content_type(&resolved);
    let body = if state.options.hot && mime.starts_with("text/html") {
        inject_reload(content)
    } else {
        content
    };

    (
        [
            (header::CONTENT_TYPE, mime),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

fn not_found(path: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("not found: /{path}")).into_response()
}

/// Add the reload client to an HTML response, just before `</body>`
/// when one exists.
fn inject_reload(content: Vec<u8>) -> Vec<u8> {
    let html = match String::from_utf8(content) {
        Ok(html) => html,
        Err(err) => return err.into_bytes(),
    };
    if html.contains(RELOAD_SNIPPET) {
        return html.into_bytes();
    }
    match html.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + RELOAD_SNIPPET.len() + 4);
            out.push_str(&html[..pos]);
            out.push_str("  ");
            out.push_str(RELOAD_SNIPPET);
            out.push('\n');
            out.push_str(&html[pos..]);
            out.into_bytes()
        }
        None => {
            let mut out = html;
            out.push('\n');
            out.push_str(RELOAD_SNIPPET);
            out.into_bytes()
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        "mp3" => "audio/mpeg",
        "wasm" => "application/wasm",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}
