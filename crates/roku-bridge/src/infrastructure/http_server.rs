//! Inbound HTTP: route name → routine → running sequence.
//!
//! Every request to `/roku/{name}` (any method) looks up the routine and
//! starts its sequence on the [`CommandSequencer`].  The response, `200 OK`
//! with body `OK`, goes out immediately; callers such as voice-assistant
//! webhooks never wait through the routine's pauses.
//!
//! Unknown paths are logged and answered with an empty `200`.
//!
//! Request bodies have no size limit at the HTTP layer, so an oversized body
//! never turns into a `413`.  Only text routines read the body, and they type
//! at most [`MAX_TEXT_BODY`] bytes of it.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::{CommandSequencer, RoutineTable};

/// How often the shutdown watcher re-checks the running flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Longest request body a text routine types, in bytes.
pub const MAX_TEXT_BODY: usize = 64 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub sequencer: CommandSequencer,
    pub routines: Arc<RoutineTable>,
}

impl AppState {
    pub fn new(sequencer: CommandSequencer, routines: RoutineTable) -> Self {
        Self {
            sequencer,
            routines: Arc::new(routines),
        }
    }
}

/// Builds the router.  Used by [`run_server`] and by integration tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/roku/{name}", any(run_routine))
        .route("/status", get(status))
        .fallback(unknown_path)
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run_routine(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Body,
) -> Response {
    let Some(routine) = state.routines.get(&name) else {
        warn!("unknown request URL: /roku/{name}");
        return StatusCode::OK.into_response();
    };

    let text = if routine.is_text() {
        read_text(body).await
    } else {
        String::new()
    };
    let sequence = routine.build(&text);
    info!(routine = %name, steps = sequence.len(), "starting routine");
    state.sequencer.run(sequence, None);

    "OK".into_response()
}

/// Reads up to [`MAX_TEXT_BODY`] bytes of `body` as text.  The rest is
/// dropped unread; a read error ends the text where it stopped.
async fn read_text(body: Body) -> String {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("failed to read request body: {e}");
                break;
            }
        };
        let room = MAX_TEXT_BODY - buf.len();
        if chunk.len() > room {
            buf.extend_from_slice(&chunk[..room]);
            warn!("request body over {MAX_TEXT_BODY} bytes; typing only the start");
            break;
        }
        buf.extend_from_slice(&chunk);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "device_location": state.sequencer.location().get(),
        "routines": state.routines.len(),
    }))
}

async fn unknown_path(uri: Uri) -> StatusCode {
    warn!("unknown request URL: {uri}");
    StatusCode::OK
}

/// Binds `addr` and serves until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound (port in use, no
/// permission) or the server fails.
pub async fn run_server(
    addr: SocketAddr,
    state: AppState,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
    serve_on(listener, state, running).await
}

/// Serves on a pre-bound listener until `running` is cleared.
pub async fn serve_on(
    listener: TcpListener,
    state: AppState,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let local = listener
        .local_addr()
        .context("HTTP listener has no local address")?;
    info!("roku bridge listening on http://{local}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown(running))
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn wait_for_shutdown(running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
