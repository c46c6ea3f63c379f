use std::{convert::Infallible, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{
    error::ScanError,
    orchestrator::ScanOrchestrator,
    types::{ScanProfile, SessionKey},
};

/// Shared state behind the local dashboard API.
#[derive(Clone)]
pub struct AppState {
    orchestrator: ScanOrchestrator,
    wan_address: Arc<RwLock<Option<String>>>, // last known external address
}

impl AppState {
    pub fn new(orchestrator: ScanOrchestrator, wan_address: Option<String>) -> Self {
        Self {
            orchestrator,
            wan_address: Arc::new(RwLock::new(wan_address)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub target: String,
    #[serde(default)]
    pub profile: ScanProfile,
}

#[derive(Debug, Deserialize)]
pub struct ParallelRequest {
    #[serde(default)]
    pub group: Option<String>,
    pub targets: Vec<String>,
    #[serde(default)]
    pub profile: ScanProfile,
}

#[derive(Debug, Deserialize)]
pub struct WanRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub profile: ScanProfile,
}

pub const DEFAULT_GROUP: &str = "subnets";

fn error_response(e: ScanError) -> Response {
    let status = match &e {
        ScanError::InvalidTarget(_) | ScanError::MissingWanAddress => StatusCode::BAD_REQUEST,
        ScanError::NotFound(_) => StatusCode::NOT_FOUND,
        ScanError::StartFailed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

/// Routes for the dashboard. Everything under `/api`; static files from `ui/`
/// otherwise.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/{key}", get(get_session).delete(delete_session))
        .route("/sessions/{key}/cancel", post(cancel_session))
        .route("/scan", post(post_scan))
        .route("/parallel", post(post_parallel))
        .route("/groups/{group}", get(get_group).delete(stop_group))
        .route("/groups/{group}/cancel", post(cancel_group))
        .route("/wan", post(post_wan))
        .route("/events", get(events))
        .with_state(state);

    let static_svc = ServeDir::new("ui").append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_svc)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn spawn_server(bind: &str, state: AppState) -> Result<()> {
    let app = router(state);
    info!("serving dashboard on http://{}", bind);
    axum::serve(tokio::net::TcpListener::bind(bind).await?, app).await?;
    Ok(())
}

async fn list_sessions(State(app): State<AppState>) -> impl IntoResponse {
    Json(app.orchestrator.sessions().await)
}

async fn get_session(State(app): State<AppState>, Path(key): Path<u64>) -> Response {
    match app.orchestrator.session(SessionKey(key)).await {
        Some(s) => Json(s).into_response(),
        None => error_response(ScanError::NotFound(format!("session {key}"))),
    }
}

async fn delete_session(State(app): State<AppState>, Path(key): Path<u64>) -> Response {
    if app.orchestrator.discard(SessionKey(key)).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(ScanError::NotFound(format!("session {key}")))
    }
}

async fn cancel_session(State(app): State<AppState>, Path(key): Path<u64>) -> Response {
    let key = SessionKey(key);
    match app.orchestrator.cancel(key).await {
        Ok(()) => match app.orchestrator.session(key).await {
            Some(s) => Json(s).into_response(),
            None => StatusCode::NO_CONTENT.into_response(),
        },
        Err(e) => error_response(e),
    }
}

async fn post_scan(State(app): State<AppState>, Json(req): Json<ScanRequest>) -> Response {
    match app.orchestrator.start_single(&req.target, req.profile).await {
        Ok(key) => match app.orchestrator.session(key).await {
            Some(s) => (StatusCode::ACCEPTED, Json(s)).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
        Err(e) => error_response(e),
    }
}

async fn post_parallel(State(app): State<AppState>, Json(req): Json<ParallelRequest>) -> Response {
    let group = req.group.unwrap_or_else(|| DEFAULT_GROUP.to_string());
    match app
        .orchestrator
        .start_parallel(&group, &req.targets, req.profile)
        .await
    {
        Ok(group) => match app.orchestrator.group_progress(&group).await {
            Some(p) => (StatusCode::ACCEPTED, Json(p)).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
        Err(e) => error_response(e),
    }
}

async fn get_group(State(app): State<AppState>, Path(group): Path<String>) -> Response {
    match app.orchestrator.group_progress(&group).await {
        Some(p) => Json(p).into_response(),
        None => error_response(ScanError::NotFound(format!("group {group}"))),
    }
}

async fn cancel_group(State(app): State<AppState>, Path(group): Path<String>) -> Response {
    match app.orchestrator.cancel_group(&group).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn stop_group(State(app): State<AppState>, Path(group): Path<String>) -> Response {
    match app.orchestrator.stop_group(&group).await {
        Ok(n) => Json(json!({ "removed": n })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn post_wan(State(app): State<AppState>, Json(req): Json<WanRequest>) -> Response {
    if let Some(addr) = req.address.as_deref().filter(|a| !a.trim().is_empty()) {
        *app.wan_address.write().await = Some(addr.trim().to_string());
    }
    let address = app.wan_address.read().await.clone();
    match app.orchestrator.start_wan(address.as_deref(), req.profile).await {
        Ok(key) => match app.orchestrator.session(key).await {
            Some(s) => (StatusCode::ACCEPTED, Json(s)).into_response(),
            None => StatusCode::ACCEPTED.into_response(),
        },
        Err(e) => error_response(e),
    }
}

/// Pushes the full session list once on connect and again after each change.
async fn events(State(app): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app.orchestrator.subscribe();
    let stream = stream::unfold((app.orchestrator, rx, true), |(orch, mut rx, first)| async move {
        if !first {
            rx.changed().await.ok()?;
        }
        let sessions = orch.sessions().await;
        let event = Event::default().event("sessions").json_data(&sessions).ok()?;
        Some((Ok::<_, Infallible>(event), (orch, rx, false)))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
