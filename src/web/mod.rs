use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::SeatError;
use crate::game::GameSummary;
use crate::tools::{ErrorBody, ToolBox};

#[derive(Clone)]
struct AppState {
    toolbox: Arc<Mutex<ToolBox>>,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error(transparent)]
    Tool(#[from] SeatError),
    #[error("tool worker failed: {0}")]
    Join(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Tool(err) => {
                let status = match err {
                    SeatError::Validation(_) => StatusCode::BAD_REQUEST,
                    SeatError::DeviceNotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    SeatError::Capture(_) | SeatError::Speech(_) => StatusCode::BAD_GATEWAY,
                    SeatError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, ErrorBody::from(err))
            }
            ApiError::Join(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    kind: "internal".to_string(),
                    message: self.to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn serve(addr: SocketAddr, toolbox: ToolBox) -> Result<()> {
    let app = router(toolbox);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "tool server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(toolbox: ToolBox) -> Router {
    let state = AppState {
        toolbox: Arc::new(Mutex::new(toolbox)),
    };
    let api = Router::new()
        .route("/state", get(fetch_state))
        .route("/tools/:tool", post(call_tool));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Tool calls shell out and touch files, so they run on the blocking pool. The
/// mutex keeps a single writer.
async fn run_blocking<T, F>(state: AppState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut ToolBox) -> Result<T, SeatError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut toolbox = state.toolbox.lock();
        work(&mut *toolbox)
    })
    .await
    .map_err(|err| ApiError::Join(err.to_string()))?
    .map_err(ApiError::from)
}

async fn fetch_state(State(state): State<AppState>) -> Result<Json<GameSummary>, ApiError> {
    let summary = run_blocking(state, |toolbox| Ok(toolbox.game_state())).await?;
    Ok(Json(summary))
}

async fn call_tool(
    State(state): State<AppState>,
    Path(tool): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let arguments = body.map(|Json(value)| value).unwrap_or(Value::Null);
    let result = run_blocking(state, move |toolbox| toolbox.call(&tool, arguments)).await?;
    Ok(Json(result))
}
