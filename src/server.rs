//! HTTP server.
//!
//! Exposes the filter query engine and the filter metadata listing as a
//! read-only JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Index of endpoints with example usages |
//! | `GET`  | `/api/episodes` | Filtered episode listing |
//! | `GET`  | `/api/filters` | Subjects, colors, and months available to filter on |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! `/api/episodes` accepts repeated `subject`, `color`, and `month` keys and
//! one `filter_type` (`AND` or `OR`, default `AND`):
//!
//! ```text
//! /api/episodes?subject=TREE&subject=MOUNTAIN&filter_type=OR&month=1
//! ```
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "query_failed", "message": "query failed: ..." } }
//! ```
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front ends can
//! call the API directly.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::filter::FilterRequest;
use crate::metadata::{list_filter_options, FilterOptions};
use crate::query::{retrieve, EpisodeQueryResponse};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    pool: SqlitePool,
}

/// Starts the HTTP server on `[server].bind`. Runs until the process is
/// terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let listener = TcpListener::bind(&config.server.bind).await?;

    println!("Catalog server listening on http://{}", listener.local_addr()?);

    serve(listener, pool).await
}

/// Serve the API on an already-bound listener.
pub async fn serve(listener: TcpListener, pool: SqlitePool) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "serving catalog API");
    axum::serve(listener, router(pool)).await?;
    Ok(())
}

pub fn router(pool: SqlitePool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/api/episodes", get(handle_episodes))
        .route("/api/filters", get(handle_filters))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { pool })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 500 error for a failed catalog query.
fn query_failed(err: crate::error::Error) -> AppError {
    error!(error = %err, "request failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "query_failed".to_string(),
        message: err.to_string(),
    }
}

// ============ GET / ============

#[derive(Serialize)]
struct EndpointInfo {
    path: &'static str,
    description: &'static str,
    examples: &'static [&'static str],
}

#[derive(Serialize)]
struct IndexResponse {
    name: &'static str,
    version: &'static str,
    endpoints: Vec<EndpointInfo>,
}

const EPISODE_EXAMPLES: &[&str] = &[
    "/api/episodes?subject=TREE&subject=MOUNTAIN",
    "/api/episodes?subject=TREE&subject=MOUNTAIN&filter_type=OR",
    "/api/episodes?color=Titanium%20White&month=1",
];

async fn handle_index() -> Json<IndexResponse> {
    Json(IndexResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            EndpointInfo {
                path: "/api/episodes",
                description: "Episodes filtered by subject, color, and month",
                examples: EPISODE_EXAMPLES,
            },
            EndpointInfo {
                path: "/api/filters",
                description: "Subjects, colors, and months available to filter on",
                examples: &["/api/filters"],
            },
            EndpointInfo {
                path: "/health",
                description: "Health check",
                examples: &["/health"],
            },
        ],
    })
}

// ============ GET /api/episodes ============

async fn handle_episodes(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<EpisodeQueryResponse>, AppError> {
    let filter = FilterRequest::from_pairs(pairs).normalize();
    let response = retrieve(&state.pool, &filter).await.map_err(query_failed)?;
    Ok(Json(response))
}

// ============ GET /api/filters ============

#[derive(Serialize)]
struct FiltersResponse {
    #[serde(flatten)]
    options: FilterOptions,
    examples: &'static [&'static str],
}

async fn handle_filters(State(state): State<AppState>) -> Result<Json<FiltersResponse>, AppError> {
    let options = list_filter_options(&state.pool).await.map_err(query_failed)?;
    Ok(Json(FiltersResponse {
        options,
        examples: EPISODE_EXAMPLES,
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
