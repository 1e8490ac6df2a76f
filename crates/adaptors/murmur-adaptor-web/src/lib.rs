//! Feedback explorer: a browser form over the similarity search
//!
//! `GET /` serves the page, `POST /api/search` runs one search and returns the
//! display query with the raw rows, `GET /health` answers `ok`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use murmur_core::{CellValue, FilterSpec, MurmurError, RatingCategory, RawFilter, Result};
use murmur_storage_sql::SearchService;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod page;

/// Rows returned when the request names none
pub const DEFAULT_TOP_N: i64 = 20;

#[derive(Clone)]
pub struct ExplorerConfig {
    pub host: String,
    pub port: u16,
    /// Allow requests from any origin
    pub permissive_cors: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 4000,
            permissive_cors: false,
        }
    }
}

/// Body of `POST /api/search`
#[derive(Debug, Deserialize)]
pub struct SearchInput {
    pub query_text: String,
    /// Ceiling per category; 5 or absent means no filter
    #[serde(default)]
    pub ratings: BTreeMap<RatingCategory, i64>,
    #[serde(default)]
    pub distance_threshold: Option<f64>,
    #[serde(default)]
    pub contains: Option<String>,
    #[serde(default)]
    pub top_n: Option<i64>,
}

impl SearchInput {
    fn filter(&self) -> Result<FilterSpec> {
        FilterSpec::validate(RawFilter {
            ratings: self.ratings.clone(),
            distance_threshold: self.distance_threshold,
            contains: self.contains.clone(),
            top_n: self.top_n.unwrap_or(DEFAULT_TOP_N),
        })
    }
}

/// Response of `POST /api/search`
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchOutput {
    /// Display rendering of the executed query
    pub sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub count: usize,
}

#[derive(Clone)]
pub struct ExplorerServer {
    pub config: Arc<ExplorerConfig>,
    search: Arc<dyn SearchService>,
}

impl ExplorerServer {
    pub fn new(config: ExplorerConfig, search: Arc<dyn SearchService>) -> Self {
        Self {
            config: Arc::new(config),
            search,
        }
    }

    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/", get(index))
            .route("/health", get(health))
            .route("/api/search", post(search))
            .with_state(self.clone())
            .layer(TraceLayer::new_for_http());
        if self.config.permissive_cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Serve until Ctrl-C
    pub async fn serve(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Feedback explorer listening on http://{}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
        Ok(())
    }
}

async fn index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

async fn search(
    State(state): State<ExplorerServer>,
    input: std::result::Result<Json<SearchInput>, JsonRejection>,
) -> std::result::Result<Json<SearchOutput>, ApiError> {
    let Json(input) = input?;
    if input.query_text.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Please enter a query text for vector search.",
        ));
    }
    let filter = input.filter()?;

    let outcome = state.search.search(input.query_text.trim(), &filter).await?;
    Ok(Json(SearchOutput {
        sql: outcome.display_sql,
        count: outcome.raw.len(),
        columns: outcome.raw.columns,
        rows: outcome.raw.rows,
    }))
}

/// Error response with a JSON `{"error": message}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<MurmurError> for ApiError {
    fn from(err: MurmurError) -> Self {
        let status = match &err {
            MurmurError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MurmurError::EmbeddingProvider { .. } | MurmurError::QueryExecution(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status != StatusCode::UNPROCESSABLE_ENTITY {
            warn!("Search failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}
