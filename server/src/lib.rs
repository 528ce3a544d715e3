use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use docsearch_core::persist::load_index;
use docsearch_core::{BoolMode, DocRef, ScoringModel, SearchHit, SearchIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
    pub expand: Option<bool>,
    #[serde(rename = "bool")]
    pub mode: Option<BoolMode>,
    pub scoring: Option<ScoringModel>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<SearchIndex>,
}

/// Load the index at `index_path` once and serve it.
pub fn build_app(index_path: &str) -> Result<Router> {
    let index = load_index(index_path).with_context(|| format!("loading search index from {index_path}"))?;
    tracing::info!(index_path, docs = index.len(), "search index loaded");
    Ok(build_router(Arc::new(index)))
}

pub fn build_router(index: Arc<SearchIndex>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(AppState { index })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let index = &state.index;

    let mut options = index.search_options().clone();
    if let Some(expand) = params.expand { options.expand = expand; }
    if let Some(mode) = params.mode { options.mode = mode; }
    if let Some(scoring) = params.scoring { options.scoring = scoring; }
    let mut results = *index.results_options();
    if let Some(limit) = params.limit { results.limit_results = limit.clamp(1, MAX_LIMIT); }

    let found = index.search_with(&params.q, &options, &results);
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, total_hits = found.total_hits, "search served");
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: found.total_hits, results: found.hits })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocRef>) -> (StatusCode, Json<serde_json::Value>) {
    match state.index.document(doc_id) {
        Some(doc) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "doc_id": doc_id,
                "title": doc.title,
                "breadcrumbs": doc.breadcrumbs,
                "url": state.index.url(doc_id),
                "text": doc.body,
            })),
        ),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))),
    }
}
