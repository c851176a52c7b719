use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::get, Json, Router};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use simcore::detector::{DuplicateDetector, SimilarityReport, DEFAULT_THRESHOLD};
use simcore::record::{load_records, to_documents, Record};
use simcore::search::{keyword_statistics, multi_keyword_search, KeywordMatches, KeywordStats};
use simcore::similarity::text_similarity;
use simcore::stats::{Summary, TextAnalyzer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Deserialize)]
pub struct DuplicatesParams {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}
fn default_threshold() -> f64 { DEFAULT_THRESHOLD }

#[derive(Serialize)]
pub struct DuplicatesResponse {
    pub threshold: f64,
    pub num_docs: usize,
    pub took_s: f64,
    pub pairs: Vec<SimilarityReport>,
}

#[derive(Deserialize)]
pub struct SimilarityParams {
    pub left: usize,
    pub right: usize,
}

#[derive(Serialize)]
pub struct SimilarityResponse {
    pub left: usize,
    pub right: usize,
    pub left_id: String,
    pub right_id: String,
    pub score: f64,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub statistics: KeywordStats,
    pub matches: BTreeMap<String, KeywordMatches>,
}

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RwLock<Vec<Record>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(records: Vec<Record>, admin_token: Option<String>) -> Self {
        Self { records: Arc::new(RwLock::new(records)), admin_token }
    }
}

/// Load the corpus at `input` and build the router; `ADMIN_TOKEN` and
/// `CORS_ALLOW_ORIGIN` are read from the environment.
pub fn build_app(input: &std::path::Path) -> Result<Router> {
    let records = load_records(input)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    Ok(router(AppState::new(records, admin_token)))
}

pub fn router(state: AppState) -> Router {
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
        .route("/records", get(records_handler).post(append_records))
        .route("/record/:index", get(record_handler))
        .route("/summary/:index", get(summary_handler))
        .route("/duplicates", get(duplicates_handler))
        .route("/similarity", get(similarity_handler))
        .route("/search", get(search_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn internal_error(message: String) -> ApiError {
    tracing::error!(%message, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message })))
}

fn invalid_index() -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Invalid index" })))
}

pub async fn records_handler(State(state): State<AppState>) -> Json<Vec<Record>> {
    let records = state.records.read().clone();
    Json(records)
}

pub async fn record_handler(State(state): State<AppState>, Path(index): Path<usize>) -> Result<Json<Record>, ApiError> {
    let record = state.records.read().get(index).cloned();
    record.map(Json).ok_or_else(invalid_index)
}

pub async fn duplicates_handler(State(state): State<AppState>, Query(params): Query<DuplicatesParams>) -> Result<Json<DuplicatesResponse>, ApiError> {
    let start = std::time::Instant::now();
    let docs = to_documents(&state.records.read());
    let num_docs = docs.len();
    let threshold = params.threshold;
    // O(n^2) comparison runs on the blocking pool so request workers stay free
    let pairs = tokio::task::spawn_blocking(move || DuplicateDetector::new(threshold).detect_parallel(&docs))
        .await
        .map_err(|e| internal_error(format!("detection task failed: {e}")))?;
    let took_s = start.elapsed().as_secs_f64();
    tracing::info!(num_docs, pairs = pairs.len(), threshold, took_s, "duplicates served");
    Ok(Json(DuplicatesResponse { threshold, num_docs, took_s, pairs }))
}

pub async fn summary_handler(State(state): State<AppState>, Path(index): Path<usize>) -> Result<Json<Summary>, ApiError> {
    let record = state.records.read().get(index).cloned().ok_or_else(invalid_index)?;
    let summary = tokio::task::spawn_blocking(move || TextAnalyzer::new().map(|a| a.summarize(&record)))
        .await
        .map_err(|e| internal_error(format!("summary task failed: {e}")))?
        .map_err(|e| internal_error(format!("{e:#}")))?;
    Ok(Json(summary))
}

pub async fn similarity_handler(State(state): State<AppState>, Query(params): Query<SimilarityParams>) -> Result<Json<SimilarityResponse>, ApiError> {
    let records = state.records.read();
    let left = records.get(params.left).ok_or_else(invalid_index)?;
    let right = records.get(params.right).ok_or_else(invalid_index)?;
    Ok(Json(SimilarityResponse {
        left: params.left,
        right: params.right,
        left_id: left.label(params.left),
        right_id: right.label(params.right),
        score: text_similarity(&left.text, &right.text),
    }))
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let records = state.records.read();
    let statistics = keyword_statistics(&records, &params.q);
    let matches = multi_keyword_search(&records, std::slice::from_ref(&params.q));
    Json(SearchResponse { statistics, matches })
}

async fn append_records(State(state): State<AppState>, headers: HeaderMap, Json(batch): Json<Vec<Record>>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let mut records = state.records.write();
    let added = batch.len();
    records.extend(batch);
    tracing::info!(added, num_docs = records.len(), "records appended");
    Ok(Json(json!({ "added": added, "num_docs": records.len() })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
