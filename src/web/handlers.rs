//! HTTP request handlers

use super::state::AppState;
use crate::catalog::CatalogError;
use crate::domain::favicon_url;
use crate::metrics::MetricsSnapshot;
use crate::search::SearchOutcome;
use crate::storage::Record;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
}

/// Query parameters for autocomplete
#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// Body of a new domain submission
#[derive(Debug, Deserialize)]
pub struct AddDomainRequest {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub description: String,
}

/// A record as returned by the API
#[derive(Debug, Serialize)]
pub struct DomainResponse {
    #[serde(flatten)]
    pub record: Record,
    pub favicon: String,
}

impl From<Record> for DomainResponse {
    fn from(record: Record) -> Self {
        let favicon = favicon_url(&record.name);
        Self { record, favicon }
    }
}

/// Search results response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub number_of_results: usize,
    pub results: Vec<DomainResponse>,
}

impl SearchResponse {
    fn new(query: String, records: Vec<Record>) -> Self {
        Self {
            query,
            number_of_results: records.len(),
            results: records.into_iter().map(DomainResponse::from).collect(),
        }
    }
}

/// Orchestrated search response
#[derive(Debug, Serialize)]
pub struct SmartSearchResponse {
    pub query: String,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub instance_name: String,
    pub domain_count: usize,
    pub oracle_backend: String,
    /// Cached oracle replies; absent when caching is off
    pub oracle_cache_entries: Option<u64>,
    pub metrics: MetricsSnapshot,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = match &self {
            CatalogError::AlreadyExists => StatusCode::CONFLICT,
            CatalogError::Storage(e) => {
                error!("Storage error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// List all domains
pub async fn list_domains(State(state): State<AppState>) -> impl IntoResponse {
    let domains: Vec<DomainResponse> = state
        .catalog
        .snapshot()
        .await
        .into_iter()
        .map(DomainResponse::from)
        .collect();
    Json(domains)
}

/// Add a domain
pub async fn add_domain(
    State(state): State<AppState>,
    Json(request): Json<AddDomainRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let catalog = state.catalog.clone();
    let record = tokio::task::spawn_blocking(move || {
        catalog.add(&request.domain, &request.description)
    })
    .await
    .map_err(|e| CatalogError::Storage(e.to_string()))??;
    Ok((StatusCode::CREATED, Json(DomainResponse::from(record))))
}

/// Remove a domain
pub async fn remove_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, CatalogError> {
    let catalog = state.catalog.clone();
    tokio::task::spawn_blocking(move || catalog.remove(&id))
        .await
        .map_err(|e| CatalogError::Storage(e.to_string()))??;
    Ok(StatusCode::NO_CONTENT)
}

/// Local search handler
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    let records = state.catalog.snapshot().await;
    let results = state.search.search(&records, &query);
    Json(SearchResponse::new(query, results))
}

/// Oracle-augmented search handler
pub async fn smart_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    let records = state.catalog.snapshot().await;
    let outcome = state
        .search
        .begin(records, query.clone())
        .resolve_detailed()
        .await;
    Json(SmartSearchResponse { query, outcome })
}

/// Autocomplete handler
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteParams>,
) -> impl IntoResponse {
    let records = state.catalog.snapshot().await;
    let suggestions: Vec<DomainResponse> = state
        .search
        .suggest(&records, &params.q, params.limit)
        .into_iter()
        .map(DomainResponse::from)
        .collect();
    Json(suggestions)
}

/// Stats handler
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse {
        instance_name: state.instance_name().to_string(),
        domain_count: state.catalog.snapshot().await.len(),
        oracle_backend: state.search.oracle().backend_name().to_string(),
        oracle_cache_entries: state.search.oracle().cached_replies().await,
        metrics: state.metrics.snapshot(),
    })
}
