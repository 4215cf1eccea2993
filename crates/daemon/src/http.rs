// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface
//!
//! | Route | |
//! |---|---|
//! | `POST /add`, `POST /add/{topic}` | create or update a record |
//! | `GET /get-by-key?key=&topic=` | fetch one record |
//! | `GET /search?q=&topic=&limit=&offset=` | topic-scoped text search |
//! | `GET /health` | liveness, no API key |

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rk_adapters::{Index, Store};
use rk_core::{Clock, Record, DEFAULT_TOPIC};
use rk_engine::{QueryError, ReconcileError, RecordService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

struct AppState<S, I, C> {
    service: Arc<RecordService<S, I, C>>,
}

impl<S, I, C> Clone for AppState<S, I, C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

/// Build the router; every route except `/health` requires the API key
pub fn router<S, I, C>(service: Arc<RecordService<S, I, C>>, api_key: &str) -> Router
where
    S: Store,
    I: Index,
    C: Clock,
{
    let protected = Router::new()
        .route("/add", post(add_default::<S, I, C>))
        .route("/add/{topic}", post(add_to_topic::<S, I, C>))
        .route("/get-by-key", get(get_by_key::<S, I, C>))
        .route("/search", get(search::<S, I, C>))
        .route_layer(from_fn_with_state(Arc::<str>::from(api_key), require_api_key))
        .with_state(AppState { service });

    Router::new().route("/health", get(health)).merge(protected)
}

/// Errors surfaced to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<ReconcileError> for ApiError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::InvalidRecord(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::error!(error = %other, "write failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        tracing::error!(error = %e, "read failed");
        ApiError::Internal(e.to_string())
    }
}

async fn require_api_key(
    State(api_key): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(&*api_key) {
        tracing::debug!(path = %request.uri().path(), "rejected request without valid api key");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

async fn health() -> Json<StatusBody> {
    Json(StatusBody { status: "ok" })
}

/// Body of an add request; other fields, timestamps included, are ignored
#[derive(Debug, Deserialize)]
struct AddRequest {
    #[serde(default)]
    key: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddResponse {
    pub status: String,
    pub indexed: bool,
}

async fn add_default<S: Store, I: Index, C: Clock>(
    State(state): State<AppState<S, I, C>>,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddResponse>), ApiError> {
    add_record(&state, DEFAULT_TOPIC, payload).await
}

async fn add_to_topic<S: Store, I: Index, C: Clock>(
    State(state): State<AppState<S, I, C>>,
    Path(topic): Path<String>,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddResponse>), ApiError> {
    add_record(&state, &topic, payload).await
}

async fn add_record<S: Store, I: Index, C: Clock>(
    state: &AppState<S, I, C>,
    topic: &str,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if request.key.is_empty() {
        return Err(ApiError::BadRequest("key is required".into()));
    }

    let outcome = state
        .service
        .add(&request.key, topic, &request.content)
        .await?;
    tracing::info!(id = %outcome.record.id(), indexed = outcome.indexed, "record added");

    Ok((
        StatusCode::CREATED,
        Json(AddResponse {
            status: "ok".to_string(),
            indexed: outcome.indexed,
        }),
    ))
}

#[derive(Debug, Deserialize)]
struct GetParams {
    key: Option<String>,
    topic: Option<String>,
}

async fn get_by_key<S: Store, I: Index, C: Clock>(
    State(state): State<AppState<S, I, C>>,
    Query(params): Query<GetParams>,
) -> Result<Json<Record>, ApiError> {
    let key = params
        .key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::BadRequest("key is required".into()))?;
    let topic = params.topic.unwrap_or_default();

    match state.service.get(&key, &topic).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(format!("no record for key {key}"))),
    }
}

/// Paging values stay strings so bad input falls back to defaults
#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
    topic: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

async fn search<S: Store, I: Index, C: Clock>(
    State(state): State<AppState<S, I, C>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let query = params
        .q
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("q is required".into()))?;
    let topic = params.topic.unwrap_or_default();
    let limit = parse_limit(params.limit.as_deref());
    let offset = parse_offset(params.offset.as_deref());

    let records = state.service.search(&topic, &query, limit, offset).await?;
    Ok(Json(records))
}

fn parse_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok())
        .filter(|n| (1..=MAX_LIMIT).contains(n))
        .unwrap_or(DEFAULT_LIMIT)
}

fn parse_offset(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.parse::<usize>().ok()).unwrap_or(0)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
