use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use kaleido_types::{ProductRecommendation, QueryEvaluationOut, ThreadSummary, UserSearch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extract::UserId,
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ListThreadsResponse {
    pub threads: Vec<ThreadSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default)]
    pub rerank: bool,
}

/// List the caller's threads, most recently active first
pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
) -> ApiResult<Json<ListThreadsResponse>> {
    let threads = state.search.list_threads(&user_id).await?;

    Ok(Json(ListThreadsResponse {
        threads: threads.into_iter().map(ThreadSummary::from).collect(),
    }))
}

/// Start a thread
///
/// An empty body only creates the thread. A `UserSearch` body also runs the
/// first turn; if that turn fails the thread is not kept.
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<QueryEvaluationOut>)> {
    let out = if body.iter().all(u8::is_ascii_whitespace) {
        state.search.create_thread(&user_id).await?
    } else {
        let search: UserSearch = serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid search body: {}", e)))?;
        state.search.evaluate(&user_id, &search, None).await?
    };

    Ok((StatusCode::CREATED, Json(out)))
}

/// Latest evaluation of a thread
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<QueryEvaluationOut>> {
    Ok(Json(state.search.get_evaluation(&user_id, &thread_id).await?))
}

/// Submit a query and/or answers to an existing thread
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(thread_id): Path<String>,
    Json(search): Json<UserSearch>,
) -> ApiResult<Json<QueryEvaluationOut>> {
    let out = state
        .search
        .evaluate(&user_id, &search, Some(&thread_id))
        .await?;
    Ok(Json(out))
}

pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(thread_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.search.delete_thread(&user_id, &thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Products for the thread's current cleaned query
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    Path(thread_id): Path<String>,
    Query(query): Query<RecommendationsQuery>,
) -> ApiResult<Json<Vec<ProductRecommendation>>> {
    let products = state
        .search
        .recommend(&user_id, &thread_id, query.rerank)
        .await?;
    Ok(Json(products))
}
