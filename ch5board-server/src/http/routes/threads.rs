//! Thread endpoints
//!
//! - `GET  /api/threads?boardId=&sort=&page=&per_page=` - board listing
//! - `POST /api/threads` - new thread with its opening post
//! - `GET  /api/threads/{threadId}` - thread with every response
//! - `GET  /api/threads/{threadId}/responses` - paginated responses

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::db::repos::{Response, ResponseRepo, Thread, ThreadDetail, ThreadRepo, ThreadSummary};
use crate::http::envelope::{ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{ClientIp, ValidJson, ValidQuery, ValidThreadId};
use crate::http::server::AppState;
use crate::models::{
    BoardId, NewResponse, Paginated, Pagination, PaginationParams, ThreadSort, ThreadTitle,
    ValidationError,
};

/// Query string for the board listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListThreadsQuery {
    pub board_id: Option<String>,
    #[serde(default)]
    pub sort: ThreadSort,
    pub page: Option<u32>,
    #[serde(rename = "per_page")]
    pub per_page: Option<u32>,
}

/// Create thread request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateThreadRequest {
    pub board_id: String,
    pub title: String,
    pub name: Option<String>,
    pub mail: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
}

/// GET /api/threads - list threads of a board
async fn list_threads(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ListThreadsQuery>,
) -> Result<Json<Envelope<Paginated<ThreadSummary>>>, ApiError> {
    let raw_board = query
        .board_id
        .as_deref()
        .ok_or(ValidationError::Empty { field: "boardId" })?;
    let board = BoardId::new(raw_board)?;

    let page = Pagination::from(PaginationParams {
        page: query.page,
        per_page: query.per_page,
    });

    let threads = ThreadRepo::new(&state.pool)
        .list_for_board(board.as_str(), query.sort, page)
        .await?;

    Ok(ok(threads))
}

/// POST /api/threads - create a thread and response #1
async fn create_thread(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidJson(req): ValidJson<CreateThreadRequest>,
) -> Result<(StatusCode, Json<Envelope<Thread>>), ApiError> {
    let rules = &state.rules;
    let board = BoardId::new(&req.board_id)?;
    let title = ThreadTitle::new(&req.title, rules.max_title_chars)?;
    let post = NewResponse::new(
        req.name.as_deref(),
        req.mail.as_deref(),
        &req.body,
        req.image_url.as_deref(),
        rules,
    )?;

    let poster = state.poster(&ip);
    let thread = ThreadRepo::new(&state.pool)
        .create_with_opening_post(&board, &title, &post, &poster, rules)
        .await?;

    info!(thread_id = thread.id, user_id = %poster.user_id, "new thread");
    Ok((StatusCode::CREATED, ok(thread)))
}

/// GET /api/threads/{threadId} - thread detail with responses
async fn get_thread(
    State(state): State<Arc<AppState>>,
    ValidThreadId(id): ValidThreadId,
) -> Result<Json<Envelope<ThreadDetail>>, ApiError> {
    let detail = ThreadRepo::new(&state.pool).detail(id).await?;
    Ok(ok(detail))
}

/// GET /api/threads/{threadId}/responses - paginated responses
async fn list_responses(
    State(state): State<Arc<AppState>>,
    ValidThreadId(id): ValidThreadId,
    ValidQuery(params): ValidQuery<PaginationParams>,
) -> Result<Json<Envelope<Paginated<Response>>>, ApiError> {
    let responses = ResponseRepo::new(&state.pool)
        .list_for_thread(id, Pagination::from(params))
        .await?;
    Ok(ok(responses))
}

/// Thread routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/threads", get(list_threads).post(create_thread))
        .route("/api/threads/{thread_id}", get(get_thread))
        .route("/api/threads/{thread_id}/responses", get(list_responses))
}
