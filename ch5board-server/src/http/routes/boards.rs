//! Board endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::db::repos::{Board, BoardRepo};
use crate::http::envelope::{ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::ValidBoardId;
use crate::http::server::AppState;

/// GET /api/boards - list all boards
async fn list_boards(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<Board>>>, ApiError> {
    let boards = BoardRepo::new(&state.pool).list().await?;
    Ok(ok(boards))
}

/// GET /api/boards/{boardId} - get a single board
async fn get_board(
    State(state): State<Arc<AppState>>,
    ValidBoardId(id): ValidBoardId,
) -> Result<Json<Envelope<Board>>, ApiError> {
    let board = BoardRepo::new(&state.pool).get(id.as_str()).await?;
    Ok(ok(board))
}

/// Board routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/boards", get(list_boards))
        .route("/api/boards/{board_id}", get(get_board))
}
