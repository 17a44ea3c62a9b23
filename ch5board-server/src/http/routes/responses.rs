//! Reply submission endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

use crate::db::repos::{ResponseRepo, Submission};
use crate::http::envelope::{ok, Envelope};
use crate::http::error::ApiError;
use crate::http::extractors::{ClientIp, ValidJson};
use crate::http::server::AppState;
use crate::models::{NewResponse, ValidationError};

/// Reply request
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateResponseRequest {
    pub thread_id: i64,
    pub name: Option<String>,
    pub mail: Option<String>,
    pub body: String,
    pub image_url: Option<String>,
}

/// POST /api/responses - append a reply to a thread
///
/// Every field is validated before the database is touched.
async fn create_response(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    ValidJson(req): ValidJson<CreateResponseRequest>,
) -> Result<(StatusCode, Json<Envelope<Submission>>), ApiError> {
    if req.thread_id <= 0 {
        return Err(ValidationError::InvalidFormat {
            field: "threadId",
            reason: "must be a positive integer",
        }
        .into());
    }

    let post = NewResponse::new(
        req.name.as_deref(),
        req.mail.as_deref(),
        &req.body,
        req.image_url.as_deref(),
        &state.rules,
    )?;

    let poster = state.poster(&ip);
    let submission = ResponseRepo::new(&state.pool)
        .submit(req.thread_id, &post, &poster, &state.rules)
        .await?;

    Ok((StatusCode::CREATED, ok(submission)))
}

/// Response routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/responses", post(create_response))
}
