//! `/api/members` handlers.

use super::{CreatedBody, IdPath, JsonBody};
use crate::error::ApiError;
use crate::state::{run_blocking, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use memberdesk_core::{CreateMemberInput, MemberId, MemberSummary};

pub async fn list_members(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberSummary>>, ApiError> {
    let members = state.members;
    let items = run_blocking(move |cancel| members.list(cancel)).await?;
    Ok(Json(items))
}

/// `409` when a primary is requested for an account that already has one.
pub async fn create_member(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateMemberInput>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let members = state.members;
    let id = run_blocking(move |cancel| members.create(&input, cancel)).await?;
    Ok((StatusCode::CREATED, Json(CreatedBody { id })))
}

/// `400` for the last member of an account, `409` when no replacement
/// primary can be found.
pub async fn delete_member(
    State(state): State<AppState>,
    IdPath(id): IdPath<MemberId>,
) -> Result<StatusCode, ApiError> {
    let members = state.members;
    run_blocking(move |cancel| members.delete_by_id(id, cancel)).await?;
    Ok(StatusCode::NO_CONTENT)
}
