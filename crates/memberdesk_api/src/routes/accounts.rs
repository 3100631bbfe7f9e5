//! `/api/accounts` handlers.

use super::{CreatedBody, IdPath, JsonBody};
use crate::error::ApiError;
use crate::state::{run_blocking, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use memberdesk_core::{Account, AccountId, CreateAccountInput, MemberSummary, UpdateAccountInput};

pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = state.accounts;
    let items = run_blocking(move |cancel| accounts.list(cancel)).await?;
    Ok(Json(items))
}

pub async fn get_account(
    State(state): State<AppState>,
    IdPath(id): IdPath<AccountId>,
) -> Result<Json<Account>, ApiError> {
    let accounts = state.accounts;
    let account = run_blocking(move |cancel| accounts.get_by_id(id, cancel)).await?;
    Ok(Json(account))
}

pub async fn list_account_members(
    State(state): State<AppState>,
    IdPath(id): IdPath<AccountId>,
) -> Result<Json<Vec<MemberSummary>>, ApiError> {
    let accounts = state.accounts;
    let members = run_blocking(move |cancel| accounts.get_members(id, cancel)).await?;
    Ok(Json(members))
}

pub async fn create_account(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateAccountInput>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let accounts = state.accounts;
    let id = run_blocking(move |cancel| accounts.create(&input, cancel)).await?;
    Ok((StatusCode::CREATED, Json(CreatedBody { id })))
}

pub async fn update_account(
    State(state): State<AppState>,
    IdPath(id): IdPath<AccountId>,
    JsonBody(input): JsonBody<UpdateAccountInput>,
) -> Result<StatusCode, ApiError> {
    let accounts = state.accounts;
    run_blocking(move |cancel| accounts.update_by_id(id, &input, cancel)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_account(
    State(state): State<AppState>,
    IdPath(id): IdPath<AccountId>,
) -> Result<StatusCode, ApiError> {
    let accounts = state.accounts;
    run_blocking(move |cancel| accounts.delete_by_id(id, cancel)).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_non_primary_members(
    State(state): State<AppState>,
    IdPath(id): IdPath<AccountId>,
) -> Result<StatusCode, ApiError> {
    let accounts = state.accounts;
    run_blocking(move |cancel| accounts.delete_non_primary_members(id, cancel)).await?;
    Ok(StatusCode::NO_CONTENT)
}
