//! HTTP routes.
//!
//! Everything except `/health` lives under `/api`. Resources are addressed
//! by their external identifier.

pub mod accounts;
pub mod health;
pub mod locations;
pub mod members;

use crate::error::ApiError;
use crate::middleware::log_request;
use crate::state::AppState;
use axum::extract::{FromRequest, FromRequestParts};
use axum::routing::{delete, get};
use axum::{middleware, Router};
use serde::Serialize;
use uuid::Uuid;

/// JSON body extractor that reports decode failures as `ApiError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path extractor that reports decode failures as `ApiError`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct IdPath<T>(pub T);

/// Body of every `201 Created` response.
#[derive(Debug, Serialize)]
pub struct CreatedBody {
    pub id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/accounts/{id}",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route(
            "/accounts/{id}/members",
            get(accounts::list_account_members).delete(accounts::delete_non_primary_members),
        )
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        .route("/members/{id}", delete(members::delete_member))
        .route(
            "/locations",
            get(locations::list_locations).post(locations::create_location),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
