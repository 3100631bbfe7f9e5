//! `/api/locations` handlers.

use super::{CreatedBody, JsonBody};
use crate::error::ApiError;
use crate::state::{run_blocking, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use memberdesk_core::{CreateLocationInput, Location};

pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let locations = state.locations;
    let items = run_blocking(move |cancel| locations.list(cancel)).await?;
    Ok(Json(items))
}

pub async fn create_location(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateLocationInput>,
) -> Result<(StatusCode, Json<CreatedBody>), ApiError> {
    let locations = state.locations;
    let id = run_blocking(move |cancel| locations.create(&input, cancel)).await?;
    Ok((StatusCode::CREATED, Json(CreatedBody { id })))
}
