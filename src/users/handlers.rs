use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::UserResponse,
        extractors::UserPayload,
        services::{create_user, update_user},
        validation::{validate_create, validate_update},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(store))
        .route("/users/:id", put(update))
}

/// POST /users
#[instrument(skip(state, raw))]
pub async fn store(
    State(state): State<AppState>,
    UserPayload(raw): UserPayload,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let input = validate_create(raw).map_err(|errors| {
        warn!(failed = errors.len(), "create validation failed");
        AppError::Validation(errors)
    })?;

    let user = create_user(state.users.as_ref(), &state.hasher, input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /users/:id
#[instrument(skip(state, raw))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    UserPayload(raw): UserPayload,
) -> AppResult<Json<UserResponse>> {
    let input = validate_update(raw).map_err(|errors| {
        warn!(failed = errors.len(), "update validation failed");
        AppError::Validation(errors)
    })?;

    // ids that are not UUIDs cannot name a stored user
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;

    let user = update_user(state.users.as_ref(), &state.hasher, id, input).await?;
    Ok(Json(user.into()))
}
